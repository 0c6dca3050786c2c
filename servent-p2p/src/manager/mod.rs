//! Connection management.
//!
//! The servent keeps at most one peer link, so this is only the dialing
//! half: bootstrap in [`crate::node`] decides which address to try next.

pub mod outbound;

pub use outbound::connect_to_peer;
