//! Gnutella protocol layer.
//!
//! This module contains:
//! - The text handshake and its header parser
//! - Binary message definitions and the fixed-header codec
//! - The read-until-close helper both of them rely on

pub mod framing;
pub mod handshake;
pub mod headers;
pub mod io;
pub mod messages;

// Re-export main types
pub use framing::{MessageCodec, HEADER_LEN};
pub use handshake::{Endpoints, HandshakeNegotiator, HandshakeState, PeerMode};
pub use headers::HandshakeHeaders;
pub use io::read_until_close;
pub use messages::{Guid, Message, MessageType};
