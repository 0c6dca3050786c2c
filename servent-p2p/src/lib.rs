//! Gnutella servent bootstrap.
//!
//! This crate connects a servent to a Gnutella 0.6 or Gnutella2 overlay:
//!
//! - A persisted host cache of candidate peer addresses
//! - The text handshake, including peer-list harvesting and hub checks
//! - The fixed-header binary message codec
//! - A PING probe over the accepted connection
//!
//! # Architecture
//!
//! Everything runs on the caller's task and is awaited in sequence. The
//! servent owns the host cache and at most one peer link.
//!
//! ```text
//! Servent::bootstrap()
//! ├── HostCache::items()
//! ├── connect_to_peer()          (per candidate, with timeout)
//! ├── HandshakeNegotiator        (request, read until close, validate, ack)
//! └── HostCache::delete()        (on any failure)
//! Servent::ping()
//! └── MessageCodec encode / read until close / decode
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use servent_p2p::{Servent, ServentConfig};
//!
//! let mut servent = Servent::new(ServentConfig::new("hostcache.txt")).await?;
//! servent.bootstrap().await?;
//! let outcome = servent.ping().await?;
//! ```

pub mod config;
pub mod error;

pub mod discovery;
pub mod manager;
pub mod node;
pub mod peer;
pub mod protocol;

// Re-export main types
pub use config::{ServentConfig, DEFAULT_PORT, DEFAULT_TTL, G2_MIME};
pub use discovery::{HostCache, PeerAddress};
pub use error::{ErrorKind, P2pError, P2pResult};
pub use node::{PingOutcome, Servent};
pub use peer::{PeerInfo, PeerLink};
pub use protocol::{
    Guid, HandshakeHeaders, HandshakeNegotiator, HandshakeState, Message, MessageCodec,
    MessageType, PeerMode,
};
