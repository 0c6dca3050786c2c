//! The active peer link.
//!
//! A link is only created once the handshake has been accepted; the servent
//! holds at most one.

pub mod info;

use tokio::net::TcpStream;

pub use info::PeerInfo;

/// An accepted connection and what the handshake told us about it.
#[derive(Debug)]
pub struct PeerLink {
    /// The connection, open and past the handshake.
    pub stream: TcpStream,
    /// Handshake details.
    pub info: PeerInfo,
}

impl PeerLink {
    /// Pair a stream with its handshake details.
    pub fn new(stream: TcpStream, info: PeerInfo) -> Self {
        Self { stream, info }
    }
}
