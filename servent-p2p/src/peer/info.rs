//! Information about the connected peer.

use std::fmt;
use std::net::SocketAddr;
use std::time::{Duration, Instant};

use crate::discovery::PeerAddress;
use crate::protocol::HandshakeHeaders;

/// What we learned about a peer during the handshake.
#[derive(Debug, Clone)]
pub struct PeerInfo {
    /// Host cache entry we dialed.
    pub addr: PeerAddress,
    /// Resolved socket address, when the OS reports one.
    pub remote: Option<SocketAddr>,
    /// Full handshake response.
    pub headers: HandshakeHeaders,
    /// Peer's user agent, if advertised.
    pub user_agent: Option<String>,
    /// When the handshake completed.
    pub connected_at: Instant,
}

impl PeerInfo {
    /// Create info from an accepted handshake.
    pub fn new(addr: PeerAddress, remote: Option<SocketAddr>, headers: HandshakeHeaders) -> Self {
        let user_agent = headers.get("User-Agent").map(str::to_string);
        Self {
            addr,
            remote,
            headers,
            user_agent,
            connected_at: Instant::now(),
        }
    }

    /// Whether the peer advertised itself as a hub or ultrapeer.
    pub fn is_hub(&self) -> bool {
        self.headers.is_true("X-Hub") || self.headers.is_true("X-Ultrapeer")
    }

    /// Get the connection duration.
    pub fn connection_duration(&self) -> Duration {
        self.connected_at.elapsed()
    }
}

impl fmt::Display for PeerInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({})",
            self.addr,
            self.user_agent.as_deref().unwrap_or("unknown agent")
        )
    }
}
