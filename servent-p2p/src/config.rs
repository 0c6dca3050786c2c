//! Servent configuration.

use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::protocol::PeerMode;

/// TTL stamped on locally originated messages.
pub const DEFAULT_TTL: u8 = 5;

/// Standard Gnutella port, advertised in acceptor mode.
pub const DEFAULT_PORT: u16 = 6346;

/// Content type negotiated with Gnutella2 hubs.
pub const G2_MIME: &str = "application/x-gnutella2";

/// Default user agent string.
pub const DEFAULT_USER_AGENT: &str = concat!("servent/", env!("CARGO_PKG_VERSION"));

/// Default connection timeout.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(60);

/// Default host cache file, relative to the working directory.
pub const DEFAULT_HOSTCACHE_FILE: &str = "hostcache.txt";

/// Configuration for a servent.
#[derive(Debug, Clone)]
pub struct ServentConfig {
    /// Path to the persisted host cache. Must exist at startup.
    pub hostcache_path: PathBuf,

    /// Which handshake profile to speak.
    pub mode: PeerMode,

    /// Port advertised in `Listen-IP`.
    pub port: u16,

    /// TTL for the PING probe.
    pub ttl: u8,

    /// User agent string sent in the handshake.
    pub user_agent: String,

    /// Timeout for establishing outbound connections.
    pub connect_timeout: Duration,

    /// Deadline for reading the handshake response. `None` reads until the
    /// peer closes the stream.
    pub handshake_timeout: Option<Duration>,

    /// Deadline for reading the PING response. `None` reads until the peer
    /// closes the stream.
    pub ping_timeout: Option<Duration>,

    /// Public IP advertised in acceptor mode. Falls back to the local address
    /// of the connection.
    pub listen_ip: Option<IpAddr>,
}

impl Default for ServentConfig {
    fn default() -> Self {
        Self {
            hostcache_path: PathBuf::from(DEFAULT_HOSTCACHE_FILE),
            mode: PeerMode::Probe,
            port: DEFAULT_PORT,
            ttl: DEFAULT_TTL,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            handshake_timeout: None,
            ping_timeout: None,
            listen_ip: None,
        }
    }
}

impl ServentConfig {
    /// Create a new configuration backed by the given host cache file.
    pub fn new(hostcache_path: impl Into<PathBuf>) -> Self {
        Self {
            hostcache_path: hostcache_path.into(),
            ..Default::default()
        }
    }

    /// Set the handshake mode.
    pub fn with_mode(mut self, mode: PeerMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the user agent string.
    pub fn with_user_agent(mut self, user_agent: String) -> Self {
        self.user_agent = user_agent;
        self
    }

    /// Set the connection timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Bound the handshake response read.
    pub fn with_handshake_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.handshake_timeout = timeout;
        self
    }

    /// Bound the PING response read.
    pub fn with_ping_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.ping_timeout = timeout;
        self
    }

    /// Set the advertised public IP.
    pub fn with_listen_ip(mut self, ip: Option<IpAddr>) -> Self {
        self.listen_ip = ip;
        self
    }
}
