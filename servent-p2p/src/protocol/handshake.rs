//! Gnutella 0.6 connection handshake.
//!
//! The handshake protocol:
//! 1. We send `GNUTELLA CONNECT/0.6` followed by our headers and a blank line
//! 2. We read the peer's response until it stops sending
//! 3. Peer lists in the response are merged into the host cache
//! 4. The response is validated; on success we send a final `200 OK`

use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};

use crate::config::G2_MIME;
use crate::discovery::HostCache;
use crate::error::{P2pError, P2pResult};
use crate::protocol::headers::HandshakeHeaders;
use crate::protocol::io::read_until_close;

/// First line of a connection request.
pub const CONNECT_LINE: &str = "GNUTELLA CONNECT/0.6";

/// Protocol token expected in the response status line.
pub const PROTOCOL_TOKEN: &str = "GNUTELLA/0.6";

/// Status code that accepts the connection.
pub const ACCEPT_CODE: &str = "200";

/// Status line of our final acknowledgment.
pub const OK_LINE: &str = "GNUTELLA/0.6 200 OK";

/// Which handshake profile to speak.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PeerMode {
    /// Plain Gnutella 0.6 probe: advertises a non-ultrapeer leaf and the
    /// extensions it understands.
    #[default]
    Probe,
    /// Gnutella2 hub search: advertises addresses and content type, and
    /// only accepts hubs or ultrapeers.
    Acceptor,
}

impl PeerMode {
    /// Headers whose values are comma-separated peer lists.
    pub fn peer_list_headers(self) -> &'static [&'static str] {
        match self {
            PeerMode::Probe => &["X-Try-Ultrapeers", "X-Try"],
            PeerMode::Acceptor => &["X-Try-Ultrapeers", "X-Try-Hubs"],
        }
    }
}

impl fmt::Display for PeerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PeerMode::Probe => write!(f, "probe"),
            PeerMode::Acceptor => write!(f, "acceptor"),
        }
    }
}

impl FromStr for PeerMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "probe" => Ok(PeerMode::Probe),
            "acceptor" => Ok(PeerMode::Acceptor),
            other => Err(format!("unknown peer mode {:?} (expected probe or acceptor)", other)),
        }
    }
}

/// Handshake state machine.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum HandshakeState {
    /// Nothing sent yet.
    #[default]
    Start,
    /// Connect request written.
    RequestSent,
    /// Peer response read in full.
    ResponseBuffered,
    /// Response passed every check.
    Validated,
    /// Acknowledgment written; the connection is usable.
    Accepted,
    /// Handshake failed with the given reason.
    Rejected(String),
}

impl HandshakeState {
    /// Check if handshake is complete.
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }
}

impl fmt::Display for HandshakeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandshakeState::Start => write!(f, "start"),
            HandshakeState::RequestSent => write!(f, "request_sent"),
            HandshakeState::ResponseBuffered => write!(f, "response_buffered"),
            HandshakeState::Validated => write!(f, "validated"),
            HandshakeState::Accepted => write!(f, "accepted"),
            HandshakeState::Rejected(_) => write!(f, "rejected"),
        }
    }
}

/// Addresses advertised in acceptor mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoints {
    /// Our public address (`Listen-IP`).
    pub listen: SocketAddr,
    /// The peer's address as we see it (`Remote-IP`).
    pub remote: SocketAddr,
}

/// Drives one handshake over one stream.
#[derive(Debug)]
pub struct HandshakeNegotiator {
    mode: PeerMode,
    user_agent: String,
    endpoints: Option<Endpoints>,
    response_timeout: Option<Duration>,
    state: HandshakeState,
}

impl HandshakeNegotiator {
    /// Create a negotiator for the given mode.
    pub fn new(mode: PeerMode, user_agent: impl Into<String>) -> Self {
        Self {
            mode,
            user_agent: user_agent.into(),
            endpoints: None,
            response_timeout: None,
            state: HandshakeState::Start,
        }
    }

    /// Set the addresses advertised in acceptor mode.
    pub fn with_endpoints(mut self, endpoints: Option<Endpoints>) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// Bound the response read.
    pub fn with_response_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.response_timeout = timeout;
        self
    }

    /// Current state.
    pub fn state(&self) -> &HandshakeState {
        &self.state
    }

    fn transition(&mut self, next: HandshakeState) {
        tracing::debug!(from = %self.state, to = %next, "Handshake state transition");
        self.state = next;
    }

    /// The connect request for this mode.
    pub fn request(&self) -> String {
        let mut lines = vec![CONNECT_LINE.to_string()];
        match self.mode {
            PeerMode::Probe => {
                lines.push(format!("User-Agent: {}", self.user_agent));
                lines.push("X-Ultrapeer: False".to_string());
                lines.push("X-Query-Routing: 0.1".to_string());
                lines.push("Pong-Caching: 0.1".to_string());
                lines.push("GGEP: 0.5".to_string());
            }
            PeerMode::Acceptor => {
                if let Some(endpoints) = self.endpoints {
                    lines.push(format!("Listen-IP: {}", endpoints.listen));
                    lines.push(format!("Remote-IP: {}", endpoints.remote));
                }
                lines.push(format!("User-Agent: {}", self.user_agent));
                lines.push(format!("Accept: {}", G2_MIME));
                lines.push("X-Hub: False".to_string());
            }
        }
        terminate(lines)
    }

    /// The final acknowledgment for this mode.
    pub fn acknowledgment(&self) -> String {
        let mut lines = vec![OK_LINE.to_string()];
        if self.mode == PeerMode::Acceptor {
            lines.push(format!("Content-Type: {}", G2_MIME));
            lines.push("X-Hub: False".to_string());
        }
        terminate(lines)
    }

    /// Run the handshake on `stream`.
    ///
    /// Peer lists from the response are merged into `hostcache` and saved
    /// even when the peer is then rejected. On failure the stream is left
    /// open; closing it is up to the caller.
    pub async fn negotiate<S>(
        &mut self,
        stream: &mut S,
        hostcache: &mut HostCache,
    ) -> P2pResult<HandshakeHeaders>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let result = self.run(stream, hostcache).await;
        if let Err(e) = &result {
            self.transition(HandshakeState::Rejected(e.to_string()));
        }
        result
    }

    async fn run<S>(
        &mut self,
        stream: &mut S,
        hostcache: &mut HostCache,
    ) -> P2pResult<HandshakeHeaders>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let request = self.request();
        tracing::debug!(mode = %self.mode, request = %request.trim_end(), "Sending connect request");
        stream.write_all(request.as_bytes()).await?;
        stream.flush().await?;
        self.transition(HandshakeState::RequestSent);

        let raw = read_until_close(stream, self.response_timeout).await;
        if raw.is_empty() {
            return Err(P2pError::EmptyResponse { what: "handshake" });
        }
        self.transition(HandshakeState::ResponseBuffered);

        let headers = HandshakeHeaders::parse(&String::from_utf8_lossy(&raw));
        tracing::debug!(status = %headers.title(), headers = headers.len(), "Parsed handshake response");

        self.harvest_peers(&headers, hostcache).await;
        self.validate(&headers)?;
        self.transition(HandshakeState::Validated);

        stream.write_all(self.acknowledgment().as_bytes()).await?;
        stream.flush().await?;
        self.transition(HandshakeState::Accepted);

        Ok(headers)
    }

    async fn harvest_peers(&self, headers: &HandshakeHeaders, hostcache: &mut HostCache) {
        let mut added = 0;
        for name in self.mode.peer_list_headers() {
            if let Some(list) = headers.get(name) {
                added += hostcache.merge_peer_list(list);
            }
        }
        if added == 0 {
            return;
        }

        tracing::info!(added, total = hostcache.len(), "Cached advertised peers");
        if let Err(e) = hostcache.save().await {
            tracing::warn!(error = %e, "Failed to save host cache");
        }
    }

    /// Check a response against this mode's acceptance rules.
    pub fn validate(&self, headers: &HandshakeHeaders) -> P2pResult<()> {
        let status = headers.title();
        if !status.contains(ACCEPT_CODE) || !status.contains(PROTOCOL_TOKEN) {
            return Err(P2pError::HandshakeRejected {
                status: status.to_string(),
            });
        }

        if self.mode == PeerMode::Acceptor {
            expect_header(headers, "Content-Type", G2_MIME)?;
            expect_header(headers, "Accept", G2_MIME)?;

            if !headers.is_true("X-Hub") && !headers.is_true("X-Ultrapeer") {
                return Err(P2pError::NotAHub);
            }
        }

        Ok(())
    }
}

fn expect_header(headers: &HandshakeHeaders, name: &'static str, expected: &str) -> P2pResult<()> {
    match headers.get(name) {
        Some(value) if value.trim() == expected => Ok(()),
        other => Err(P2pError::InvalidHeader {
            name,
            value: other.unwrap_or_default().to_string(),
        }),
    }
}

fn terminate(lines: Vec<String>) -> String {
    let mut out = String::new();
    for line in lines {
        out.push_str(&line);
        out.push_str("\r\n");
    }
    out.push_str("\r\n");
    out
}
