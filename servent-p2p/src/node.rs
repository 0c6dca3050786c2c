//! Servent orchestrator.
//!
//! Owns the host cache and at most one peer link. `bootstrap` sweeps the
//! cache until a peer accepts the handshake; `ping` then probes that link.

use std::net::SocketAddr;

use bytes::{Bytes, BytesMut};
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;

use crate::config::ServentConfig;
use crate::discovery::{HostCache, PeerAddress};
use crate::error::{P2pError, P2pResult};
use crate::manager::connect_to_peer;
use crate::peer::{PeerInfo, PeerLink};
use crate::protocol::{
    read_until_close, Endpoints, Guid, HandshakeNegotiator, Message, MessageCodec, MessageType,
    PeerMode, HEADER_LEN,
};

/// What came back after a PING.
#[derive(Debug, Clone)]
pub struct PingOutcome {
    /// Everything the peer sent until it closed the stream.
    pub raw: Bytes,
    /// The first message, when at least a full header arrived.
    pub reply: Option<Message>,
}

/// A Gnutella servent.
#[derive(Debug)]
pub struct Servent {
    /// Servent configuration.
    config: ServentConfig,
    /// Identifier stamped on originated messages.
    guid: Guid,
    /// Candidate peers.
    hostcache: HostCache,
    /// Accepted peer, once bootstrap succeeds.
    peer: Option<PeerLink>,
    /// Binary message codec.
    codec: MessageCodec,
}

impl Servent {
    /// Create a servent, loading the host cache from `config.hostcache_path`.
    ///
    /// Fails if the cache file cannot be read.
    pub async fn new(config: ServentConfig) -> P2pResult<Self> {
        let hostcache = HostCache::load(&config.hostcache_path).await?;
        Ok(Self::with_hostcache(config, hostcache))
    }

    /// Create a servent around an already loaded cache.
    pub fn with_hostcache(config: ServentConfig, hostcache: HostCache) -> Self {
        let guid = Guid::random();
        tracing::info!(
            guid = %guid,
            mode = %config.mode,
            candidates = hostcache.len(),
            "Servent created"
        );

        Self {
            config,
            guid,
            hostcache,
            peer: None,
            codec: MessageCodec::new(),
        }
    }

    /// Dial cached peers until one accepts the handshake.
    ///
    /// Candidates that fail to connect or are rejected are evicted from the
    /// cache. Peers advertised along the way are cached but not tried in this
    /// sweep.
    pub async fn bootstrap(&mut self) -> P2pResult<&PeerInfo> {
        let candidates = self.hostcache.items();
        tracing::info!(candidates = candidates.len(), "Starting bootstrap");

        for addr in candidates {
            let stream = match connect_to_peer(&addr, self.config.connect_timeout).await {
                Ok(stream) => stream,
                Err(e) => {
                    self.evict(&addr, &e).await;
                    continue;
                }
            };

            match self.handshake(&addr, stream).await {
                Ok(link) => {
                    tracing::info!(peer = %link.info, "Connected to peer");
                    return Ok(&self.peer.insert(link).info);
                }
                Err(e) if e.is_recoverable() => self.evict(&addr, &e).await,
                Err(e) => return Err(e),
            }
        }

        tracing::warn!("Host cache exhausted");
        Err(P2pError::NoPeerFound)
    }

    async fn handshake(&mut self, addr: &PeerAddress, mut stream: TcpStream) -> P2pResult<PeerLink> {
        let remote = stream.peer_addr().ok();
        let endpoints = match self.config.mode {
            PeerMode::Acceptor => self.endpoints(&stream),
            PeerMode::Probe => None,
        };

        let mut negotiator = HandshakeNegotiator::new(self.config.mode, &self.config.user_agent)
            .with_endpoints(endpoints)
            .with_response_timeout(self.config.handshake_timeout);
        let headers = negotiator.negotiate(&mut stream, &mut self.hostcache).await?;

        Ok(PeerLink::new(stream, PeerInfo::new(addr.clone(), remote, headers)))
    }

    /// Addresses advertised in acceptor mode.
    fn endpoints(&self, stream: &TcpStream) -> Option<Endpoints> {
        let local = stream.local_addr().ok()?;
        let remote = stream.peer_addr().ok()?;
        let ip = self.config.listen_ip.unwrap_or_else(|| local.ip());

        Some(Endpoints {
            listen: SocketAddr::new(ip, self.config.port),
            remote,
        })
    }

    async fn evict(&mut self, addr: &PeerAddress, reason: &P2pError) {
        tracing::warn!(addr = %addr, error = %reason, "Evicting peer");
        if let Err(e) = self.hostcache.delete(addr).await {
            tracing::warn!(error = %e, "Failed to save host cache after eviction");
        }
    }

    /// Send a PING on the active link and collect the response.
    pub async fn ping(&mut self) -> P2pResult<PingOutcome> {
        let ping = Message::ping(self.guid, self.config.ttl);
        let mut frame = BytesMut::new();
        self.codec.encode(&ping, &mut frame)?;

        let link = self.peer.as_mut().ok_or(P2pError::NotConnected)?;
        tracing::debug!(peer = %link.info.addr, message = %ping, "Sending PING");
        link.stream.write_all(&frame).await?;
        link.stream.flush().await?;

        let raw = read_until_close(&mut link.stream, self.config.ping_timeout)
            .await
            .freeze();
        tracing::debug!(peer = %link.info.addr, bytes = raw.len(), "PING response read");

        let reply = if raw.len() >= HEADER_LEN {
            let message = self.codec.decode(&raw)?;
            tracing::info!(reply = %message, "Received reply to PING");
            Some(message)
        } else {
            None
        };

        Ok(PingOutcome { raw, reply })
    }

    /// Originate a message of the given type.
    pub async fn send(&mut self, kind: MessageType) -> P2pResult<PingOutcome> {
        match kind {
            MessageType::Ping => self.ping().await,
            other => Err(P2pError::Unimplemented(other)),
        }
    }

    /// Reply to a PING.
    pub async fn pong(&mut self) -> P2pResult<()> {
        Err(P2pError::Unimplemented(MessageType::Pong))
    }

    /// Issue a search.
    pub async fn query(&mut self) -> P2pResult<()> {
        Err(P2pError::Unimplemented(MessageType::Query))
    }

    /// Answer a search.
    pub async fn query_hit(&mut self) -> P2pResult<()> {
        Err(P2pError::Unimplemented(MessageType::QueryHit))
    }

    /// Ask a firewalled servent to connect out.
    pub async fn push(&mut self) -> P2pResult<()> {
        Err(P2pError::Unimplemented(MessageType::Push))
    }

    /// Announce a disconnect.
    pub async fn bye(&mut self) -> P2pResult<()> {
        Err(P2pError::Unimplemented(MessageType::Bye))
    }

    /// Whether an incoming PING should be answered. No policy exists yet, so
    /// nothing is.
    pub fn validate_ping(&self, _ping: &Message) -> bool {
        false
    }

    /// The accepted peer, if any.
    pub fn peer(&self) -> Option<&PeerInfo> {
        self.peer.as_ref().map(|link| &link.info)
    }

    /// This servent's identifier.
    pub fn guid(&self) -> Guid {
        self.guid
    }

    /// The host cache.
    pub fn hostcache(&self) -> &HostCache {
        &self.hostcache
    }
}
