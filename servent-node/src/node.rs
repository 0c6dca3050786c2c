//! Node orchestration.

use std::time::Duration;

use servent_p2p::{PeerInfo, PingOutcome, Servent};

use crate::config::NodeConfig;

/// What a successful run achieved.
#[derive(Debug)]
pub struct RunReport {
    /// The peer that accepted us.
    pub peer: PeerInfo,
    /// Its answer to our PING.
    pub ping: PingOutcome,
    /// Time from handshake acceptance to the end of the PING exchange.
    pub link_age: Duration,
}

/// The running node.
pub struct Node {
    servent: Servent,
}

impl Node {
    /// Create a node, loading the host cache.
    pub async fn new(config: NodeConfig) -> anyhow::Result<Self> {
        let servent = Servent::new(config.servent_config()).await?;
        Ok(Self { servent })
    }

    /// Bootstrap into the overlay and probe the peer once.
    pub async fn run(mut self) -> anyhow::Result<RunReport> {
        let peer = self.servent.bootstrap().await?.clone();
        tracing::info!(
            peer = %peer,
            status = %peer.headers.title(),
            hub = peer.is_hub(),
            "Handshake accepted"
        );

        let ping = self.servent.ping().await?;
        let link_age = peer.connection_duration();
        match &ping.reply {
            Some(reply) => tracing::info!(
                reply = %reply,
                bytes = ping.raw.len(),
                link_age = ?link_age,
                "PING answered"
            ),
            None => tracing::info!(
                bytes = ping.raw.len(),
                link_age = ?link_age,
                "PING got no decodable reply"
            ),
        }

        tracing::info!(
            candidates = self.servent.hostcache().len(),
            "Run complete"
        );
        Ok(RunReport {
            peer,
            ping,
            link_age,
        })
    }
}
