//! Node configuration.

use std::time::Duration;

use servent_p2p::ServentConfig;

use crate::cli::Cli;

/// Complete node configuration.
#[derive(Debug, Clone)]
pub struct NodeConfig {
    /// Library configuration.
    pub servent: ServentConfig,

    /// Log level.
    pub log_level: String,
}

impl NodeConfig {
    /// Create a node configuration from CLI arguments.
    pub fn from_cli(cli: &Cli) -> Self {
        let mut servent = ServentConfig::new(&cli.hostcache)
            .with_mode(cli.mode)
            .with_connect_timeout(Duration::from_secs(cli.connect_timeout))
            .with_handshake_timeout(cli.handshake_timeout.map(Duration::from_secs))
            .with_ping_timeout(cli.ping_timeout.map(Duration::from_secs))
            .with_listen_ip(cli.listen_ip);

        if let Some(user_agent) = &cli.user_agent {
            servent = servent.with_user_agent(user_agent.clone());
        }

        Self {
            servent,
            log_level: cli.log_level.clone(),
        }
    }

    /// Configuration handed to the servent.
    pub fn servent_config(&self) -> ServentConfig {
        self.servent.clone()
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            servent: ServentConfig::default(),
            log_level: "info".to_string(),
        }
    }
}
