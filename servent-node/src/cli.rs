//! Command-line argument parsing.

use std::net::IpAddr;
use std::path::PathBuf;

use clap::Parser;
use servent_p2p::PeerMode;

/// Gnutella bootstrap servent.
#[derive(Parser, Debug, Clone)]
#[command(name = "servent")]
#[command(about = "Connect to a Gnutella peer from the host cache and probe it with a PING")]
#[command(version)]
pub struct Cli {
    /// Host cache file, one host:port per line. Must exist.
    #[arg(long, default_value = "hostcache.txt")]
    pub hostcache: PathBuf,

    /// Handshake profile (probe, acceptor).
    #[arg(long, default_value = "probe")]
    pub mode: PeerMode,

    /// Dial timeout in seconds.
    #[arg(long, default_value_t = 60)]
    pub connect_timeout: u64,

    /// Handshake read deadline in seconds. Unset reads until the peer closes.
    #[arg(long)]
    pub handshake_timeout: Option<u64>,

    /// PING read deadline in seconds. Unset reads until the peer closes.
    #[arg(long)]
    pub ping_timeout: Option<u64>,

    /// Public IP advertised in acceptor mode.
    #[arg(long)]
    pub listen_ip: Option<IpAddr>,

    /// User agent sent in the handshake.
    #[arg(long)]
    pub user_agent: Option<String>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
