//! Gnutella servent binary.
//!
//! Loads the host cache, connects to the first peer that accepts the
//! handshake and probes it with a PING.

use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

use servent_node::cli::Cli;
use servent_node::config::NodeConfig;
use servent_node::node::Node;
use servent_node::shutdown::wait_for_shutdown_signal;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Parse CLI arguments
    let cli = Cli::parse_args();

    // Set up logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();

    tracing::info!("Servent v{}", env!("CARGO_PKG_VERSION"));

    let config = NodeConfig::from_cli(&cli);

    let result = tokio::select! {
        result = run(config) => result,
        signal = wait_for_shutdown_signal() => signal.map_err(anyhow::Error::from),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %format!("{:#}", e), "Servent failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: NodeConfig) -> anyhow::Result<()> {
    let node = Node::new(config).await?;
    node.run().await?;
    Ok(())
}
