//! Outbound connections.

use std::time::Duration;

use tokio::net::TcpStream;
use tokio::time::timeout;

use crate::discovery::PeerAddress;
use crate::error::{P2pError, P2pResult};

/// Dial a cached address.
///
/// The address is handed to the resolver as written, so hostnames work as
/// well as literal IPs.
pub async fn connect_to_peer(addr: &PeerAddress, connect_timeout: Duration) -> P2pResult<TcpStream> {
    tracing::debug!(addr = %addr, "Connecting to peer");

    let stream = match timeout(connect_timeout, TcpStream::connect(addr.as_str())).await {
        Ok(Ok(stream)) => stream,
        Ok(Err(e)) => return Err(P2pError::Io(e)),
        Err(_) => {
            return Err(P2pError::ConnectionTimeout {
                addr: addr.to_string(),
            })
        }
    };

    if let Err(e) = stream.set_nodelay(true) {
        tracing::warn!(addr = %addr, error = %e, "Failed to set TCP_NODELAY");
    }

    tracing::debug!(addr = %addr, "TCP connection established, starting handshake");
    Ok(stream)
}
