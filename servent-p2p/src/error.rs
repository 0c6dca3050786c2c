//! P2P error types.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::protocol::framing::HEADER_LEN;
use crate::protocol::MessageType;

/// P2P-specific errors.
#[derive(Debug, Error)]
pub enum P2pError {
    /// I/O error during network operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Dialing the peer did not complete in time.
    #[error("Connection timeout to {addr}")]
    ConnectionTimeout { addr: String },

    /// The peer closed the stream without sending anything.
    #[error("Unable to read {what} response")]
    EmptyResponse { what: &'static str },

    /// An operation needed the active peer link but bootstrap has not succeeded.
    #[error("No active peer connection")]
    NotConnected,

    /// Status line lacks the acceptance code or protocol token.
    #[error("Handshake rejected: {status:?}")]
    HandshakeRejected { status: String },

    /// A required handshake header is missing or has the wrong value.
    #[error("Invalid {name} header: {value:?}")]
    InvalidHeader { name: &'static str, value: String },

    /// The peer is a leaf.
    #[error("Peer not a hub or ultra-peer")]
    NotAHub,

    /// The host cache file could not be read or written.
    #[error("Host cache error on {}: {source}", .path.display())]
    HostCache {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Fewer bytes than a message header.
    #[error("Message truncated: {len} bytes (header is {} bytes)", HEADER_LEN)]
    MessageTruncated { len: usize },

    /// Payload does not fit the 16-bit length field.
    #[error("Message too large: {size} bytes (max: {max})")]
    MessageTooLarge { size: usize, max: usize },

    /// Every host cache candidate failed.
    #[error("No peer found")]
    NoPeerFound,

    /// The message type is declared but has no behavior yet.
    #[error("{0} messages are not implemented")]
    Unimplemented(MessageType),
}

/// Coarse classification used by the bootstrap sweep and the binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Dial, read or write failure.
    Transport,
    /// The peer answered but is not acceptable.
    Protocol,
    /// The host cache file is unusable.
    Persistence,
    /// Malformed or oversized binary message.
    Codec,
    /// No candidate address succeeded.
    Exhaustion,
    /// Declared but not implemented.
    Unimplemented,
}

impl P2pError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            P2pError::Io(_)
            | P2pError::ConnectionTimeout { .. }
            | P2pError::EmptyResponse { .. }
            | P2pError::NotConnected => ErrorKind::Transport,
            P2pError::HandshakeRejected { .. }
            | P2pError::InvalidHeader { .. }
            | P2pError::NotAHub => ErrorKind::Protocol,
            P2pError::HostCache { .. } => ErrorKind::Persistence,
            P2pError::MessageTruncated { .. } | P2pError::MessageTooLarge { .. } => {
                ErrorKind::Codec
            }
            P2pError::NoPeerFound => ErrorKind::Exhaustion,
            P2pError::Unimplemented(_) => ErrorKind::Unimplemented,
        }
    }

    /// Whether the bootstrap sweep moves on to the next candidate.
    pub fn is_recoverable(&self) -> bool {
        matches!(self.kind(), ErrorKind::Transport | ErrorKind::Protocol)
    }
}

/// Result type for P2P operations.
pub type P2pResult<T> = Result<T, P2pError>;
