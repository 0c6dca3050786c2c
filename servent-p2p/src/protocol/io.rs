//! Stream reading helpers.

use std::time::Duration;

use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::time::timeout;

/// Bytes requested per read.
pub const READ_CHUNK_SIZE: usize = 1024;

async fn fill<S>(stream: &mut S, buf: &mut BytesMut)
where
    S: AsyncRead + Unpin,
{
    let mut chunk = [0u8; READ_CHUNK_SIZE];
    loop {
        match stream.read(&mut chunk).await {
            Ok(0) => break,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
            Err(e) => {
                tracing::debug!(error = %e, "Read ended with error");
                break;
            }
        }
    }
}

/// Accumulate everything the peer sends until it closes the stream or a read
/// fails.
///
/// There is no framing here: the end of the data is the end of the stream.
/// With `deadline` set, reading also stops once it elapses and whatever
/// arrived so far is returned. Without it a peer that stays silent but keeps
/// the connection open blocks this call forever.
pub async fn read_until_close<S>(stream: &mut S, deadline: Option<Duration>) -> BytesMut
where
    S: AsyncRead + Unpin,
{
    let mut buf = BytesMut::new();
    match deadline {
        Some(limit) => {
            if timeout(limit, fill(stream, &mut buf)).await.is_err() {
                tracing::debug!(bytes = buf.len(), deadline = ?limit, "Read deadline reached");
            }
        }
        None => fill(stream, &mut buf).await,
    }
    buf
}
