//! Host cache file storage.
//!
//! The file is plain UTF-8 text with one `host:port` per line.

use std::io;
use std::path::Path;

use tokio::fs;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

use crate::discovery::PeerAddress;
use crate::error::{P2pError, P2pResult};

fn cache_error(path: &Path, source: io::Error) -> P2pError {
    P2pError::HostCache {
        path: path.to_path_buf(),
        source,
    }
}

/// Load addresses from a host cache file.
///
/// A missing file is an error; there is no built-in seed list to fall back on.
pub async fn load_addresses(path: &Path) -> P2pResult<Vec<PeerAddress>> {
    let mut file = fs::File::open(path)
        .await
        .map_err(|e| cache_error(path, e))?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)
        .await
        .map_err(|e| cache_error(path, e))?;

    let addrs: Vec<PeerAddress> = contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(PeerAddress::from)
        .collect();

    tracing::info!(count = addrs.len(), path = ?path, "Loaded host cache");

    Ok(addrs)
}

/// Rewrite the host cache file with exactly `addrs`.
pub async fn save_addresses(path: &Path, addrs: &[PeerAddress]) -> P2pResult<()> {
    let mut contents = String::new();
    for addr in addrs {
        contents.push_str(addr.as_str());
        contents.push('\n');
    }

    // Write to temp file first, then rename over the target
    let temp_path = path.with_extension("tmp");

    let mut file = fs::File::create(&temp_path)
        .await
        .map_err(|e| cache_error(&temp_path, e))?;
    file.write_all(contents.as_bytes())
        .await
        .map_err(|e| cache_error(&temp_path, e))?;
    file.sync_all().await.map_err(|e| cache_error(&temp_path, e))?;
    drop(file);

    fs::rename(&temp_path, path)
        .await
        .map_err(|e| cache_error(path, e))?;

    tracing::debug!(count = addrs.len(), path = ?path, "Saved host cache");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("hostcache.txt");

        let addrs = vec![
            PeerAddress::from("10.0.0.1:6346"),
            PeerAddress::from("gnutella.example.org:6348"),
        ];

        save_addresses(&path, &addrs).await.unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        assert_eq!(raw, "10.0.0.1:6346\ngnutella.example.org:6348\n");

        let loaded = load_addresses(&path).await.unwrap();
        assert_eq!(loaded, addrs);
    }

    #[tokio::test]
    async fn test_load_skips_blank_lines_and_crlf() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("hostcache.txt");
        std::fs::write(&path, "10.0.0.1:6346\r\n\r\n  \n10.0.0.2:6346").unwrap();

        let loaded = load_addresses(&path).await.unwrap();
        assert_eq!(
            loaded,
            vec![PeerAddress::from("10.0.0.1:6346"), PeerAddress::from("10.0.0.2:6346")]
        );
    }

    #[tokio::test]
    async fn test_load_nonexistent() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing.txt");

        let err = load_addresses(&path).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Persistence);
    }

    #[tokio::test]
    async fn test_save_creates_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("fresh.txt");
        assert!(!path.exists());

        save_addresses(&path, &[]).await.unwrap();
        assert!(path.exists());
        assert!(load_addresses(&path).await.unwrap().is_empty());
    }
}
