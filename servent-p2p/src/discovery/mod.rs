//! Peer discovery.
//!
//! This module provides:
//! - The host cache: a persisted set of candidate peer addresses
//! - Merging of peer lists advertised during the handshake

pub mod persistence;

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::P2pResult;

pub use persistence::{load_addresses, save_addresses};

/// A `host:port` candidate.
///
/// Kept exactly as written; resolution happens only when dialing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PeerAddress(String);

impl PeerAddress {
    /// Borrow the address text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PeerAddress {
    fn from(addr: &str) -> Self {
        Self(addr.to_string())
    }
}

impl From<String> for PeerAddress {
    fn from(addr: String) -> Self {
        Self(addr)
    }
}

impl fmt::Display for PeerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Persisted set of candidate peer addresses.
///
/// The in-memory set is authoritative. `delete` flushes the whole set to disk
/// before returning; `add` does not touch the file, callers `save` after a
/// batch. Mutation needs `&mut self`, so sharing a cache between tasks
/// requires wrapping it in a lock first.
#[derive(Debug)]
pub struct HostCache {
    /// Backing file.
    path: PathBuf,
    /// Known addresses.
    addrs: HashSet<PeerAddress>,
}

impl HostCache {
    /// Create an empty cache backed by `path`. Nothing is read or written.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            addrs: HashSet::new(),
        }
    }

    /// Load the cache from `path`. Fails if the file cannot be opened.
    pub async fn load(path: impl Into<PathBuf>) -> P2pResult<Self> {
        let mut cache = Self::new(path);
        for addr in load_addresses(&cache.path).await? {
            cache.addrs.insert(addr);
        }
        Ok(cache)
    }

    /// Insert an address. Returns `false` if it was already present.
    pub fn add(&mut self, addr: impl Into<PeerAddress>) -> bool {
        self.addrs.insert(addr.into())
    }

    /// All known addresses, in no particular order.
    pub fn items(&self) -> Vec<PeerAddress> {
        self.addrs.iter().cloned().collect()
    }

    /// Remove an address and persist the result.
    pub async fn delete(&mut self, addr: &PeerAddress) -> P2pResult<()> {
        self.addrs.remove(addr);
        self.save().await
    }

    /// Write every address to the backing file, replacing its contents.
    pub async fn save(&self) -> P2pResult<()> {
        let mut addrs = self.items();
        addrs.sort();
        save_addresses(&self.path, &addrs).await
    }

    /// Merge a comma-separated peer list as advertised in `X-Try` style
    /// headers. Each entry is `host:port` optionally followed by a space and
    /// extra data (a timestamp, usually), which is dropped.
    ///
    /// Returns the number of addresses that were new. Does not persist.
    pub fn merge_peer_list(&mut self, value: &str) -> usize {
        let mut added = 0;
        for entry in value.split(',') {
            let addr = entry.trim().split(' ').next().unwrap_or_default();
            if !addr.is_empty() && self.add(addr) {
                added += 1;
            }
        }
        added
    }

    /// Check membership.
    pub fn contains(&self, addr: &PeerAddress) -> bool {
        self.addrs.contains(addr)
    }

    /// Number of known addresses.
    pub fn len(&self) -> usize {
        self.addrs.len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.addrs.is_empty()
    }

    /// Backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}
