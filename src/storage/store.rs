// PeerStore - persistence contract for peer records
//
// Records are keyed by public key, so a store can never hold two records
// for the same peer: saving again replaces the previous version.

use super::PeerQuery;
use crate::peer::PeerRecord;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use thiserror::Error;
use tokio::sync::RwLock;

/// Errors from storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to open database: {0}")]
    OpenFailed(String),

    #[error("Database operation failed: {0}")]
    DatabaseError(String),

    #[error("Serialization failed: {0}")]
    SerializationFailed(String),

    #[error("Flush failed: {0}")]
    FlushFailed(String),

    #[error("Invalid store configuration: {0}")]
    InvalidConfig(String),
}

impl From<sled::Error> for StoreError {
    fn from(err: sled::Error) -> Self {
        StoreError::DatabaseError(err.to_string())
    }
}

/// Persistence backend for the peer directory
#[async_trait]
pub trait PeerStore: Send + Sync {
    /// Insert or replace the record stored under its public key
    async fn save(&self, record: &PeerRecord) -> Result<(), StoreError>;

    /// Records matching the query
    async fn find(&self, query: &PeerQuery) -> Result<Vec<PeerRecord>, StoreError>;
}

/// In-memory store, for tests and embedders that bring their own durability
pub struct MemoryPeerStore {
    peers: RwLock<BTreeMap<String, PeerRecord>>,
    save_count: AtomicUsize,
    fail_saves: AtomicBool,
}

impl MemoryPeerStore {
    pub fn new() -> Self {
        Self {
            peers: RwLock::new(BTreeMap::new()),
            save_count: AtomicUsize::new(0),
            fail_saves: AtomicBool::new(false),
        }
    }

    /// Number of successful writes so far
    pub fn save_count(&self) -> usize {
        self.save_count.load(Ordering::SeqCst)
    }

    /// Make every subsequent save fail
    pub fn fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    pub async fn len(&self) -> usize {
        self.peers.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.peers.read().await.is_empty()
    }
}

impl Default for MemoryPeerStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PeerStore for MemoryPeerStore {
    async fn save(&self, record: &PeerRecord) -> Result<(), StoreError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(StoreError::DatabaseError("Mock failure".to_string()));
        }

        let mut stored = record.clone();
        stored.pubkey = None;
        self.peers
            .write()
            .await
            .insert(stored.public_key().to_string(), stored);
        self.save_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn find(&self, query: &PeerQuery) -> Result<Vec<PeerRecord>, StoreError> {
        let peers = self.peers.read().await;
        Ok(query.apply(peers.values().cloned()))
    }
}
