// SledPeerStore - Persistent peer storage using sled
//
// Each record is postcard-encoded under `peer:<public key>`.

use super::{PeerQuery, PeerStore, StoreError};
use crate::peer::PeerRecord;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Key prefix for peer records
const PEER_PREFIX: &[u8] = b"peer:";

fn peer_key(public_key: &str) -> Vec<u8> {
    [PEER_PREFIX, public_key.as_bytes()].concat()
}

/// Configuration for the sled-backed store
#[derive(Clone, Debug)]
pub struct StoreConfig {
    /// Database directory
    pub path: PathBuf,
    /// Page cache size
    pub cache_capacity_bytes: u64,
    /// Flush to disk after every save
    pub flush_on_write: bool,
    /// Delete the database when the store is dropped
    pub temporary: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./data/peers"),
            cache_capacity_bytes: 64 * 1024 * 1024,
            flush_on_write: false,
            temporary: false,
        }
    }
}

impl StoreConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.path = path.as_ref().to_path_buf();
        self
    }

    pub fn with_cache_capacity(mut self, bytes: u64) -> Self {
        self.cache_capacity_bytes = bytes;
        self
    }

    pub fn with_flush_on_write(mut self, flush: bool) -> Self {
        self.flush_on_write = flush;
        self
    }

    pub fn with_temporary(mut self, temporary: bool) -> Self {
        self.temporary = temporary;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), StoreError> {
        if self.path.as_os_str().is_empty() && !self.temporary {
            return Err(StoreError::InvalidConfig("path cannot be empty".to_string()));
        }
        if self.cache_capacity_bytes == 0 {
            return Err(StoreError::InvalidConfig(
                "cache_capacity_bytes cannot be 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Statistics about the storage
#[derive(Clone, Debug)]
pub struct StorageStats {
    /// Number of stored peers
    pub peer_count: usize,
    /// Approximate disk size in bytes
    pub disk_size_bytes: u64,
}

/// Peer store backed by sled
pub struct SledPeerStore {
    db: sled::Db,
    flush_on_write: bool,
}

impl SledPeerStore {
    /// Open or create a store at the given path with default settings
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        Self::open_with_config(&StoreConfig::new().with_path(path))
    }

    pub fn open_with_config(config: &StoreConfig) -> Result<Self, StoreError> {
        config.validate()?;

        let mut sled_config = sled::Config::new()
            .cache_capacity(config.cache_capacity_bytes)
            .temporary(config.temporary);
        if !config.path.as_os_str().is_empty() {
            sled_config = sled_config.path(&config.path);
        }
        let db = sled_config
            .open()
            .map_err(|e| StoreError::OpenFailed(e.to_string()))?;

        debug!("Opened peer store at {:?}", config.path);
        Ok(Self {
            db,
            flush_on_write: config.flush_on_write,
        })
    }

    /// Flush all pending writes to disk
    pub fn flush(&self) -> Result<(), StoreError> {
        self.db
            .flush()
            .map_err(|e| StoreError::FlushFailed(e.to_string()))?;
        Ok(())
    }

    pub fn stats(&self) -> Result<StorageStats, StoreError> {
        Ok(StorageStats {
            peer_count: self.db.scan_prefix(PEER_PREFIX).count(),
            disk_size_bytes: self.db.size_on_disk().unwrap_or(0),
        })
    }

    fn decode(key: &[u8], bytes: &[u8]) -> Option<PeerRecord> {
        match postcard::from_bytes::<PeerRecord>(bytes) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(
                    "Skipping undecodable peer entry {}: {}",
                    String::from_utf8_lossy(key),
                    e
                );
                None
            }
        }
    }
}

#[async_trait]
impl PeerStore for SledPeerStore {
    async fn save(&self, record: &PeerRecord) -> Result<(), StoreError> {
        let bytes = postcard::to_allocvec(record)
            .map_err(|e| StoreError::SerializationFailed(e.to_string()))?;
        self.db.insert(peer_key(record.public_key()), bytes)?;

        if self.flush_on_write {
            self.flush()?;
        }
        Ok(())
    }

    async fn find(&self, query: &PeerQuery) -> Result<Vec<PeerRecord>, StoreError> {
        let mut records = Vec::new();

        match query.only_keys() {
            Some(keys) => {
                for public_key in keys {
                    let key = peer_key(public_key);
                    if let Some(bytes) = self.db.get(&key)? {
                        records.extend(Self::decode(&key, &bytes));
                    }
                }
                // Keep the key order of a prefix scan
                records.sort_by(|a, b| a.public_key().cmp(b.public_key()));
            }
            None => {
                for entry in self.db.scan_prefix(PEER_PREFIX) {
                    let (key, bytes) = entry?;
                    records.extend(Self::decode(&key, &bytes));
                }
            }
        }

        Ok(query.apply(records))
    }
}
