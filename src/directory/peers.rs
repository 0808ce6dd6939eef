// Peer Directory - Track known peers and answer queries about them
//
// All reads and writes go through a PeerStore. The directory keeps no
// state of its own, so concurrent writers to one peer resolve to the
// store's last write.

use super::selector::{choose_up_to_4, RECENT_WINDOW};
use super::status;
use crate::peer::{PeerRecord, PeerStatus};
use crate::storage::{PeerQuery, PeerStore, StoreError};
use thiserror::Error;
use tracing::{debug, info};

/// Directory errors
#[derive(Error, Debug)]
pub enum DirectoryError {
    #[error("Unknown peer {0}")]
    NotFound(String),

    #[error("Peer {0} is already known")]
    AlreadyKnown(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Statistics about the directory
#[derive(Clone, Debug, Default)]
pub struct DirectoryStats {
    pub total_peers: usize,
    pub up_peers: usize,
    pub down_peers: usize,
    pub new_peers: usize,
    pub reachable_peers: usize,
}

/// Queryable collection of peer records
pub struct PeerDirectory<S: PeerStore> {
    store: S,
}

impl<S: PeerStore> PeerDirectory<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // ========================================================================
    // WRITES
    // ========================================================================

    /// Record a newly discovered peer
    pub async fn discover(&self, mut record: PeerRecord) -> Result<PeerRecord, DirectoryError> {
        let existing = self
            .store
            .find(&PeerQuery::by_key(record.public_key()))
            .await?;
        if !existing.is_empty() {
            return Err(DirectoryError::AlreadyKnown(record.public_key().to_string()));
        }

        status::persist(&self.store, &mut record).await?;
        info!("Discovered peer {} ({})", record.key_id(), record.status());
        Ok(record)
    }

    /// Persist changes made to a record
    pub async fn save(&self, record: &mut PeerRecord) -> Result<(), DirectoryError> {
        status::persist(&self.store, record).await?;
        Ok(())
    }

    /// Change a peer's status; see [`status::set_status`]
    pub async fn set_status(
        &self,
        record: &mut PeerRecord,
        new_status: PeerStatus,
    ) -> Result<bool, DirectoryError> {
        Ok(status::set_status(&self.store, record, new_status).await?)
    }

    // ========================================================================
    // QUERIES
    // ========================================================================

    /// The peer with this public key
    pub async fn get_one(&self, public_key: &str) -> Result<PeerRecord, DirectoryError> {
        self.store
            .find(&PeerQuery::by_key(public_key))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| DirectoryError::NotFound(public_key.to_string()))
    }

    /// Known peers among `keys`, in no particular order
    pub async fn get_by_keys<K: AsRef<str>>(
        &self,
        keys: &[K],
    ) -> Result<Vec<PeerRecord>, DirectoryError> {
        Ok(self.store.find(&PeerQuery::by_keys(keys)).await?)
    }

    /// Every peer except those in `excluded`
    pub async fn get_all_excluding<K: AsRef<str>>(
        &self,
        excluded: &[K],
    ) -> Result<Vec<PeerRecord>, DirectoryError> {
        Ok(self.store.find(&PeerQuery::all().excluding(excluded)).await?)
    }

    /// The 10 most recently updated peers outside `excluded`, newest first,
    /// optionally restricted to `status_filter`
    pub async fn get_recent_excluding<K: AsRef<str>>(
        &self,
        excluded: &[K],
        status_filter: Option<&[PeerStatus]>,
    ) -> Result<Vec<PeerRecord>, DirectoryError> {
        let mut query = PeerQuery::all()
            .excluding(excluded)
            .recent_first()
            .limit(RECENT_WINDOW);
        if let Some(statuses) = status_filter {
            query = query.with_statuses(statuses);
        }

        let recent = self.store.find(&query).await?;
        debug!("{} recent peer(s) outside {} excluded", recent.len(), excluded.len());
        Ok(recent)
    }

    // ========================================================================
    // GOSSIP SELECTION
    // ========================================================================

    /// Up to 4 peers drawn from the 10 most recently updated
    pub async fn random_without<K: AsRef<str>>(
        &self,
        excluded: &[K],
    ) -> Result<Vec<PeerRecord>, DirectoryError> {
        let recent = self.get_recent_excluding(excluded, None).await?;
        Ok(choose_up_to_4(recent))
    }

    /// Up to 4 peers drawn from the 10 most recently updated NEW_BACK/UP peers
    pub async fn random_ups_without<K: AsRef<str>>(
        &self,
        excluded: &[K],
    ) -> Result<Vec<PeerRecord>, DirectoryError> {
        let recent = self
            .get_recent_excluding(excluded, Some(&PeerStatus::GOSSIP_READY[..]))
            .await?;
        Ok(choose_up_to_4(recent))
    }

    pub async fn stats(&self) -> Result<DirectoryStats, DirectoryError> {
        let peers = self.store.find(&PeerQuery::all()).await?;
        let mut stats = DirectoryStats {
            total_peers: peers.len(),
            ..DirectoryStats::default()
        };

        for peer in &peers {
            match peer.status() {
                PeerStatus::Up | PeerStatus::NewBack => stats.up_peers += 1,
                PeerStatus::Down => stats.down_peers += 1,
                PeerStatus::New | PeerStatus::Ask => stats.new_peers += 1,
                PeerStatus::Nothing => {}
            }
            if peer.is_reachable() {
                stats.reachable_peers += 1;
            }
        }

        Ok(stats)
    }
}
