// Status Tracker - idempotent liveness transitions
//
// Any status may follow any other; only a change triggers a write.

use crate::peer::{PeerRecord, PeerStatus};
use crate::storage::{PeerStore, StoreError};
use tracing::{debug, info};

/// Persist a record, refreshing its `updated_at` first
pub async fn persist<S>(store: &S, record: &mut PeerRecord) -> Result<(), StoreError>
where
    S: PeerStore + ?Sized,
{
    record.touch();
    store.save(record).await
}

/// Move `record` to `status`.
///
/// Returns `Ok(false)` without touching the store when the record already
/// has that status. Store failures are returned as is.
pub async fn set_status<S>(
    store: &S,
    record: &mut PeerRecord,
    status: PeerStatus,
) -> Result<bool, StoreError>
where
    S: PeerStore + ?Sized,
{
    if record.status() == status {
        debug!("Peer {} already {}", record.key_id(), status);
        return Ok(false);
    }

    let previous = record.status();
    record.status = status;
    persist(store, record).await?;

    info!("Peer {} {} -> {}", record.key_id(), previous, status);
    Ok(true)
}
