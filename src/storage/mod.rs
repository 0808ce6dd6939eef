// Storage module - PERSISTENCE
// Peer store contract, query model, and the in-memory and sled backends

mod query;
mod sled_store;
mod store;

pub use query::PeerQuery;
pub use sled_store::{SledPeerStore, StorageStats, StoreConfig};
pub use store::{MemoryPeerStore, PeerStore, StoreError};
