// Directory module - WHO TO TALK TO
// Peer lookups, status transitions and gossip target selection

mod peers;
pub mod selector;
pub mod status;

pub use peers::{DirectoryError, DirectoryStats, PeerDirectory};
pub use selector::{choose_up_to_4, choose_up_to_4_with, GOSSIP_SAMPLE_SIZE, RECENT_WINDOW};
