// Peer module - WHO IS OUT THERE
// Peer records, their liveness status and the views derived from them

mod projection;
mod record;

pub use projection::{Canonicalizer, PeerSummary, PublicPeerView};
pub use record::{PeerError, PeerRecord, PeerStatus};
