// peerbook - peer directory for a currency node
//
// Tracks known peers, resolves how to reach them, keeps their liveness
// status and picks gossip targets.

pub mod directory;
pub mod endpoint;
pub mod peer;
pub mod storage;
pub mod transport;
