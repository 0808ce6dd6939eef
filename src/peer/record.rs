// Peer Record - One known network participant
//
// Identity, advertised endpoints, observed liveness and bookkeeping
// timestamps for a single peer.

use crate::endpoint::BmaEndpoint;
use crate::transport::{ConnectError, TransportClient};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Peer-related errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum PeerError {
    #[error("Unknown peer status: {0}")]
    UnknownStatus(String),
}

/// Liveness status of a peer as observed by this node
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PeerStatus {
    /// Should be asked for its status
    Ask,
    /// Freshly discovered
    New,
    /// Answered back after we announced ourselves
    NewBack,
    /// Reachable
    Up,
    /// Unreachable
    Down,
    /// No status known
    Nothing,
}

impl PeerStatus {
    pub const ALL: [PeerStatus; 6] = [
        PeerStatus::Ask,
        PeerStatus::New,
        PeerStatus::NewBack,
        PeerStatus::Up,
        PeerStatus::Down,
        PeerStatus::Nothing,
    ];

    /// Statuses eligible for gossip selection
    pub const GOSSIP_READY: [PeerStatus; 2] = [PeerStatus::NewBack, PeerStatus::Up];

    /// Wire name of the status
    pub fn as_str(&self) -> &'static str {
        match self {
            PeerStatus::Ask => "ASK",
            PeerStatus::New => "NEW",
            PeerStatus::NewBack => "NEW_BACK",
            PeerStatus::Up => "UP",
            PeerStatus::Down => "DOWN",
            PeerStatus::Nothing => "NOTHING",
        }
    }

    pub fn is_gossip_ready(&self) -> bool {
        Self::GOSSIP_READY.contains(self)
    }
}

impl fmt::Display for PeerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PeerStatus {
    type Err = PeerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| PeerError::UnknownStatus(s.to_string()))
    }
}

/// Current time as unix milliseconds
fn now_millis() -> u64 {
    chrono::Utc::now().timestamp_millis().max(0) as u64
}

/// A known peer.
///
/// `public_key` identifies the peer across the directory. Everything except
/// the transient `pubkey` is persisted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PeerRecord {
    pub(crate) version: String,
    pub(crate) currency: String,
    pub(crate) public_key: String,
    pub(crate) endpoints: Vec<String>,
    pub(crate) signature: String,
    pub(crate) hash: String,
    pub(crate) block: String,
    pub(crate) status_block: String,
    pub(crate) status: PeerStatus,
    pub(crate) status_sent: PeerStatus,
    /// Unix ms, 0 until set
    pub(crate) status_signature_date: u64,
    /// Unix ms, 0 until set
    pub(crate) peer_signature_date: u64,
    pub(crate) propagated: bool,
    pub(crate) created_at: u64,
    pub(crate) updated_at: u64,
    #[serde(skip)]
    pub(crate) pubkey: Option<String>,
}

impl PeerRecord {
    /// Create a record for a newly discovered peer
    pub fn new(public_key: &str, currency: &str, status: PeerStatus) -> Self {
        let now = now_millis();
        Self {
            version: String::new(),
            currency: currency.to_string(),
            public_key: public_key.to_string(),
            endpoints: Vec::new(),
            signature: String::new(),
            hash: String::new(),
            block: String::new(),
            status_block: String::new(),
            status,
            status_sent: PeerStatus::Nothing,
            status_signature_date: 0,
            peer_signature_date: 0,
            propagated: false,
            created_at: now,
            updated_at: now,
            pubkey: None,
        }
    }

    pub fn with_version(mut self, version: &str) -> Self {
        self.version = version.to_string();
        self
    }

    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoints.push(endpoint.to_string());
        self
    }

    pub fn with_endpoints(mut self, endpoints: Vec<String>) -> Self {
        self.endpoints = endpoints;
        self
    }

    pub fn with_block(mut self, block: &str) -> Self {
        self.block = block.to_string();
        self
    }

    pub fn with_signature(mut self, signature: &str) -> Self {
        self.signature = signature.to_string();
        self
    }

    pub fn with_hash(mut self, hash: &str) -> Self {
        self.hash = hash.to_string();
        self
    }

    // ========================================================================
    // IDENTITY AND METADATA
    // ========================================================================

    pub fn public_key(&self) -> &str {
        &self.public_key
    }

    /// Short identifier for logs: the first 10 characters of the key
    pub fn key_id(&self) -> &str {
        match self.public_key.char_indices().nth(10) {
            Some((end, _)) => &self.public_key[..end],
            None => "Unknown",
        }
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn endpoints(&self) -> &[String] {
        &self.endpoints
    }

    pub fn signature(&self) -> &str {
        &self.signature
    }

    pub fn hash(&self) -> &str {
        &self.hash
    }

    pub fn set_hash(&mut self, hash: &str) {
        self.hash = hash.to_string();
    }

    pub fn block(&self) -> &str {
        &self.block
    }

    pub fn status_block(&self) -> &str {
        &self.status_block
    }

    pub fn set_status_block(&mut self, block: &str) {
        self.status_block = block.to_string();
    }

    pub fn status(&self) -> PeerStatus {
        self.status
    }

    pub fn status_sent(&self) -> PeerStatus {
        self.status_sent
    }

    pub fn set_status_sent(&mut self, status: PeerStatus) {
        self.status_sent = status;
    }

    pub fn status_signature_date(&self) -> u64 {
        self.status_signature_date
    }

    pub fn set_status_signature_date(&mut self, millis: u64) {
        self.status_signature_date = millis;
    }

    pub fn peer_signature_date(&self) -> u64 {
        self.peer_signature_date
    }

    pub fn set_peer_signature_date(&mut self, millis: u64) {
        self.peer_signature_date = millis;
    }

    pub fn is_propagated(&self) -> bool {
        self.propagated
    }

    pub fn set_propagated(&mut self, propagated: bool) {
        self.propagated = propagated;
    }

    pub fn created_at(&self) -> u64 {
        self.created_at
    }

    pub fn updated_at(&self) -> u64 {
        self.updated_at
    }

    /// Refresh `updated_at` ahead of a write.
    ///
    /// Always moves it forward by at least one millisecond, so two writes in
    /// the same millisecond (or across a clock step back) stay ordered.
    pub(crate) fn touch(&mut self) {
        self.updated_at = self.updated_at.saturating_add(1).max(now_millis());
    }

    /// In-memory key, never persisted
    pub fn pubkey(&self) -> Option<&str> {
        self.pubkey.as_deref()
    }

    pub fn set_pubkey(&mut self, pubkey: &str) {
        self.pubkey = Some(pubkey.to_string());
    }

    // ========================================================================
    // CONNECTIVITY
    // ========================================================================

    /// First endpoint that parses as BMA, if any
    pub fn bma(&self) -> Option<BmaEndpoint> {
        BmaEndpoint::resolve(&self.endpoints)
    }

    pub fn dns(&self) -> Option<String> {
        self.bma().and_then(|b| b.dns().map(str::to_string))
    }

    pub fn ipv4(&self) -> Option<String> {
        self.bma().and_then(|b| b.ipv4().map(str::to_string))
    }

    pub fn ipv6(&self) -> Option<String> {
        self.bma().and_then(|b| b.ipv6().map(str::to_string))
    }

    pub fn port(&self) -> Option<u16> {
        self.bma().and_then(|b| b.port())
    }

    pub fn host(&self) -> String {
        self.bma().map(|b| b.host().to_string()).unwrap_or_default()
    }

    pub fn url(&self) -> String {
        self.bma().map(|b| b.url()).unwrap_or_default()
    }

    pub fn is_reachable(&self) -> bool {
        !self.url().is_empty()
    }

    /// Contact the peer through a transport client.
    ///
    /// The client's result is handed back untouched; retries and timeouts
    /// are the client's business.
    pub async fn connect<C: TransportClient>(
        &self,
        client: &C,
    ) -> Result<C::Response, ConnectError<C::Error>> {
        const USE_TLS_HINT: bool = true;
        const WITH_SIGNATURE_PARAM: bool = false;

        let bma = self
            .bma()
            .ok_or_else(|| ConnectError::Unreachable(self.public_key.clone()))?;
        let host = bma.host();
        let port = match bma.port() {
            Some(port) if !host.is_empty() => port,
            _ => return Err(ConnectError::Unreachable(self.public_key.clone())),
        };

        client
            .connect(host, port, USE_TLS_HINT, WITH_SIGNATURE_PARAM)
            .await
            .map_err(ConnectError::Transport)
    }
}
