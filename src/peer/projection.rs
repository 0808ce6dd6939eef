// Peer projections - field subsets copied in and out of a record

use super::{PeerRecord, PeerStatus};
use serde::{Deserialize, Serialize};

/// Produces the canonical text forms of a peer document.
///
/// Signing and verification live outside this crate; the directory only
/// needs the rendered strings.
pub trait Canonicalizer {
    /// Canonical form without the signature line
    fn unsigned_form(&self, record: &PeerRecord) -> String;

    /// Canonical form including the signature
    fn signed_form(&self, record: &PeerRecord) -> String;
}

/// Snapshot of the announced fields of a peer.
///
/// Also the shape of an incoming peer announcement.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerSummary {
    pub version: String,
    pub currency: String,
    #[serde(rename = "pub")]
    pub public_key: String,
    pub endpoints: Vec<String>,
    pub hash: String,
    pub status: PeerStatus,
    pub block: String,
    pub signature: String,
}

/// Publicly served view of a peer
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicPeerView {
    pub version: String,
    pub currency: String,
    pub endpoints: Vec<String>,
    pub status: PeerStatus,
    pub block: String,
    pub signature: String,
    pub raw: String,
    pub pubkey: String,
}

impl PeerRecord {
    pub fn extract_summary(&self) -> PeerSummary {
        PeerSummary {
            version: self.version.clone(),
            currency: self.currency.clone(),
            public_key: self.public_key.clone(),
            endpoints: self.endpoints.clone(),
            hash: self.hash.clone(),
            status: self.status,
            block: self.block.clone(),
            signature: self.signature.clone(),
        }
    }

    /// Take over the announced document of a peer.
    ///
    /// `status` and `hash` stay as observed locally: a remote announcement
    /// must not decide whether we consider the peer alive.
    pub fn absorb_announcement(&mut self, incoming: &PeerSummary) {
        self.version = incoming.version.clone();
        self.currency = incoming.currency.clone();
        self.public_key = incoming.public_key.clone();
        self.endpoints = incoming.endpoints.clone();
        self.block = incoming.block.clone();
        self.signature = incoming.signature.clone();
    }

    pub fn to_public_view<C: Canonicalizer + ?Sized>(&self, canonicalizer: &C) -> PublicPeerView {
        PublicPeerView {
            version: self.version.clone(),
            currency: self.currency.clone(),
            endpoints: self.endpoints.clone(),
            status: self.status,
            block: self.block.clone(),
            signature: self.signature.clone(),
            raw: canonicalizer.unsigned_form(self),
            pubkey: self.public_key.clone(),
        }
    }

    pub fn raw_signed<C: Canonicalizer + ?Sized>(&self, canonicalizer: &C) -> String {
        canonicalizer.signed_form(self)
    }
}
