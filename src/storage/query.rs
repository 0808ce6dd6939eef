// PeerQuery - the filter a store applies when finding peers

use crate::peer::{PeerRecord, PeerStatus};
use std::collections::HashSet;

/// Selection over stored peers.
///
/// Filters combine with AND. Ordering and the limit apply after filtering.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PeerQuery {
    only_keys: Option<HashSet<String>>,
    excluded_keys: HashSet<String>,
    statuses: Option<Vec<PeerStatus>>,
    recent_first: bool,
    limit: Option<usize>,
}

impl PeerQuery {
    /// Match every peer
    pub fn all() -> Self {
        Self::default()
    }

    /// Match only peers whose key is in `keys`
    pub fn by_keys<S: AsRef<str>>(keys: &[S]) -> Self {
        Self {
            only_keys: Some(keys.iter().map(|k| k.as_ref().to_string()).collect()),
            ..Self::default()
        }
    }

    pub fn by_key(key: &str) -> Self {
        Self::by_keys(&[key])
    }

    /// Skip peers whose key is in `keys`
    pub fn excluding<S: AsRef<str>>(mut self, keys: &[S]) -> Self {
        self.excluded_keys
            .extend(keys.iter().map(|k| k.as_ref().to_string()));
        self
    }

    /// Keep only peers in one of `statuses`
    pub fn with_statuses(mut self, statuses: &[PeerStatus]) -> Self {
        self.statuses = Some(statuses.to_vec());
        self
    }

    /// Most recently updated first
    pub fn recent_first(mut self) -> Self {
        self.recent_first = true;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Keys the query is restricted to, if any
    pub fn only_keys(&self) -> Option<&HashSet<String>> {
        self.only_keys.as_ref()
    }

    pub fn matches(&self, record: &PeerRecord) -> bool {
        let key = record.public_key();
        if let Some(only) = &self.only_keys {
            if !only.contains(key) {
                return false;
            }
        }
        if self.excluded_keys.contains(key) {
            return false;
        }
        match &self.statuses {
            Some(statuses) => statuses.contains(&record.status()),
            None => true,
        }
    }

    /// Filter, order and cap a batch of records
    pub fn apply<I>(&self, records: I) -> Vec<PeerRecord>
    where
        I: IntoIterator<Item = PeerRecord>,
    {
        let mut found: Vec<PeerRecord> = records.into_iter().filter(|r| self.matches(r)).collect();

        if self.recent_first {
            found.sort_by(|a, b| b.updated_at().cmp(&a.updated_at()));
        }
        if let Some(limit) = self.limit {
            found.truncate(limit);
        }
        found
    }
}
