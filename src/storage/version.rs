use std::collections::VecDeque;

use crate::txn::Timestamp;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Version<V> {
    pub value: V,
    /// Timestamp of the transaction that wrote this version.
    pub version_id: Timestamp,
    /// Largest timestamp of any transaction that has read this version.
    pub max_read_id: Timestamp,
}

impl<V> Version<V> {
    pub fn new(value: V, version_id: Timestamp) -> Self {
        Self {
            value,
            version_id,
            max_read_id: version_id,
        }
    }
}

/// Every version ever written for one key, newest write first.
#[derive(Debug, Clone)]
pub struct VersionChain<V> {
    versions: VecDeque<Version<V>>,
}

impl<V> Default for VersionChain<V> {
    fn default() -> Self {
        Self {
            versions: VecDeque::new(),
        }
    }
}

impl<V> VersionChain<V> {
    pub fn prepend(&mut self, version: Version<V>) {
        self.versions.push_front(version);
    }

    /// The version with the largest `version_id <= ts`. Among versions
    /// sharing that id, the most recently written one wins.
    pub fn find_visible_mut(&mut self, ts: Timestamp) -> Option<&mut Version<V>> {
        // Newest-first scan; only a strictly larger id replaces the best.
        self.versions
            .iter_mut()
            .filter(|v| v.version_id <= ts)
            .reduce(|best, v| if v.version_id > best.version_id { v } else { best })
    }

    /// Whether a write at `ts` respects timestamp ordering against every
    /// version in the chain, superseded ones included.
    pub fn can_write_at(&self, ts: Timestamp) -> bool {
        !self
            .versions
            .iter()
            .any(|v| v.version_id > ts || v.max_read_id > ts)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Version<V>> {
        self.versions.iter()
    }

    pub fn len(&self) -> usize {
        self.versions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }
}
