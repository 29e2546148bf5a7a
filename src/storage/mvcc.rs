//! Multi-version storage validated by timestamp ordering.
//!
//! Each key owns a [`VersionChain`] behind its own mutex. Workers take the
//! key's mutex with [`MvccStorage::lock`] and perform their reads, write
//! checks and writes through the returned [`KeyGuard`]; dropping the guard
//! releases the key.
//!
//! Timestamps are transaction ids. A read at `T` sees the newest version
//! written at or before `T` and records that it was observed at `T`. A write
//! at `T` is only admissible if no version was written after `T` and no
//! version was read by a transaction later than `T`.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use parking_lot::{ArcMutexGuard, Mutex, RawMutex, RwLock};

use crate::core::config::StorageConfig;
use crate::core::errors::{DetCoreError, StorageError};
use crate::core::stats::{StorageStats, StorageStatsSnapshot};
use crate::txn::{LockKey, Timestamp, TS_INITIAL};

use super::version::{Version, VersionChain};

type ChainCell<V> = Arc<Mutex<VersionChain<V>>>;

pub struct MvccStorage<K: LockKey, V> {
    mvcc_data: RwLock<HashMap<K, ChainCell<V>>>,
    stats: Arc<StorageStats>,
}

impl<K: LockKey, V> Default for MvccStorage<K, V> {
    fn default() -> Self {
        Self {
            mvcc_data: RwLock::new(HashMap::new()),
            stats: Arc::default(),
        }
    }
}

impl<K: LockKey, V> fmt::Debug for MvccStorage<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MvccStorage")
            .field("key_count", &self.key_count())
            .field("stats", &self.stats())
            .finish()
    }
}

impl<V: Clone + Default> MvccStorage<u64, V> {
    /// Build a storage with keys `0..config.keyspace_size` pre-registered,
    /// each holding `V::default()` at timestamp 0.
    ///
    /// `config.lock_stats_enabled` turns on key-mutex timing for this
    /// instance only.
    pub fn open(config: StorageConfig) -> Result<Self, DetCoreError> {
        config.validate()?;

        let storage = Self::new();
        storage.set_lock_timing(config.lock_stats_enabled);
        storage.init_storage(0..config.keyspace_size, V::default());
        Ok(storage)
    }
}

impl<K: LockKey, V> MvccStorage<K, V> {
    /// Empty storage with no registered keys.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register every key and give it an initial version at timestamp 0.
    ///
    /// Meant to run before workers start. Keys that already hold versions are
    /// left untouched, and the key map is not held while waiting on a key
    /// that a worker has locked.
    pub fn init_storage<I>(&self, keys: I, initial: V)
    where
        I: IntoIterator<Item = K>,
        V: Clone,
    {
        let cells: Vec<ChainCell<V>> = {
            let mut data = self.mvcc_data.write();
            keys.into_iter()
                .map(|key| Arc::clone(data.entry(key).or_default()))
                .collect()
        };

        let mut initialized = 0usize;
        for cell in &cells {
            let mut chain = cell.lock();
            if chain.is_empty() {
                chain.prepend(Version::new(initial.clone(), TS_INITIAL));
                initialized += 1;
            }
        }
        tracing::debug!(initialized, requested = cells.len(), "storage initialized");
    }

    /// Register `key` with an empty version chain. Returns `false` if the key
    /// was already registered.
    pub fn register_key(&self, key: K) -> bool {
        if self.mvcc_data.read().contains_key(&key) {
            return false;
        }
        let mut data = self.mvcc_data.write();
        if data.contains_key(&key) {
            return false;
        }
        data.insert(key, Arc::default());
        true
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.mvcc_data.read().contains_key(key)
    }

    pub fn key_count(&self) -> usize {
        self.mvcc_data.read().len()
    }

    /// Number of versions stored for `key`. Takes the key's mutex.
    pub fn version_count(&self, key: &K) -> Option<usize> {
        let cell = self.mvcc_data.read().get(key).cloned()?;
        let len = cell.lock().len();
        Some(len)
    }

    /// Time waits on and holds of key mutexes.
    pub fn set_lock_timing(&self, enabled: bool) {
        self.stats.key_mutex.set_timing(enabled);
    }

    pub fn stats(&self) -> StorageStatsSnapshot {
        self.stats.snapshot()
    }

    pub fn reset_stats(&self) {
        self.stats.reset();
    }

    /// Acquire the mutex protecting `key`'s version chain.
    ///
    /// Blocks until no other worker holds the key. Fails only if the key was
    /// never registered.
    pub fn lock(&self, key: &K) -> Result<KeyGuard<K, V>, DetCoreError> {
        let cell = self
            .mvcc_data
            .read()
            .get(key)
            .cloned()
            .ok_or_else(|| StorageError(format!("key not registered: {key:?}")))?;

        let wait_start = self.stats.key_mutex.clock();
        let chain = cell.lock_arc();
        let held_since = self.stats.key_mutex.acquired(wait_start);

        Ok(KeyGuard {
            key: key.clone(),
            chain,
            stats: Arc::clone(&self.stats),
            held_since,
        })
    }

    /// Release a key locked with [`MvccStorage::lock`]. Equivalent to
    /// dropping the guard.
    pub fn unlock(&self, guard: KeyGuard<K, V>) {
        drop(guard);
    }
}

/// Exclusive access to one key's version chain.
pub struct KeyGuard<K: LockKey, V> {
    key: K,
    chain: ArcMutexGuard<RawMutex, VersionChain<V>>,
    stats: Arc<StorageStats>,
    held_since: Option<Instant>,
}

impl<K: LockKey, V> KeyGuard<K, V> {
    pub fn key(&self) -> &K {
        &self.key
    }

    /// Value of the newest version written at or before `txn_id`, or `None`
    /// if every version is newer. Marks the returned version as read at
    /// `txn_id`.
    pub fn read(&mut self, txn_id: Timestamp) -> Option<V>
    where
        V: Clone,
    {
        let Some(version) = self.chain.find_visible_mut(txn_id) else {
            self.stats.record_read(false);
            return None;
        };
        version.max_read_id = version.max_read_id.max(txn_id);
        tracing::trace!(key = ?self.key, txn_id, version_id = version.version_id, "mvcc read");
        self.stats.record_read(true);
        Some(version.value.clone())
    }

    /// Whether a write at `txn_id` may be applied. Checks every version of the
    /// key, not only the one the write would supersede.
    pub fn check_write(&self, txn_id: Timestamp) -> bool {
        let ok = self.chain.can_write_at(txn_id);
        if !ok {
            self.stats.record_rejected_write();
            tracing::debug!(key = ?self.key, txn_id, "write rejected by timestamp ordering");
        }
        ok
    }

    /// Append a version written at `txn_id`. Only call after
    /// [`KeyGuard::check_write`] returned `true` for the same timestamp; the
    /// write is not re-validated.
    pub fn write(&mut self, value: V, txn_id: Timestamp) {
        self.chain.prepend(Version::new(value, txn_id));
        self.stats.record_write();
    }

    /// `check_write` followed by `write` when the check passes.
    pub fn try_write(&mut self, value: V, txn_id: Timestamp) -> bool {
        if !self.check_write(txn_id) {
            return false;
        }
        self.write(value, txn_id);
        true
    }

    /// Versions of this key, newest write first.
    pub fn versions(&self) -> impl Iterator<Item = &Version<V>> {
        self.chain.iter()
    }
}

impl<K: LockKey, V> Drop for KeyGuard<K, V> {
    fn drop(&mut self) {
        self.stats.key_mutex.released(self.held_since);
    }
}

impl<K: LockKey, V> fmt::Debug for KeyGuard<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyGuard")
            .field("key", &self.key)
            .field("versions", &self.chain.len())
            .finish()
    }
}
