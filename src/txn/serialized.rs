use std::marker::PhantomData;

use parking_lot::Mutex;

use crate::core::stats::{Contention, ContentionSnapshot};

use super::{ExclusiveLockManager, LockKey, LockManager, LockMode, ReadyQueue, TxnId};

/// Lock manager that can be driven from several threads.
///
/// Every call takes one mutex around the wrapped manager, so requests are
/// still applied in a single total order: whichever order the callers
/// reach the mutex in. Determinism across replicas therefore still depends
/// on the callers issuing requests in the agreed global order.
#[derive(Debug)]
pub struct SerializedLockManager<K: LockKey, L = ExclusiveLockManager<K>> {
    inner: Mutex<L>,
    ready_txns: ReadyQueue,
    table_mutex: Contention,
    _key: PhantomData<fn(K)>,
}

impl<K: LockKey> SerializedLockManager<K> {
    /// Serialized exclusive-only manager appending to `ready_txns`.
    pub fn exclusive(ready_txns: ReadyQueue) -> Self {
        Self::new(ExclusiveLockManager::new(ready_txns))
    }
}

impl<K: LockKey, L: LockManager<K>> SerializedLockManager<K, L> {
    pub fn new(manager: L) -> Self {
        let ready_txns = manager.ready_queue().clone();
        Self {
            inner: Mutex::new(manager),
            ready_txns,
            table_mutex: Contention::default(),
            _key: PhantomData,
        }
    }

    pub fn write_lock(&self, txn: TxnId, key: &K) -> bool {
        self.with(|manager| manager.write_lock(txn, key))
    }

    pub fn read_lock(&self, txn: TxnId, key: &K) -> bool {
        self.with(|manager| manager.read_lock(txn, key))
    }

    pub fn release(&self, txn: TxnId, key: &K) {
        self.with(|manager| manager.release(txn, key))
    }

    pub fn status(&self, key: &K) -> (LockMode, Vec<TxnId>) {
        self.with(|manager| manager.status(key))
    }

    /// Run several operations under one acquisition of the table mutex, e.g.
    /// to issue all of a transaction's requests without interleaving.
    pub fn with<R>(&self, f: impl FnOnce(&mut L) -> R) -> R {
        let wait_start = self.table_mutex.clock();
        let mut manager = self.inner.lock();
        let held_since = self.table_mutex.acquired(wait_start);
        let out = f(&mut manager);
        drop(manager);
        self.table_mutex.released(held_since);
        out
    }

    /// Time waits on and holds of the table mutex.
    pub fn set_lock_timing(&self, enabled: bool) {
        self.table_mutex.set_timing(enabled);
    }

    pub fn table_contention(&self) -> ContentionSnapshot {
        self.table_mutex.snapshot()
    }

    /// Shared handle to the ready queue; reading it does not take the table
    /// mutex.
    pub fn ready_queue(&self) -> &ReadyQueue {
        &self.ready_txns
    }

    pub fn into_inner(self) -> L {
        self.inner.into_inner()
    }
}
