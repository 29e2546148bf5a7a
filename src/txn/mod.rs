pub mod exclusive;
pub mod ready_queue;
pub mod serialized;

use std::fmt::Debug;
use std::hash::Hash;

pub use exclusive::ExclusiveLockManager;
pub use ready_queue::ReadyQueue;
pub use serialized::SerializedLockManager;

/// Globally unique transaction id assigned by the sequencer. Ids are totally
/// ordered and double as the transaction's MVCC timestamp.
pub type TxnId = u64;

pub type Timestamp = u64;

/// Timestamp of the versions written by `MvccStorage::init_storage`.
pub const TS_INITIAL: Timestamp = 0;

/// Anything usable as a lock-table or storage key.
pub trait LockKey: Eq + Hash + Clone + Debug {}

impl<T: Eq + Hash + Clone + Debug> LockKey for T {}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LockMode {
    Unlocked,
    Shared,
    Exclusive,
}

/// One transaction's request for a key, queued in arrival order.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct LockRequest {
    pub mode: LockMode,
    pub txn: TxnId,
}

impl LockRequest {
    pub fn new(mode: LockMode, txn: TxnId) -> Self {
        Self { mode, txn }
    }
}

/// Deterministic lock manager interface.
///
/// Grant order for a key is exactly the order in which requests for that key
/// were issued. Transactions that were not granted every lock immediately are
/// appended to the manager's [`ReadyQueue`] once their last pending request
/// reaches the front of its queue.
///
/// Callers are expected to issue all requests of a transaction in one global
/// order; no deadlock detection is performed.
pub trait LockManager<K: LockKey> {
    /// Queue an exclusive request. Returns `true` if `txn` owns the lock
    /// immediately.
    fn write_lock(&mut self, txn: TxnId, key: &K) -> bool;

    /// Queue a request for read access. Implementations without shared
    /// locking may queue it as exclusive. Returns `true` if `txn` owns the
    /// lock immediately.
    fn read_lock(&mut self, txn: TxnId, key: &K) -> bool;

    /// Remove the first request `txn` holds on `key` and hand the lock to the
    /// next waiter if `txn` was the owner. No-op if `txn` has no request.
    fn release(&mut self, txn: TxnId, key: &K);

    /// Current mode of `key` together with the transactions owning it.
    fn status(&self, key: &K) -> (LockMode, Vec<TxnId>);

    /// Handle to the queue newly unblocked transactions are appended to.
    fn ready_queue(&self) -> &ReadyQueue;
}

#[cfg(test)]
mod tests;
