//! Exclusive-only deterministic lock manager.
//!
//! Every key has a FIFO queue of [`LockRequest`]s. The request at the front
//! owns the key; everything behind it waits. Because grants depend only on
//! the order requests were issued, replicas that issue the same requests in
//! the same order compute the same schedule without talking to each other.
//!
//! Shared locking is not implemented: [`LockManager::read_lock`] takes the
//! same exclusive slot as [`LockManager::write_lock`].

use std::collections::{HashMap, VecDeque};

use super::{LockKey, LockManager, LockMode, LockRequest, ReadyQueue, TxnId};

#[derive(Debug)]
pub struct ExclusiveLockManager<K: LockKey> {
    lock_table: HashMap<K, VecDeque<LockRequest>>,
    // Number of keys each transaction is still queued on behind an owner.
    txn_waits: HashMap<TxnId, usize>,
    ready_txns: ReadyQueue,
}

impl<K: LockKey> ExclusiveLockManager<K> {
    pub fn new(ready_txns: ReadyQueue) -> Self {
        Self {
            lock_table: HashMap::new(),
            txn_waits: HashMap::new(),
            ready_txns,
        }
    }

    /// Number of keys `txn` is still waiting on. Zero for transactions that
    /// own everything they requested.
    pub fn wait_count(&self, txn: TxnId) -> usize {
        self.txn_waits.get(&txn).copied().unwrap_or(0)
    }

    pub fn queue_len(&self, key: &K) -> usize {
        self.lock_table.get(key).map_or(0, VecDeque::len)
    }

    fn enqueue(&mut self, txn: TxnId, key: &K, mode: LockMode) -> bool {
        let queue = self.lock_table.entry(key.clone()).or_default();
        let granted = queue.is_empty();
        queue.push_back(LockRequest::new(mode, txn));

        if granted {
            tracing::trace!(txn, ?key, "lock granted");
        } else {
            *self.txn_waits.entry(txn).or_insert(0) += 1;
            tracing::trace!(txn, ?key, position = queue.len() - 1, "lock queued");
        }
        granted
    }

    fn promote(&mut self, next: TxnId, key: &K) {
        let Some(count) = self.txn_waits.get_mut(&next) else {
            tracing::warn!(txn = next, ?key, "new lock owner has no pending waits");
            return;
        };
        *count -= 1;
        if *count == 0 {
            self.txn_waits.remove(&next);
            self.ready_txns.push_back(next);
            tracing::debug!(txn = next, ?key, "transaction ready");
        }
    }
}

impl<K: LockKey> LockManager<K> for ExclusiveLockManager<K> {
    fn write_lock(&mut self, txn: TxnId, key: &K) -> bool {
        self.enqueue(txn, key, LockMode::Exclusive)
    }

    fn read_lock(&mut self, txn: TxnId, key: &K) -> bool {
        self.enqueue(txn, key, LockMode::Exclusive)
    }

    fn release(&mut self, txn: TxnId, key: &K) {
        let Some(queue) = self.lock_table.get_mut(key) else {
            return;
        };
        let Some(pos) = queue.iter().position(|rq| rq.txn == txn) else {
            return;
        };
        queue.remove(pos);
        tracing::trace!(txn, ?key, was_owner = pos == 0, "lock released");

        // Only the owner leaving changes who holds the key.
        if pos != 0 {
            return;
        }
        if let Some(next) = queue.front().map(|rq| rq.txn) {
            self.promote(next, key);
        }
    }

    fn status(&self, key: &K) -> (LockMode, Vec<TxnId>) {
        match self.lock_table.get(key).and_then(VecDeque::front) {
            Some(owner) => (LockMode::Exclusive, vec![owner.txn]),
            None => (LockMode::Unlocked, Vec::new()),
        }
    }

    fn ready_queue(&self) -> &ReadyQueue {
        &self.ready_txns
    }
}
