use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;

use super::TxnId;

/// FIFO of transactions that have acquired every lock they asked for.
///
/// The scheduler creates the queue and hands a clone to the lock manager;
/// both ends share the same underlying buffer. Lock managers only append.
#[derive(Debug, Clone, Default)]
pub struct ReadyQueue {
    inner: Arc<Mutex<VecDeque<TxnId>>>,
}

impl ReadyQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push_back(&self, txn: TxnId) {
        self.inner.lock().push_back(txn);
    }

    pub fn pop_front(&self) -> Option<TxnId> {
        self.inner.lock().pop_front()
    }

    /// Take every queued transaction, oldest first.
    pub fn drain(&self) -> Vec<TxnId> {
        self.inner.lock().drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}
