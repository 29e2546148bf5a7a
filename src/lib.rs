//! Concurrency-control core of a deterministic transaction engine.
//!
//! Two independent components, both driven by an external scheduler:
//!
//! - [`ExclusiveLockManager`] grants per-key exclusive locks strictly in
//!   request order and reports fully unblocked transactions through a
//!   [`ReadyQueue`].
//! - [`MvccStorage`] keeps every version of every key and validates writes
//!   with timestamp ordering, using transaction ids as timestamps.
//!
//! The scheduler takes locks, runs the transaction against storage once it
//! owns all of them, then releases the locks. The two components never call
//! each other.

mod core;
mod storage;
mod txn;

pub use crate::core::config::{StorageConfig, DEFAULT_KEYSPACE_SIZE, MAX_KEYSPACE_SIZE};
pub use crate::core::errors::{DetCoreError, StorageError};
pub use crate::core::stats::{ContentionSnapshot, StorageStatsSnapshot};
pub use crate::storage::{KeyGuard, MvccStorage, Version, VersionChain};
pub use crate::txn::{
    ExclusiveLockManager, LockKey, LockManager, LockMode, LockRequest, ReadyQueue,
    SerializedLockManager, Timestamp, TxnId, TS_INITIAL,
};
