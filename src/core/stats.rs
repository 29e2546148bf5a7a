//! Counters owned by the storage and lock-manager instances that record them.
//!
//! Outcome counters (reads, rejected writes, ...) are always maintained.
//! Mutex wait/hold timing costs two clock reads per acquisition and is only
//! collected while a component's timing flag is on.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

use serde::Serialize;

/// Wait and hold time spent on one kind of mutex.
#[derive(Debug, Clone, Copy, Serialize, Default, PartialEq, Eq)]
pub struct ContentionSnapshot {
    pub acquires: u64,
    pub wait_ns: u64,
    pub hold_ns: u64,
}

#[derive(Debug, Default)]
pub(crate) struct Contention {
    timing: AtomicBool,
    acquires: AtomicU64,
    wait_ns: AtomicU64,
    hold_ns: AtomicU64,
}

impl Contention {
    pub(crate) fn set_timing(&self, enabled: bool) {
        self.timing.store(enabled, Ordering::Relaxed);
    }

    /// Start of a wait, or `None` when timing is off.
    pub(crate) fn clock(&self) -> Option<Instant> {
        self.timing.load(Ordering::Relaxed).then(Instant::now)
    }

    /// Record that the mutex was obtained after waiting since `started`.
    /// Returns the start of the hold period.
    pub(crate) fn acquired(&self, started: Option<Instant>) -> Option<Instant> {
        let started = started?;
        self.acquires.fetch_add(1, Ordering::Relaxed);
        add_ns(&self.wait_ns, started.elapsed());
        Some(Instant::now())
    }

    pub(crate) fn released(&self, held_since: Option<Instant>) {
        if let Some(held_since) = held_since {
            add_ns(&self.hold_ns, held_since.elapsed());
        }
    }

    pub(crate) fn snapshot(&self) -> ContentionSnapshot {
        ContentionSnapshot {
            acquires: self.acquires.load(Ordering::Relaxed),
            wait_ns: self.wait_ns.load(Ordering::Relaxed),
            hold_ns: self.hold_ns.load(Ordering::Relaxed),
        }
    }

    pub(crate) fn reset(&self) {
        self.acquires.store(0, Ordering::Relaxed);
        self.wait_ns.store(0, Ordering::Relaxed);
        self.hold_ns.store(0, Ordering::Relaxed);
    }
}

/// Point-in-time view of an `MvccStorage`'s counters.
#[derive(Debug, Clone, Copy, Serialize, Default, PartialEq, Eq)]
pub struct StorageStatsSnapshot {
    pub key_mutex: ContentionSnapshot,
    pub reads: u64,
    /// Reads at a timestamp older than every version of the key.
    pub reads_not_found: u64,
    pub writes: u64,
    /// `check_write` calls that failed timestamp ordering.
    pub writes_rejected: u64,
}

#[derive(Debug, Default)]
pub(crate) struct StorageStats {
    pub(crate) key_mutex: Contention,
    reads: AtomicU64,
    reads_not_found: AtomicU64,
    writes: AtomicU64,
    writes_rejected: AtomicU64,
}

impl StorageStats {
    pub(crate) fn record_read(&self, found: bool) {
        self.reads.fetch_add(1, Ordering::Relaxed);
        if !found {
            self.reads_not_found.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub(crate) fn record_write(&self) {
        self.writes.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_rejected_write(&self) {
        self.writes_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> StorageStatsSnapshot {
        StorageStatsSnapshot {
            key_mutex: self.key_mutex.snapshot(),
            reads: self.reads.load(Ordering::Relaxed),
            reads_not_found: self.reads_not_found.load(Ordering::Relaxed),
            writes: self.writes.load(Ordering::Relaxed),
            writes_rejected: self.writes_rejected.load(Ordering::Relaxed),
        }
    }

    pub(crate) fn reset(&self) {
        self.key_mutex.reset();
        self.reads.store(0, Ordering::Relaxed);
        self.reads_not_found.store(0, Ordering::Relaxed);
        self.writes.store(0, Ordering::Relaxed);
        self.writes_rejected.store(0, Ordering::Relaxed);
    }
}

fn add_ns(counter: &AtomicU64, elapsed: Duration) {
    let ns = elapsed.as_nanos().min(u64::MAX as u128) as u64;
    counter.fetch_add(ns, Ordering::Relaxed);
}
