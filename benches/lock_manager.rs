use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::rngs::StdRng;
use rand::seq::index::sample;
use rand::SeedableRng;

use detcore::{ExclusiveLockManager, LockManager, ReadyQueue, TxnId};

const TXNS_PER_BATCH: usize = 10_000;
const KEYS_PER_TXN: usize = 4;

/// Contention levels expressed as the number of distinct keys.
const KEYSPACES: &[u64] = &[16, 1_024, 1_000_000];

fn footprints(keyspace: u64) -> Vec<Vec<u64>> {
    let mut rng = StdRng::seed_from_u64(keyspace);
    (0..TXNS_PER_BATCH)
        .map(|_| {
            sample(&mut rng, keyspace as usize, KEYS_PER_TXN)
                .into_iter()
                .map(|k| k as u64)
                .collect()
        })
        .collect()
}

/// Acquire every transaction's locks in id order, then retire transactions
/// as they become runnable.
fn run_batch(footprints: &[Vec<u64>]) -> usize {
    let ready = ReadyQueue::new();
    let mut lm = ExclusiveLockManager::new(ready.clone());
    let mut runnable: Vec<TxnId> = Vec::with_capacity(footprints.len());

    for (id, keys) in footprints.iter().enumerate() {
        let mut granted = true;
        for key in keys {
            granted &= lm.write_lock(id as TxnId, key);
        }
        if granted {
            runnable.push(id as TxnId);
        }
    }

    let mut cursor = 0;
    while cursor < runnable.len() {
        let txn = runnable[cursor];
        for key in &footprints[txn as usize] {
            lm.release(txn, key);
        }
        runnable.extend(ready.drain());
        cursor += 1;
    }
    runnable.len()
}

fn bench_lock_manager_contention(c: &mut Criterion) {
    let mut group = c.benchmark_group("lock_manager_contention");
    group.throughput(Throughput::Elements(TXNS_PER_BATCH as u64));

    for &keyspace in KEYSPACES {
        let batch = footprints(keyspace);
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("keys{keyspace}")),
            &batch,
            |b, batch| {
                b.iter(|| black_box(run_batch(batch)));
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_lock_manager_contention);
criterion_main!(benches);
