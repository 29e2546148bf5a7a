use super::{ExclusiveLockManager, LockManager, LockMode, ReadyQueue, SerializedLockManager};

fn manager() -> ExclusiveLockManager<u64> {
    ExclusiveLockManager::new(ReadyQueue::new())
}

#[test]
fn first_request_is_granted_later_ones_wait() {
    let mut lm = manager();
    assert!(lm.write_lock(1, &10));
    assert!(!lm.write_lock(2, &10));
    assert!(!lm.write_lock(3, &10));

    assert_eq!(lm.wait_count(1), 0);
    assert_eq!(lm.wait_count(2), 1);
    assert_eq!(lm.wait_count(3), 1);
    assert_eq!(lm.queue_len(&10), 3);
    assert!(lm.ready_queue().is_empty());
}

#[test]
fn read_lock_takes_the_exclusive_slot() {
    let mut lm = manager();
    assert!(lm.read_lock(1, &7));
    assert!(!lm.read_lock(2, &7));
    assert!(!lm.write_lock(3, &7));

    assert_eq!(lm.status(&7), (LockMode::Exclusive, vec![1]));
}

#[test]
fn status_reports_front_owner() {
    let mut lm = manager();
    assert_eq!(lm.status(&1), (LockMode::Unlocked, vec![]));

    lm.write_lock(5, &1);
    lm.write_lock(6, &1);
    assert_eq!(lm.status(&1), (LockMode::Exclusive, vec![5]));

    lm.release(5, &1);
    assert_eq!(lm.status(&1), (LockMode::Exclusive, vec![6]));

    lm.release(6, &1);
    assert_eq!(lm.status(&1), (LockMode::Unlocked, vec![]));
}

#[test]
fn releasing_owner_promotes_next_waiter() {
    let mut lm = manager();
    lm.write_lock(1, &10);
    lm.write_lock(2, &10);
    lm.write_lock(3, &10);

    lm.release(1, &10);
    assert_eq!(lm.ready_queue().drain(), vec![2]);
    assert_eq!(lm.wait_count(2), 0);

    lm.release(2, &10);
    assert_eq!(lm.ready_queue().drain(), vec![3]);

    lm.release(3, &10);
    assert!(lm.ready_queue().is_empty());
    assert_eq!(lm.queue_len(&10), 0);
}

#[test]
fn transaction_is_ready_only_after_last_wait() {
    let mut lm = manager();
    assert!(lm.write_lock(1, &100));
    assert!(lm.write_lock(2, &200));

    // Txn 3 waits on both keys.
    assert!(!lm.write_lock(3, &100));
    assert!(!lm.write_lock(3, &200));
    assert_eq!(lm.wait_count(3), 2);

    lm.release(1, &100);
    assert!(lm.ready_queue().is_empty());
    assert_eq!(lm.wait_count(3), 1);

    lm.release(2, &200);
    assert_eq!(lm.ready_queue().drain(), vec![3]);
    assert_eq!(lm.wait_count(3), 0);
}

#[test]
fn releasing_a_waiter_promotes_no_one() {
    let mut lm = manager();
    lm.write_lock(1, &10);
    lm.write_lock(2, &10);
    lm.write_lock(3, &10);

    lm.release(2, &10);
    assert!(lm.ready_queue().is_empty());
    assert_eq!(lm.status(&10), (LockMode::Exclusive, vec![1]));
    // The removed waiter's count is left as-is.
    assert_eq!(lm.wait_count(2), 1);

    lm.release(1, &10);
    assert_eq!(lm.ready_queue().drain(), vec![3]);
}

#[test]
fn release_of_unheld_key_is_noop() {
    let mut lm = manager();
    lm.write_lock(1, &10);
    lm.write_lock(2, &10);

    lm.release(9, &10);
    lm.release(1, &99);

    assert_eq!(lm.status(&10), (LockMode::Exclusive, vec![1]));
    assert_eq!(lm.queue_len(&10), 2);
    assert_eq!(lm.wait_count(2), 1);
    assert!(lm.ready_queue().is_empty());
    assert_eq!(lm.queue_len(&99), 0);
}

#[test]
fn duplicate_requests_are_released_one_at_a_time() {
    let mut lm = manager();
    assert!(lm.write_lock(1, &10));
    assert!(!lm.write_lock(1, &10));
    assert_eq!(lm.wait_count(1), 1);
    assert_eq!(lm.queue_len(&10), 2);

    // The second request reaches the front and readies txn 1 again.
    lm.release(1, &10);
    assert_eq!(lm.ready_queue().drain(), vec![1]);
    assert_eq!(lm.queue_len(&10), 1);

    lm.release(1, &10);
    assert_eq!(lm.status(&10), (LockMode::Unlocked, vec![]));
}

#[test]
fn ready_queue_is_shared_with_caller() {
    let ready = ReadyQueue::new();
    let mut lm = ExclusiveLockManager::new(ready.clone());
    lm.write_lock(1, &"a");
    lm.write_lock(2, &"a");
    lm.release(1, &"a");

    assert_eq!(ready.len(), 1);
    assert_eq!(ready.pop_front(), Some(2));
    assert!(lm.ready_queue().is_empty());
}

#[test]
fn serialized_manager_matches_inner_semantics() {
    let ready = ReadyQueue::new();
    let lm = SerializedLockManager::exclusive(ready.clone());
    assert!(lm.write_lock(1, &"k"));
    assert!(!lm.read_lock(2, &"k"));
    assert_eq!(lm.status(&"k"), (LockMode::Exclusive, vec![1]));

    lm.release(1, &"k");
    assert_eq!(ready.drain(), vec![2]);

    let waits = lm.with(|inner| inner.wait_count(2));
    assert_eq!(waits, 0);
}
