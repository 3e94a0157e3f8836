use std::time::Duration;

use filter_engine::{Clock, ManualClock};
use futures::executor::LocalPool;
use futures::task::LocalSpawnExt;

#[test]
fn cancelled_sleeps_are_swept_before_their_deadline() {
    let clock = ManualClock::default();
    for _ in 0..50 {
        drop(clock.sleep(Duration::from_secs(3600)));
    }
    assert_eq!(clock.pending_sleepers(), 0);

    let _armed = clock.sleep(Duration::from_secs(3600));
    assert_eq!(clock.tracked_sleepers(), 1);
    assert_eq!(clock.pending_sleepers(), 1);
}

#[test]
fn advance_sweeps_cancelled_sleeps_that_are_not_due() {
    let clock = ManualClock::default();
    let _armed = clock.sleep(Duration::from_secs(10));
    drop(clock.sleep(Duration::from_secs(3600)));
    assert_eq!(clock.tracked_sleepers(), 2);

    clock.advance(Duration::from_secs(1));
    assert_eq!(clock.tracked_sleepers(), 1);
}

#[test]
fn due_sleep_wakes_after_advance() {
    let mut pool = LocalPool::new();
    let clock = ManualClock::default();
    let sleep = clock.sleep(Duration::from_millis(300));
    let handle = pool.spawner().spawn_local_with_handle(sleep).unwrap();

    clock.advance(Duration::from_millis(299));
    pool.run_until_stalled();
    assert_eq!(clock.pending_sleepers(), 1);

    clock.advance(Duration::from_millis(1));
    pool.run_until(handle);
    assert_eq!(clock.tracked_sleepers(), 0);
}
