//! Tests for timed expiry of the unlocked-shortly state
//!
//! Ticks are driven by hand with fixed moments, except for the last test
//! which runs the real clock thread with a short tick and a one-second window.

use chrono::{Duration, FixedOffset, TimeZone, Utc};
use door_access_control::control::{AccessControlResult, Clock};
use door_access_control::facility::{Door, DoorRegistry, DoorState, ExpiryScheduler};
use door_access_control::types::{timestamp_now, Action, DoorId, DoorStateName, Timestamp};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;
use std::time::Duration as StdDuration;

fn t0() -> Timestamp {
    Utc.with_ymd_and_hms(2025, 10, 6, 8, 0, 0).unwrap()
}

fn setup(window_secs: i64) -> (Arc<Clock>, DoorRegistry) {
    let clock =
        Arc::new(Clock::new(Duration::seconds(window_secs), StdDuration::from_millis(1000)));
    let doors = (1..=3).map(|n| Door::with_state(format!("D{}", n), true, DoorState::Locked));
    let registry = DoorRegistry::new(doors, clock.clone()).unwrap();
    (clock, registry)
}

/// Tick once per second up to `to` and return the first second at which the
/// door is no longer unlocked shortly
fn first_expiry(clock: &Clock, registry: &DoorRegistry, door: &DoorId, to: i64) -> Option<i64> {
    (0..=to).find(|&secs| {
        clock.tick(t0() + Duration::seconds(secs), registry).unwrap();
        registry.state_of(door).unwrap() != DoorStateName::UnlockedShortly
    })
}

#[test]
fn test_closed_door_locks_at_tenth_second() {
    let (clock, registry) = setup(10);
    let d1 = DoorId::from("D1");

    registry.do_action(&d1, Action::UnlockShortly, t0()).unwrap();

    assert_eq!(first_expiry(&clock, &registry, &d1, 30), Some(10));
    assert_eq!(registry.state_of(&d1).unwrap(), DoorStateName::Locked);
}

#[test]
fn test_open_door_becomes_propped() {
    let (clock, registry) = setup(10);
    let d1 = DoorId::from("D1");

    registry.do_action(&d1, Action::UnlockShortly, t0()).unwrap();
    registry.do_action(&d1, Action::Open, t0() + Duration::seconds(2)).unwrap();

    assert_eq!(first_expiry(&clock, &registry, &d1, 30), Some(10));
    let snapshot = registry.snapshot(&d1).unwrap();
    assert_eq!(snapshot.state, DoorStateName::Propped);
    assert!(!snapshot.closed);

    // A propped door only returns to locked through a manual close
    registry.do_action(&d1, Action::Close, t0() + Duration::seconds(40)).unwrap();
    assert_eq!(registry.state_of(&d1).unwrap(), DoorStateName::Locked);
}

#[test]
fn test_door_closed_again_before_expiry_locks() {
    let (clock, registry) = setup(10);
    let d1 = DoorId::from("D1");

    registry.do_action(&d1, Action::UnlockShortly, t0()).unwrap();
    registry.do_action(&d1, Action::Open, t0() + Duration::seconds(1)).unwrap();
    registry.do_action(&d1, Action::Close, t0() + Duration::seconds(5)).unwrap();

    first_expiry(&clock, &registry, &d1, 30);
    assert_eq!(registry.state_of(&d1).unwrap(), DoorStateName::Locked);
}

#[test]
fn test_threshold_uses_whole_seconds() {
    let (clock, registry) = setup(10);
    let d1 = DoorId::from("D1");
    registry.do_action(&d1, Action::UnlockShortly, t0()).unwrap();

    let report = clock.tick(t0() + Duration::milliseconds(9_999), &registry).unwrap();
    assert!(report.expired.is_empty());

    let report = clock.tick(t0() + Duration::milliseconds(10_000), &registry).unwrap();
    assert_eq!(report.expired.len(), 1);
    assert_eq!(report.expired[0].elapsed_secs, 10);
}

#[test]
fn test_manual_lock_stops_expiry() {
    let (clock, registry) = setup(10);
    let d1 = DoorId::from("D1");

    registry.do_action(&d1, Action::UnlockShortly, t0()).unwrap();
    registry.do_action(&d1, Action::Lock, t0() + Duration::seconds(4)).unwrap();
    assert!(!clock.is_subscribed(&d1).unwrap());

    // Unlock manually afterwards; later ticks must not touch the door
    registry.do_action(&d1, Action::Unlock, t0() + Duration::seconds(5)).unwrap();
    for secs in 6..30 {
        let report = clock.tick(t0() + Duration::seconds(secs), &registry).unwrap();
        assert_eq!(report.checked, 0);
    }
    assert_eq!(registry.state_of(&d1).unwrap(), DoorStateName::Unlocked);
}

#[test]
fn test_invalid_unlock_keeps_door_armed() {
    let (clock, registry) = setup(10);
    let d1 = DoorId::from("D1");

    registry.do_action(&d1, Action::UnlockShortly, t0()).unwrap();
    let outcome = registry.do_action(&d1, Action::Unlock, t0() + Duration::seconds(3)).unwrap();
    assert!(!outcome.applied());
    assert!(clock.is_subscribed(&d1).unwrap());

    assert_eq!(first_expiry(&clock, &registry, &d1, 30), Some(10));
}

#[test]
fn test_reentering_starts_a_new_grace_period() {
    let (clock, registry) = setup(10);
    let d1 = DoorId::from("D1");

    registry.do_action(&d1, Action::UnlockShortly, t0()).unwrap();
    registry.do_action(&d1, Action::Lock, t0() + Duration::seconds(8)).unwrap();
    registry.do_action(&d1, Action::UnlockShortly, t0() + Duration::seconds(9)).unwrap();

    // The first grace period would have ended at 10 s; the new one ends at 19 s
    assert_eq!(first_expiry(&clock, &registry, &d1, 30), Some(19));
    assert!(clock.subscribed().unwrap().is_empty());
}

#[test]
fn test_each_door_tracks_its_own_start() {
    let (clock, registry) = setup(10);
    let doors: Vec<_> = (1..=3).map(|n| DoorId::from(format!("D{}", n))).collect();

    for (offset, door) in doors.iter().enumerate() {
        let at = t0() + Duration::seconds(offset as i64);
        registry.do_action(door, Action::UnlockShortly, at).unwrap();
    }
    assert_eq!(clock.subscribed().unwrap(), doors);

    let mut expired_at = Vec::new();
    for secs in 0..=15 {
        let report = clock.tick(t0() + Duration::seconds(secs), &registry).unwrap();
        for expired in report.expired {
            expired_at.push((expired.door_id.to_string(), secs));
        }
    }

    assert_eq!(
        expired_at,
        vec![("D1".to_string(), 10), ("D2".to_string(), 11), ("D3".to_string(), 12)]
    );
}

#[test]
fn test_grace_period_spanning_fall_back() {
    // 2025-10-26 in Madrid: 02:59:55 CEST is followed 10 s later by 02:00:05 CET
    let (clock, registry) = setup(10);
    let d1 = DoorId::from("D1");
    let cest = FixedOffset::east_opt(2 * 3600).unwrap();
    let cet = FixedOffset::east_opt(3600).unwrap();
    let started_at = cest.with_ymd_and_hms(2025, 10, 26, 2, 59, 55).unwrap().with_timezone(&Utc);

    registry.do_action(&d1, Action::UnlockShortly, started_at).unwrap();

    let nine_later = cet.with_ymd_and_hms(2025, 10, 26, 2, 0, 4).unwrap().with_timezone(&Utc);
    assert!(clock.tick(nine_later, &registry).unwrap().expired.is_empty());

    let ten_later = cet.with_ymd_and_hms(2025, 10, 26, 2, 0, 5).unwrap().with_timezone(&Utc);
    let report = clock.tick(ten_later, &registry).unwrap();
    assert_eq!(report.expired.len(), 1);
    assert_eq!(report.expired[0].elapsed_secs, 10);
    assert_eq!(registry.state_of(&d1).unwrap(), DoorStateName::Locked);
}

/// Forwards to the clock, then panics while the registry holds one door's lock
#[derive(Debug)]
struct FailingScheduler {
    clock: Arc<Clock>,
    fail_for: DoorId,
}

impl ExpiryScheduler for FailingScheduler {
    fn arm(&self, door: &DoorId, started_at: Timestamp) -> AccessControlResult<()> {
        self.clock.arm(door, started_at)?;
        if *door == self.fail_for {
            panic!("scheduler failure while arming {}", door);
        }
        Ok(())
    }

    fn disarm(&self, door: &DoorId) -> AccessControlResult<()> {
        self.clock.disarm(door)
    }
}

#[test]
fn test_poisoned_door_does_not_stop_other_expiries() {
    let clock = Arc::new(Clock::new(Duration::seconds(10), StdDuration::from_millis(1000)));
    let d1 = DoorId::from("D1");
    let d2 = DoorId::from("D2");
    let scheduler = Arc::new(FailingScheduler { clock: clock.clone(), fail_for: d1.clone() });
    let doors = vec![
        Door::with_state("D1", true, DoorState::Locked),
        Door::with_state("D2", true, DoorState::Locked),
    ];
    let registry = DoorRegistry::new(doors, scheduler).unwrap();

    let poisoned =
        panic::catch_unwind(AssertUnwindSafe(|| registry.do_action(&d1, Action::UnlockShortly, t0())));
    assert!(poisoned.is_err());
    registry.do_action(&d2, Action::UnlockShortly, t0()).unwrap();
    assert_eq!(clock.subscribed().unwrap(), vec![d1.clone(), d2.clone()]);

    let report = clock.tick(t0() + Duration::seconds(10), &registry).unwrap();
    assert_eq!(report.failed, vec![d1.clone()]);
    assert_eq!(report.expired.len(), 1);
    assert_eq!(report.expired[0].door_id, d2);
    assert_eq!(registry.state_of(&d2).unwrap(), DoorStateName::Locked);
    assert!(clock.subscribed().unwrap().is_empty());

    // Later ticks keep running without the broken door
    let report = clock.tick(t0() + Duration::seconds(11), &registry).unwrap();
    assert_eq!(report.checked, 0);
}

#[test]
fn test_real_clock_thread_expires_door() {
    let clock = Arc::new(Clock::new(Duration::seconds(1), StdDuration::from_millis(50)));
    let doors = vec![
        Door::with_state("D1", true, DoorState::Locked),
        Door::with_state("D2", true, DoorState::Locked),
    ];
    let registry = Arc::new(DoorRegistry::new(doors, clock.clone()).unwrap());
    let handle = Clock::start(clock.clone(), registry.clone()).unwrap();

    let d1 = DoorId::from("D1");
    let d2 = DoorId::from("D2");
    registry.do_action(&d1, Action::UnlockShortly, timestamp_now()).unwrap();
    registry.do_action(&d2, Action::UnlockShortly, timestamp_now()).unwrap();
    registry.do_action(&d2, Action::Open, timestamp_now()).unwrap();

    let deadline = std::time::Instant::now() + StdDuration::from_secs(5);
    while std::time::Instant::now() < deadline && !clock.subscribed().unwrap().is_empty() {
        thread::sleep(StdDuration::from_millis(50));
    }
    handle.stop().unwrap();

    assert_eq!(registry.state_of(&d1).unwrap(), DoorStateName::Locked);
    assert_eq!(registry.state_of(&d2).unwrap(), DoorStateName::Propped);
}

#[test]
fn test_dropping_the_handle_stops_the_thread() {
    let clock = Arc::new(Clock::new(Duration::seconds(1), StdDuration::from_millis(20)));
    let registry = Arc::new(DoorRegistry::new(vec![Door::new("D1")], clock.clone()).unwrap());

    {
        let _handle = Clock::start(clock.clone(), registry.clone()).unwrap();
        thread::sleep(StdDuration::from_millis(60));
    }

    // With the thread gone nothing expires the door any more
    let d1 = DoorId::from("D1");
    registry.do_action(&d1, Action::UnlockShortly, timestamp_now()).unwrap();
    thread::sleep(StdDuration::from_millis(1_300));
    assert_eq!(registry.state_of(&d1).unwrap(), DoorStateName::UnlockedShortly);
    assert_eq!(Arc::strong_count(&registry), 1);
}
