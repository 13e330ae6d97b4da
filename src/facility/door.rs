//! Doors and the door state machine
//!
//! A door has two independent axes: the physical `closed` flag and the
//! logical [`DoorState`]. Every (state, action) pair is resolved by
//! [`transition`], which returns the next state and the physical change as
//! data; [`Door::apply`] then commits it and reports whether the expiry clock
//! has to be armed or disarmed.

use crate::types::{elapsed_whole_seconds, Action, AreaId, DoorId, DoorStateName, Timestamp};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Logical state of a door. Exactly one variant is active at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoorState {
    /// Locked
    Locked,
    /// Unlocked until somebody locks it
    Unlocked,
    /// Unlocked for a grace period that started at `started_at`
    UnlockedShortly {
        /// When the grace period began
        started_at: Timestamp,
    },
    /// Left open after the grace period ran out
    Propped,
}

impl DoorState {
    /// External name of the state
    pub fn name(&self) -> DoorStateName {
        match self {
            DoorState::Locked => DoorStateName::Locked,
            DoorState::Unlocked => DoorStateName::Unlocked,
            DoorState::UnlockedShortly { .. } => DoorStateName::UnlockedShortly,
            DoorState::Propped => DoorStateName::Propped,
        }
    }

    /// Start of the grace period, if unlocked shortly
    pub fn unlocked_shortly_since(&self) -> Option<Timestamp> {
        match self {
            DoorState::UnlockedShortly { started_at } => Some(*started_at),
            _ => None,
        }
    }
}

impl fmt::Display for DoorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.name(), f)
    }
}

/// Effect of one (state, action) pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    /// New logical state, `None` to stay
    pub next_state: Option<DoorState>,
    /// New physical flag, `None` to leave it
    pub closed: Option<bool>,
    /// Why the action is invalid in this state; nothing changes when set
    pub rejection: Option<String>,
}

impl Transition {
    fn to(state: DoorState) -> Self {
        Self { next_state: Some(state), closed: None, rejection: None }
    }

    fn set_closed(closed: bool) -> Self {
        Self { next_state: None, closed: Some(closed), rejection: None }
    }

    fn invalid(reason: impl Into<String>) -> Self {
        Self { next_state: None, closed: None, rejection: Some(reason.into()) }
    }

    /// Whether the action is invalid in the current state
    pub fn is_invalid(&self) -> bool {
        self.rejection.is_some()
    }
}

/// The door transition table.
///
/// | state            | open        | close                | lock                  | unlock     | unlock_shortly   |
/// |------------------|-------------|----------------------|-----------------------|------------|------------------|
/// | locked           | invalid     | closed               | invalid               | unlocked   | unlocked_shortly |
/// | unlocked         | open        | closed               | locked if closed      | invalid    | unlocked_shortly |
/// | unlocked_shortly | open        | closed               | locked                | invalid    | invalid          |
/// | propped          | invalid     | closed, locked       | invalid               | unlocked   | invalid          |
pub fn transition(state: &DoorState, closed: bool, action: Action, now: Timestamp) -> Transition {
    use Action::*;

    match (state, action) {
        (DoorState::Locked, Open) => Transition::invalid("cannot open a locked door"),
        (DoorState::Locked, Close) => Transition::set_closed(true),
        (DoorState::Locked, Lock) => Transition::invalid("door is already locked"),
        (DoorState::Locked, Unlock) => Transition::to(DoorState::Unlocked),
        (DoorState::Locked, UnlockShortly) => {
            Transition::to(DoorState::UnlockedShortly { started_at: now })
        }

        (DoorState::Unlocked, Open) => Transition::set_closed(false),
        (DoorState::Unlocked, Close) => Transition::set_closed(true),
        (DoorState::Unlocked, Lock) if closed => Transition::to(DoorState::Locked),
        (DoorState::Unlocked, Lock) => {
            Transition::invalid("cannot lock an open door, it must be closed first")
        }
        (DoorState::Unlocked, Unlock) => Transition::invalid("door is already unlocked"),
        (DoorState::Unlocked, UnlockShortly) => {
            Transition::to(DoorState::UnlockedShortly { started_at: now })
        }

        (DoorState::UnlockedShortly { .. }, Open) => Transition::set_closed(false),
        (DoorState::UnlockedShortly { .. }, Close) => Transition::set_closed(true),
        (DoorState::UnlockedShortly { .. }, Lock) => Transition::to(DoorState::Locked),
        (DoorState::UnlockedShortly { .. }, Unlock) => {
            Transition::invalid("action unlock not allowed in state unlocked_shortly")
        }
        (DoorState::UnlockedShortly { .. }, UnlockShortly) => {
            Transition::invalid("door is already unlocked shortly")
        }

        (DoorState::Propped, Open) => Transition::invalid("door is already open (propped)"),
        (DoorState::Propped, Close) => Transition {
            next_state: Some(DoorState::Locked),
            closed: Some(true),
            rejection: None,
        },
        (DoorState::Propped, Lock) => {
            Transition::invalid("cannot lock a propped door, close it first")
        }
        (DoorState::Propped, Unlock) => Transition::to(DoorState::Unlocked),
        (DoorState::Propped, UnlockShortly) => {
            Transition::invalid("action unlock_shortly not allowed in state propped")
        }
    }
}

/// What the expiry clock has to do after a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerChange {
    /// Nothing
    None,
    /// The door entered `UnlockedShortly` at the given moment
    Arm(Timestamp),
    /// The door left `UnlockedShortly`
    Disarm,
}

/// Result of applying one action to a door
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionOutcome {
    /// State before the action
    pub previous: DoorStateName,
    /// State after the action
    pub state: DoorStateName,
    /// Physical flag after the action
    pub closed: bool,
    /// Why the action was a no-op, when invalid in the previous state
    pub rejection: Option<String>,
    /// Clock subscription change implied by the transition
    pub timer: TimerChange,
}

impl ActionOutcome {
    /// Whether the action changed anything it was meant to
    pub fn applied(&self) -> bool {
        self.rejection.is_none()
    }
}

/// Result of offering a clock tick to a door
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpiryOutcome {
    /// The door is no longer in the grace period the tick refers to
    Stale,
    /// The grace period has not run out yet
    Pending {
        /// Whole seconds elapsed so far
        elapsed_secs: i64,
    },
    /// The grace period ran out and the door moved on
    Expired {
        /// Locked or propped
        state: DoorStateName,
        /// Whole seconds elapsed at expiry
        elapsed_secs: i64,
    },
}

/// A door between two spaces
#[derive(Debug, Clone)]
pub struct Door {
    /// Door identifier
    pub id: DoorId,
    closed: bool,
    state: DoorState,
    /// Space on the outer side
    pub from_space: Option<AreaId>,
    /// Space the door gives access to; requests are authorized against it
    pub to_space: Option<AreaId>,
}

impl Door {
    /// Create a closed, unlocked door not yet linked to any space
    pub fn new(id: impl Into<DoorId>) -> Self {
        Self { id: id.into(), closed: true, state: DoorState::Unlocked, from_space: None, to_space: None }
    }

    /// Create a door with an explicit initial state
    pub fn with_state(id: impl Into<DoorId>, closed: bool, state: DoorState) -> Self {
        Self { closed, state, ..Self::new(id) }
    }

    /// Link the door between two spaces
    pub fn link(&mut self, from_space: AreaId, to_space: AreaId) {
        self.from_space = Some(from_space);
        self.to_space = Some(to_space);
    }

    /// Whether the door is physically closed
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Current logical state
    pub fn state(&self) -> DoorState {
        self.state
    }

    /// Name of the current logical state
    pub fn state_name(&self) -> DoorStateName {
        self.state.name()
    }

    /// Apply an already canonicalized action at `now`
    pub fn apply(&mut self, action: Action, now: Timestamp) -> ActionOutcome {
        let previous = self.state;
        let step = transition(&previous, self.closed, action, now);

        if let Some(reason) = &step.rejection {
            crate::door_event!(
                warn,
                "Action not allowed in current state",
                door_id = self.id.as_str(),
                action = action.as_str(),
                state = previous.name().as_str(),
                reason = reason.as_str(),
            );
        }

        if let Some(closed) = step.closed {
            self.closed = closed;
        }
        if let Some(next) = step.next_state {
            self.state = next;
            crate::door_event!(
                info,
                "Door state changed",
                door_id = self.id.as_str(),
                action = action.as_str(),
                from = previous.name().as_str(),
                to = next.name().as_str(),
            );
        }

        let was_short = previous.unlocked_shortly_since().is_some();
        let timer = match self.state.unlocked_shortly_since() {
            Some(started_at) if !was_short => TimerChange::Arm(started_at),
            None if was_short => TimerChange::Disarm,
            _ => TimerChange::None,
        };

        ActionOutcome {
            previous: previous.name(),
            state: self.state.name(),
            closed: self.closed,
            rejection: step.rejection,
            timer,
        }
    }

    /// Offer a clock tick for the grace period that began at `started_at`.
    ///
    /// Once at least `window` whole seconds have elapsed the door locks itself
    /// if closed, or becomes propped if open. A tick for a grace period the
    /// door has already left is stale and changes nothing.
    pub fn expire(&mut self, started_at: Timestamp, now: Timestamp, window: Duration) -> ExpiryOutcome {
        if self.state != (DoorState::UnlockedShortly { started_at }) {
            return ExpiryOutcome::Stale;
        }

        let elapsed_secs = elapsed_whole_seconds(started_at, now);
        if elapsed_secs < window.num_seconds() {
            return ExpiryOutcome::Pending { elapsed_secs };
        }

        if self.closed {
            self.state = DoorState::Locked;
            crate::door_event!(
                info,
                "Unlock-shortly period expired, door closed: auto-locking",
                door_id = self.id.as_str(),
                elapsed_secs = elapsed_secs,
            );
        } else {
            self.state = DoorState::Propped;
            crate::door_event!(
                warn,
                "Unlock-shortly period expired with the door open: propped",
                door_id = self.id.as_str(),
                elapsed_secs = elapsed_secs,
            );
        }

        ExpiryOutcome::Expired { state: self.state.name(), elapsed_secs }
    }

    /// External representation of the door
    pub fn snapshot(&self) -> DoorSnapshot {
        DoorSnapshot {
            id: self.id.clone(),
            closed: self.closed,
            state: self.state.name(),
            from_space: self.from_space.clone(),
            to_space: self.to_space.clone(),
        }
    }
}

/// External representation of a door
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoorSnapshot {
    /// Door identifier
    pub id: DoorId,
    /// Whether the door is physically closed
    pub closed: bool,
    /// Logical state name
    pub state: DoorStateName,
    /// Space on the outer side
    pub from_space: Option<AreaId>,
    /// Space the door gives access to
    pub to_space: Option<AreaId>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, TimeZone, Utc};

    fn t0() -> Timestamp {
        Utc.with_ymd_and_hms(2025, 10, 6, 8, 0, 0).unwrap()
    }

    #[test]
    fn test_new_door_defaults() {
        let door = Door::new("D1");
        assert!(door.is_closed());
        assert_eq!(door.state(), DoorState::Unlocked);
        assert!(door.from_space.is_none());
    }

    #[test]
    fn test_apply_arms_and_disarms_timer() {
        let mut door = Door::with_state("D1", true, DoorState::Locked);

        let outcome = door.apply(Action::UnlockShortly, t0());
        assert_eq!(outcome.timer, TimerChange::Arm(t0()));
        assert_eq!(outcome.state, DoorStateName::UnlockedShortly);

        let outcome = door.apply(Action::Open, t0());
        assert_eq!(outcome.timer, TimerChange::None);
        assert!(!outcome.closed);

        let outcome = door.apply(Action::Lock, t0());
        assert_eq!(outcome.timer, TimerChange::Disarm);
        assert_eq!(outcome.state, DoorStateName::Locked);
    }

    #[test]
    fn test_invalid_action_changes_nothing() {
        let mut door = Door::with_state("D1", false, DoorState::Unlocked);

        let outcome = door.apply(Action::Lock, t0());
        assert!(!outcome.applied());
        assert_eq!(outcome.previous, outcome.state);
        assert!(!door.is_closed());
        assert_eq!(door.state(), DoorState::Unlocked);
        assert_eq!(outcome.timer, TimerChange::None);
    }

    #[test]
    fn test_expire_threshold_is_inclusive() {
        let window = Duration::seconds(10);
        let mut door = Door::with_state("D1", true, DoorState::UnlockedShortly { started_at: t0() });

        let almost = t0() + Duration::milliseconds(9_999);
        assert_eq!(door.expire(t0(), almost, window), ExpiryOutcome::Pending { elapsed_secs: 9 });

        let exactly = t0() + Duration::seconds(10);
        assert_eq!(
            door.expire(t0(), exactly, window),
            ExpiryOutcome::Expired { state: DoorStateName::Locked, elapsed_secs: 10 }
        );
        assert_eq!(door.state(), DoorState::Locked);
    }

    #[test]
    fn test_expire_open_door_becomes_propped() {
        let window = Duration::seconds(10);
        let mut door =
            Door::with_state("D1", false, DoorState::UnlockedShortly { started_at: t0() });

        let outcome = door.expire(t0(), t0() + Duration::seconds(12), window);
        assert_eq!(outcome, ExpiryOutcome::Expired { state: DoorStateName::Propped, elapsed_secs: 12 });
        assert!(!door.is_closed());
    }

    #[test]
    fn test_expire_across_local_fall_back() {
        // Europe/Madrid leaves summer time at 03:00 CEST on 2025-10-26
        let cest = FixedOffset::east_opt(2 * 3600).unwrap();
        let cet = FixedOffset::east_opt(3600).unwrap();
        let started_at = cest.with_ymd_and_hms(2025, 10, 26, 2, 59, 55).unwrap().with_timezone(&Utc);
        let ten_later = cet.with_ymd_and_hms(2025, 10, 26, 2, 0, 5).unwrap().with_timezone(&Utc);
        let mut door = Door::with_state("D1", true, DoorState::UnlockedShortly { started_at });

        assert_eq!(
            door.expire(started_at, ten_later, Duration::seconds(10)),
            ExpiryOutcome::Expired { state: DoorStateName::Locked, elapsed_secs: 10 }
        );
    }

    #[test]
    fn test_stale_expiry_is_ignored() {
        let window = Duration::seconds(10);
        let mut door = Door::with_state("D1", true, DoorState::Locked);
        assert_eq!(door.expire(t0(), t0() + Duration::seconds(30), window), ExpiryOutcome::Stale);

        // A newer grace period is not ended by a tick for an older one
        let later = t0() + Duration::seconds(5);
        let mut door = Door::with_state("D1", true, DoorState::UnlockedShortly { started_at: later });
        assert_eq!(door.expire(t0(), t0() + Duration::seconds(11), window), ExpiryOutcome::Stale);
        assert_eq!(door.state_name(), DoorStateName::UnlockedShortly);
    }

    #[test]
    fn test_snapshot_representation() {
        let mut door = Door::new("D3");
        door.link(AreaId::from("exterior"), AreaId::from("hall"));

        let json = serde_json::to_value(door.snapshot()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": "D3",
                "closed": true,
                "state": "unlocked",
                "fromSpace": "exterior",
                "toSpace": "hall",
            })
        );
    }
}
