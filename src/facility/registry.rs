//! Door registry
//!
//! Owns every door of the site. The set of doors is fixed at construction;
//! each door sits behind its own lock so a slow operation on one door never
//! blocks another. Entering and leaving the unlocked-shortly state is reported
//! to an injected [`ExpiryScheduler`] while the door's lock is still held.

use crate::control::error::{AccessControlError, AccessControlResult};
use crate::facility::door::{ActionOutcome, Door, DoorSnapshot, ExpiryOutcome, TimerChange};
use crate::types::{Action, AreaId, DoorId, DoorStateName, Timestamp};
use chrono::Duration;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

/// Receives expiry subscriptions for doors entering the unlocked-shortly state.
///
/// Implementations are called with the door's lock held, so they must not
/// call back into the registry.
pub trait ExpiryScheduler: Send + Sync + fmt::Debug {
    /// Start watching `door`, whose grace period began at `started_at`
    fn arm(&self, door: &DoorId, started_at: Timestamp) -> AccessControlResult<()>;

    /// Stop watching `door`
    fn disarm(&self, door: &DoorId) -> AccessControlResult<()>;
}

/// All doors of the site, each behind its own lock
#[derive(Debug)]
pub struct DoorRegistry {
    doors: HashMap<DoorId, Mutex<Door>>,
    scheduler: Arc<dyn ExpiryScheduler>,
}

impl DoorRegistry {
    /// Build the registry.
    ///
    /// Doors already in the unlocked-shortly state are armed with the
    /// scheduler. A repeated id keeps the first door.
    pub fn new(
        doors: impl IntoIterator<Item = Door>,
        scheduler: Arc<dyn ExpiryScheduler>,
    ) -> AccessControlResult<Self> {
        let mut map = HashMap::new();
        for door in doors {
            if map.contains_key(&door.id) {
                tracing::warn!(door_id = %door.id, "Duplicate door id ignored");
                continue;
            }
            if let Some(started_at) = door.state().unlocked_shortly_since() {
                scheduler.arm(&door.id, started_at)?;
            }
            map.insert(door.id.clone(), Mutex::new(door));
        }

        tracing::debug!(doors = map.len(), "Door registry ready");
        Ok(Self { doors: map, scheduler })
    }

    fn lock(&self, id: &DoorId) -> AccessControlResult<MutexGuard<'_, Door>> {
        let door = self.doors.get(id).ok_or_else(|| AccessControlError::unknown_door(id.as_str()))?;
        door.lock().map_err(|_| AccessControlError::lock_poisoned(format!("door {}", id)))
    }

    /// Whether a door with this id exists
    pub fn contains(&self, id: &DoorId) -> bool {
        self.doors.contains_key(id)
    }

    /// Number of doors
    pub fn len(&self) -> usize {
        self.doors.len()
    }

    /// Whether the registry has no doors
    pub fn is_empty(&self) -> bool {
        self.doors.is_empty()
    }

    /// All door ids, sorted
    pub fn door_ids(&self) -> Vec<DoorId> {
        let mut ids: Vec<_> = self.doors.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Current state name of a door
    pub fn state_of(&self, id: &DoorId) -> AccessControlResult<DoorStateName> {
        Ok(self.lock(id)?.state_name())
    }

    /// Space a door leads into
    pub fn to_space(&self, id: &DoorId) -> AccessControlResult<Option<AreaId>> {
        Ok(self.lock(id)?.to_space.clone())
    }

    /// External representation of a door
    pub fn snapshot(&self, id: &DoorId) -> AccessControlResult<DoorSnapshot> {
        Ok(self.lock(id)?.snapshot())
    }

    /// External representation of every door, sorted by id
    pub fn snapshots(&self) -> AccessControlResult<Vec<DoorSnapshot>> {
        self.door_ids().iter().map(|id| self.snapshot(id)).collect()
    }

    /// Apply a canonical action to a door at the instant `now`.
    ///
    /// The transition and the matching scheduler change happen under the
    /// door's lock, so a concurrent expiry sees either the old or the new
    /// state, never a mix.
    pub fn do_action(
        &self,
        id: &DoorId,
        action: Action,
        now: Timestamp,
    ) -> AccessControlResult<ActionOutcome> {
        let mut door = self.lock(id)?;
        let outcome = door.apply(action, now);

        match outcome.timer {
            TimerChange::Arm(started_at) => self.scheduler.arm(id, started_at)?,
            TimerChange::Disarm => self.scheduler.disarm(id)?,
            TimerChange::None => {}
        }

        Ok(outcome)
    }

    /// Offer an expiry tick to a door for the grace period that began at
    /// `started_at`. On expiry the door is disarmed before its lock is released.
    pub fn expire(
        &self,
        id: &DoorId,
        started_at: Timestamp,
        now: Timestamp,
        window: Duration,
    ) -> AccessControlResult<ExpiryOutcome> {
        let mut door = self.lock(id)?;
        let outcome = door.expire(started_at, now, window);

        if let ExpiryOutcome::Expired { .. } = outcome {
            self.scheduler.disarm(id)?;
        }

        Ok(outcome)
    }
}
