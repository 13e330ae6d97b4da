//! Expiry clock
//!
//! The clock keeps a map from door id to the UTC instant that door entered
//! the unlocked-shortly state. Every tick offers the current instant to each
//! subscribed door through the [`DoorRegistry`]; a door whose grace period
//! has run out locks itself (closed) or becomes propped (open) and is
//! disarmed while its own lock is held.
//!
//! Lock order is always door first, then the subscription map. A tick copies
//! the subscriptions and releases the map before touching any door, and a
//! door only accepts a tick for the grace period it is still in, so an expiry
//! racing a manual `lock` never resurrects a state the door already left.

use crate::control::error::{AccessControlError, AccessControlResult};
use crate::facility::{DoorRegistry, ExpiryOutcome, ExpiryScheduler};
use crate::types::{timestamp_now, ControlConfig, DoorId, DoorStateName, Timestamp};
use std::collections::HashMap;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration as StdDuration;
use tracing::{debug, error, info, trace, warn};

/// A door that left the unlocked-shortly state during a tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpiredDoor {
    /// The door
    pub door_id: DoorId,
    /// Locked or propped
    pub state: DoorStateName,
    /// Whole seconds spent unlocked shortly
    pub elapsed_secs: i64,
}

/// What one tick did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Subscriptions offered the tick
    pub checked: usize,
    /// Doors that expired on this tick
    pub expired: Vec<ExpiredDoor>,
    /// Doors whose subscription was dropped because the door could not be read
    pub failed: Vec<DoorId>,
}

/// Periodic expiry source for unlocked-shortly doors
#[derive(Debug)]
pub struct Clock {
    window: chrono::Duration,
    tick_interval: StdDuration,
    subscriptions: Mutex<HashMap<DoorId, Timestamp>>,
}

impl Clock {
    /// Create a clock with the given grace period and tick cadence
    pub fn new(window: chrono::Duration, tick_interval: StdDuration) -> Self {
        Self { window, tick_interval, subscriptions: Mutex::new(HashMap::new()) }
    }

    /// Create a clock from configuration
    pub fn from_config(config: &ControlConfig) -> Self {
        Self::new(config.unlock_shortly_window(), config.tick_interval())
    }

    /// Grace period of the unlocked-shortly state
    pub fn window(&self) -> chrono::Duration {
        self.window
    }

    /// Time between ticks of the background thread
    pub fn tick_interval(&self) -> StdDuration {
        self.tick_interval
    }

    /// Doors currently subscribed, sorted
    pub fn subscribed(&self) -> AccessControlResult<Vec<DoorId>> {
        let mut ids: Vec<_> = self.subscriptions.lock()?.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }

    /// Whether a door is currently subscribed
    pub fn is_subscribed(&self, door: &DoorId) -> AccessControlResult<bool> {
        Ok(self.subscriptions.lock()?.contains_key(door))
    }

    /// Offer `now` to every subscribed door.
    ///
    /// A door that cannot be reached (unknown or poisoned) loses its
    /// subscription; the other doors are still ticked.
    pub fn tick(&self, now: Timestamp, registry: &DoorRegistry) -> AccessControlResult<TickReport> {
        let due: Vec<(DoorId, Timestamp)> =
            self.subscriptions.lock()?.iter().map(|(id, at)| (id.clone(), *at)).collect();

        let mut report = TickReport { checked: due.len(), ..TickReport::default() };
        for (door_id, started_at) in due {
            match registry.expire(&door_id, started_at, now, self.window) {
                Ok(ExpiryOutcome::Expired { state, elapsed_secs }) => {
                    report.expired.push(ExpiredDoor { door_id, state, elapsed_secs });
                }
                Ok(ExpiryOutcome::Pending { elapsed_secs }) => {
                    trace!(door_id = %door_id, elapsed_secs, "Unlock-shortly period running");
                }
                Ok(ExpiryOutcome::Stale) => {
                    trace!(door_id = %door_id, "Stale subscription skipped");
                }
                Err(AccessControlError::UnknownDoor(_)) => {
                    warn!(door_id = %door_id, "Subscription for unknown door dropped");
                    self.disarm(&door_id)?;
                    report.failed.push(door_id);
                }
                Err(e) => {
                    error!(door_id = %door_id, error = %e, "Door unreachable, subscription dropped");
                    self.disarm(&door_id)?;
                    report.failed.push(door_id);
                }
            }
        }

        if !report.expired.is_empty() || !report.failed.is_empty() {
            debug!(
                checked = report.checked,
                expired = report.expired.len(),
                failed = report.failed.len(),
                "Clock tick"
            );
        }
        Ok(report)
    }

    /// Start the background ticker.
    ///
    /// The thread ticks every [`tick_interval`](Self::tick_interval) with the
    /// current UTC instant until the returned handle is stopped or dropped.
    pub fn start(clock: Arc<Clock>, registry: Arc<DoorRegistry>) -> AccessControlResult<ClockHandle> {
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let interval = clock.tick_interval;

        let thread = thread::Builder::new()
            .name("door-clock".to_string())
            .spawn(move || loop {
                match stop_rx.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => {
                        if let Err(e) = clock.tick(timestamp_now(), &registry) {
                            e.log();
                            if !e.is_recoverable() {
                                error!("Clock thread stopping after unrecoverable error");
                                break;
                            }
                        }
                    }
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            })
            .map_err(|e| AccessControlError::clock_error(format!("failed to spawn clock thread: {}", e)))?;

        info!(tick_ms = interval.as_millis() as u64, "Clock started");
        Ok(ClockHandle { stop_tx: Some(stop_tx), thread: Some(thread) })
    }
}

impl ExpiryScheduler for Clock {
    fn arm(&self, door: &DoorId, started_at: Timestamp) -> AccessControlResult<()> {
        if let Some(previous) = self.subscriptions.lock()?.insert(door.clone(), started_at) {
            warn!(door_id = %door, %previous, "Door armed twice, keeping the newest grace period");
        }
        debug!(door_id = %door, %started_at, "Door subscribed to clock");
        Ok(())
    }

    fn disarm(&self, door: &DoorId) -> AccessControlResult<()> {
        if self.subscriptions.lock()?.remove(door).is_none() {
            warn!(door_id = %door, "Disarm for a door that was not subscribed");
        } else {
            debug!(door_id = %door, "Door unsubscribed from clock");
        }
        Ok(())
    }
}

/// Handle to the running clock thread; stops and joins it on drop
#[derive(Debug)]
pub struct ClockHandle {
    stop_tx: Option<mpsc::Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

impl ClockHandle {
    /// Stop the clock thread and wait for it to finish
    pub fn stop(mut self) -> AccessControlResult<()> {
        self.shutdown()
    }

    fn shutdown(&mut self) -> AccessControlResult<()> {
        drop(self.stop_tx.take());
        if let Some(thread) = self.thread.take() {
            thread.join().map_err(|_| AccessControlError::clock_error("clock thread panicked"))?;
            info!("Clock stopped");
        }
        Ok(())
    }
}

impl Drop for ClockHandle {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            e.log();
        }
    }
}
