//! Doors, areas and the door registry
//!
//! This module models the physical side of the site: the area tree, the doors
//! between spaces and the per-door state machine.
//!
//! # Overview
//!
//! - **Area / AreaDirectory**: partitions and spaces, looked up by id
//! - **Door / DoorState**: physical `closed` flag plus logical state
//! - **transition**: the (state, action) table every door follows
//! - **DoorRegistry**: every door behind its own lock, reporting grace-period
//!   entry and exit to an [`ExpiryScheduler`]
//!
//! # Usage Example
//!
//! ```rust
//! use door_access_control::control::Clock;
//! use door_access_control::facility::*;
//! use door_access_control::types::*;
//! use std::sync::Arc;
//!
//! let clock = Arc::new(Clock::new(chrono::Duration::seconds(10), std::time::Duration::from_secs(1)));
//! let mut door = Door::with_state("D3", true, DoorState::Locked);
//! door.link(AreaId::from("exterior"), AreaId::from("hall"));
//!
//! let registry = DoorRegistry::new(vec![door], clock.clone()).unwrap();
//! let outcome = registry
//!     .do_action(&DoorId::from("D3"), Action::UnlockShortly, timestamp_now())
//!     .unwrap();
//! assert_eq!(outcome.state, DoorStateName::UnlockedShortly);
//! ```

pub mod area;
pub mod door;
pub mod registry;

// Re-export all public types for convenience
pub use area::{Area, AreaDirectory};
pub use door::{
    transition, ActionOutcome, Door, DoorSnapshot, DoorState, ExpiryOutcome, TimerChange,
    Transition,
};
pub use registry::{DoorRegistry, ExpiryScheduler};
