//! Door Access Control
//!
//! The core of a physical access-control system: it decides whether a
//! credential may perform an action on a door and drives every door through
//! its logical states, some of which expire on their own.
//!
//! # Overview
//!
//! A request names a credential, an action and a door. The user behind the
//! credential belongs to one group, and the group allows a set of actions in
//! a set of areas during a schedule. Authorized actions are applied to the
//! door's state machine; a door left unlocked shortly is locked again (or
//! reported propped) by a background clock once its grace period runs out.
//!
//! ## Key Features
//!
//! - **Door state machine**: locked, unlocked, unlocked shortly and propped,
//!   with one central transition table
//! - **Timed expiry**: a ticker thread ends grace periods without racing
//!   manual actions
//! - **Policy evaluation**: action, area and schedule checks with a reason for
//!   every denial
//! - **Area tree**: requests for a whole area fan out to its doors
//!
//! ## Quick Start
//!
//! ```rust
//! use door_access_control::*;
//! use std::sync::Arc;
//!
//! let clock = Arc::new(Clock::from_config(&ControlConfig::default()));
//! let monday = parse_moment("2025-10-06 10:00:00").unwrap();
//! let processor = control::bootstrap::demo_building(monday.date())
//!     .unwrap()
//!     .into_processor(clock.clone())
//!     .unwrap();
//!
//! let result = processor
//!     .process_at(&AccessRequest::new("74984", "lock", "D3"), monday)
//!     .unwrap();
//! assert!(!result.authorized);
//! assert_eq!(result.reasons[0].to_string(), "action not permitted for group");
//! ```
//!
//! ## Module Organization
//!
//! - [`types`]: identifiers, the action vocabulary, time and configuration
//! - [`permissions`]: schedules, groups, users and the policy evaluator
//! - [`facility`]: areas, doors and the door registry
//! - [`control`]: request processing, the expiry clock, errors and logging
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐    ┌─────────────┐    ┌─────────────┐
//! │   Types     │    │ Permissions │    │  Facility   │
//! │             │    │             │    │             │
//! │ Identifiers │◄───┤ Schedule    │    │ Areas       │
//! │ Actions     │    │ Groups      │    │ Doors       │
//! │ Config      │    │ Evaluator   │    │ Registry    │
//! └─────────────┘    └─────────────┘    └─────────────┘
//!                            ▲                   ▲
//!                            │                   │
//!                    ┌───────┴───────────────────┴─┐
//!                    │          Control            │
//!                    │                             │
//!                    │ RequestProcessor    Clock   │
//!                    └─────────────────────────────┘
//! ```
#![warn(missing_docs, missing_debug_implementations, unreachable_pub)]

// Module declarations
pub mod control;
pub mod facility;
pub mod permissions;
pub mod types;

// Core types and identifiers
pub use types::{
    now, parse_moment, timestamp_now, Action, AreaId, CliArgs, ConfigValidationError,
    ControlConfig, DoorId, DoorStateName, Moment, RequestId, Timestamp,
};

// Permissions and access control
pub use permissions::{
    AccessDecision, AccessPolicyEvaluator, DenialReason, Schedule, User, UserDirectory, UserGroup,
};

// Doors and areas
pub use facility::{Area, AreaDirectory, Door, DoorRegistry, DoorSnapshot, DoorState};

// Request processing, clock and infrastructure
pub use control::{
    AccessControlError, AccessControlResult, AccessRequest, AreaRequest, AreaRequestResult, Clock,
    ClockHandle, LoggingConfig, RequestProcessor, RequestResult,
};
