//! Access control and permissions management
//!
//! This module decides whether a user may perform an action on a door.
//!
//! # Overview
//!
//! - **Schedule**: date range, weekday set and daily window of a group
//! - **UserGroup / User**: allowed actions and areas, and the people holding them
//! - **UserDirectory**: credential lookup over all users
//! - **AccessPolicyEvaluator**: the authorize/deny decision with its reason
//!
//! # Usage Example
//!
//! ```rust
//! use door_access_control::permissions::*;
//! use door_access_control::types::*;
//! use chrono::{NaiveDate, NaiveTime};
//! use std::sync::Arc;
//!
//! let schedule = Schedule::new(
//!     NaiveDate::from_ymd_opt(2025, 9, 1).unwrap(),
//!     NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
//!     WORKING_DAYS,
//!     NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
//!     NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
//! );
//! let group = UserGroup::new("Employees", [Action::Open], [AreaId::from("hall")], schedule);
//!
//! let mut directory = UserDirectory::new();
//! let group = directory.add_group(group);
//! directory.add_user(User::new("Ernest", "74984", group));
//!
//! let user = directory.find_user_by_credential("74984").unwrap();
//! let monday_morning = parse_moment("2025-10-06 10:00:00").unwrap();
//! let decision = AccessPolicyEvaluator::new()
//!     .authorize(user, "open", &AreaId::from("hall"), monday_morning);
//! assert!(decision.is_authorized());
//! ```

pub mod directory;
pub mod evaluator;
pub mod group;
pub mod schedule;

// Re-export all public types for convenience
pub use directory::*;
pub use evaluator::*;
pub use group::*;
pub use schedule::*;
