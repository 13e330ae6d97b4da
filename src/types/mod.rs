//! Core types and identifiers for the access control core
//!
//! This module contains the fundamental types shared by every other module.
//!
//! # Overview
//!
//! - **Identifiers**: door, area and request identifiers
//! - **Enums**: the action vocabulary and the door state names
//! - **Time**: the local [`Moment`] used by schedules and the UTC [`Timestamp`] used by the clock
//! - **Configuration**: runtime configuration with validation and CLI support
//!
//! # Usage Example
//!
//! ```rust
//! use door_access_control::types::*;
//!
//! let door = DoorId::from("D3");
//! let action = Action::canonicalize(" Unlock Shortly ");
//! assert_eq!(action, Some(Action::UnlockShortly));
//!
//! let config = ControlConfig { unlock_shortly_secs: 5, ..Default::default() };
//! assert!(config.validate().is_ok());
//! # let _ = door;
//! ```

pub mod config;
pub mod enums;
pub mod identifiers;
pub mod time;

// Re-export all public types for convenience
pub use config::*;
pub use enums::*;
pub use identifiers::*;
pub use time::*;
