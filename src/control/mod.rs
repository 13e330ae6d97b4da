//! Request processing and the expiry clock
//!
//! This module ties the permissions and the doors together.
//!
//! # Overview
//!
//! - **RequestProcessor**: one request end to end, from credential to door state
//! - **Clock**: expiry scheduler for unlocked-shortly doors plus its ticker thread
//! - **Error handling**: infrastructure errors and defects
//! - **Logging**: tracing subscriber setup
//! - **bootstrap**: the demo building
//!
//! # Usage Example
//!
//! ```rust
//! use door_access_control::control::*;
//! use door_access_control::types::*;
//! use std::sync::Arc;
//!
//! let config = ControlConfig::default();
//! let clock = Arc::new(Clock::from_config(&config));
//! let today = parse_moment("2025-10-06 10:00:00").unwrap();
//!
//! let processor = bootstrap::demo_building(today.date())
//!     .unwrap()
//!     .into_processor(clock.clone())
//!     .unwrap();
//! let handle = Clock::start(clock, processor.doors().clone()).unwrap();
//!
//! let request = AccessRequest::new("74984", "unlock_shortly", "D3");
//! let result = processor.process_at(&request, today).unwrap();
//! assert_eq!(result.state, Some(DoorStateName::UnlockedShortly));
//!
//! handle.stop().unwrap();
//! ```

pub mod bootstrap;
pub mod clock;
pub mod error;
pub mod logging;
pub mod processor;

// Re-export all public types for convenience
pub use clock::{Clock, ClockHandle, ExpiredDoor, TickReport};
pub use error::{AccessControlError, AccessControlResult};
pub use logging::{LoggingConfig, LoggingError, LoggingGuard};
pub use processor::{
    AccessRequest, AreaRequest, AreaRequestResult, RequestLine, RequestProcessor, RequestResult,
};
