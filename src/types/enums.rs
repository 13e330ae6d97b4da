//! Enumeration types for the access control core
//!
//! This module contains the action vocabulary accepted at the request boundary
//! and the externally visible names of the door states.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Actions a user can request on a door (or on every door of an area)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Physically open the door
    Open,
    /// Physically close the door
    Close,
    /// Lock the door
    Lock,
    /// Unlock the door until somebody locks it again
    Unlock,
    /// Unlock the door for a short grace period
    UnlockShortly,
}

impl Action {
    /// Every recognized action, in table order
    pub const ALL: [Action; 5] =
        [Action::Open, Action::Close, Action::Lock, Action::Unlock, Action::UnlockShortly];

    /// Normalize a free-form action string into one of the recognized verbs.
    ///
    /// Matching is case-insensitive and ignores surrounding whitespace.
    /// `"unlock shortly"` is accepted as a spelling of `unlock_shortly`.
    /// Anything else yields `None`.
    pub fn canonicalize(input: &str) -> Option<Action> {
        match input.trim().to_lowercase().as_str() {
            "open" => Some(Action::Open),
            "close" => Some(Action::Close),
            "lock" => Some(Action::Lock),
            "unlock" => Some(Action::Unlock),
            "unlock_shortly" | "unlock shortly" => Some(Action::UnlockShortly),
            _ => None,
        }
    }

    /// Canonical wire spelling of the action
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Open => "open",
            Action::Close => "close",
            Action::Lock => "lock",
            Action::Unlock => "unlock",
            Action::UnlockShortly => "unlock_shortly",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Action::canonicalize(s).ok_or_else(|| format!("Unknown action: {}", s))
    }
}

/// External name of a door's logical state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DoorStateName {
    /// Door is locked
    Locked,
    /// Door is unlocked
    Unlocked,
    /// Door is unlocked for a short grace period
    UnlockedShortly,
    /// Door was left open past the grace period
    Propped,
}

impl DoorStateName {
    /// Wire spelling of the state
    pub fn as_str(&self) -> &'static str {
        match self {
            DoorStateName::Locked => "locked",
            DoorStateName::Unlocked => "unlocked",
            DoorStateName::UnlockedShortly => "unlocked_shortly",
            DoorStateName::Propped => "propped",
        }
    }
}

impl fmt::Display for DoorStateName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DoorStateName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "locked" => Ok(DoorStateName::Locked),
            "unlocked" => Ok(DoorStateName::Unlocked),
            "unlocked_shortly" | "unlocked shortly" => Ok(DoorStateName::UnlockedShortly),
            "propped" => Ok(DoorStateName::Propped),
            _ => Err(format!("Unknown door state: {}", s)),
        }
    }
}
