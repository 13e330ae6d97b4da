//! Access policy evaluation
//!
//! Combines a user's group, the group's allowed actions and areas, and the
//! group schedule into an authorize/deny decision that names its reason.

use super::group::User;
use crate::types::{Action, AreaId, Moment};
use serde::{Serialize, Serializer};
use std::fmt;
use tracing::{debug, instrument};

/// Why a request was not carried out
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DenialReason {
    /// The evaluator could not canonicalize the action
    ActionNotRecognized,
    /// The request boundary received an unrecognized action string
    NotAllowedAction,
    /// The group may not request this action
    ActionNotPermitted,
    /// The group may not act in the door's area
    AreaNotPermitted,
    /// The moment is outside the group schedule
    OutsideSchedule,
    /// No user holds the presented credential
    UnknownCredential,
    /// No door has the requested id
    UnknownDoor,
    /// No area has the requested id
    UnknownArea,
    /// The door's current state does not support the action
    InvalidForState(String),
}

impl fmt::Display for DenialReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DenialReason::ActionNotRecognized => write!(f, "action not recognized"),
            DenialReason::NotAllowedAction => write!(f, "Not allowed action"),
            DenialReason::ActionNotPermitted => write!(f, "action not permitted for group"),
            DenialReason::AreaNotPermitted => write!(f, "area not permitted for group"),
            DenialReason::OutsideSchedule => write!(f, "outside permitted schedule"),
            DenialReason::UnknownCredential => write!(f, "unknown credential"),
            DenialReason::UnknownDoor => write!(f, "unknown door"),
            DenialReason::UnknownArea => write!(f, "unknown area"),
            DenialReason::InvalidForState(detail) => write!(f, "{}", detail),
        }
    }
}

impl Serialize for DenialReason {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

/// Outcome of an authorization check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessDecision {
    /// Whether the action is permitted
    pub authorized: bool,
    /// Denial causes in the order they were found; empty when authorized
    pub reasons: Vec<DenialReason>,
}

impl AccessDecision {
    /// An authorizing decision
    pub fn authorize() -> Self {
        Self { authorized: true, reasons: Vec::new() }
    }

    /// A denying decision with one reason
    pub fn deny(reason: DenialReason) -> Self {
        Self { authorized: false, reasons: vec![reason] }
    }

    /// Add another denial cause; the decision becomes a denial
    pub fn add_reason(&mut self, reason: DenialReason) {
        self.authorized = false;
        self.reasons.push(reason);
    }

    /// Whether the action is permitted
    pub fn is_authorized(&self) -> bool {
        self.authorized
    }
}

/// Stateless evaluator of group policies
#[derive(Debug, Clone, Copy, Default)]
pub struct AccessPolicyEvaluator;

impl AccessPolicyEvaluator {
    /// Create a new evaluator
    pub fn new() -> Self {
        Self
    }

    /// Decide whether `user` may perform `action` on a door into `area` at `now`.
    ///
    /// Checks run in order and stop at the first failure: action recognized,
    /// action allowed for the group, area allowed for the group, moment inside
    /// the group schedule.
    #[instrument(skip(self, user), fields(user = %user.name, group = %user.group.name))]
    pub fn authorize(&self, user: &User, action: &str, area: &AreaId, now: Moment) -> AccessDecision {
        let group = &user.group;

        let Some(action) = Action::canonicalize(action) else {
            return AccessDecision::deny(DenialReason::ActionNotRecognized);
        };

        if !group.allows_action(action) {
            return AccessDecision::deny(DenialReason::ActionNotPermitted);
        }

        if !group.allows_area(area) {
            return AccessDecision::deny(DenialReason::AreaNotPermitted);
        }

        if let Err(miss) = group.schedule.check(now) {
            debug!(%miss, "Moment outside group schedule");
            return AccessDecision::deny(DenialReason::OutsideSchedule);
        }

        AccessDecision::authorize()
    }
}
