//! Request processing
//!
//! Resolves the door, the action, the user and the door's area, asks the
//! [`AccessPolicyEvaluator`] and, when authorized, applies the action through
//! the [`DoorRegistry`]. Every request ends in a [`RequestResult`]; only
//! defects such as a poisoned door lock surface as errors.

use crate::control::error::AccessControlResult;
use crate::facility::{AreaDirectory, DoorRegistry};
use crate::permissions::{AccessPolicyEvaluator, DenialReason, UserDirectory};
use crate::types::{now, timestamp_now, Action, AreaId, DoorId, DoorStateName, Moment, RequestId};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, info_span};

/// A request to act on one door
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessRequest {
    /// Credential presented at the reader
    pub credential: String,
    /// Requested action, free-form
    pub action: String,
    /// Target door
    pub door: DoorId,
}

impl AccessRequest {
    /// Create a door request
    pub fn new(
        credential: impl Into<String>,
        action: impl Into<String>,
        door: impl Into<DoorId>,
    ) -> Self {
        Self { credential: credential.into(), action: action.into(), door: door.into() }
    }
}

/// A request to act on every door giving access to an area
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AreaRequest {
    /// Credential presented at the reader
    pub credential: String,
    /// Requested action, free-form
    pub action: String,
    /// Target area
    pub area: AreaId,
}

impl AreaRequest {
    /// Create an area request
    pub fn new(
        credential: impl Into<String>,
        action: impl Into<String>,
        area: impl Into<AreaId>,
    ) -> Self {
        Self { credential: credential.into(), action: action.into(), area: area.into() }
    }
}

/// One line of a request file
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RequestLine {
    /// Carries a `door` field
    Door(AccessRequest),
    /// Carries an `area` field
    Area(AreaRequest),
}

/// Outcome of a door request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestResult {
    /// Correlation id
    pub request_id: RequestId,
    /// Credential as presented
    pub credential: String,
    /// Action as presented
    pub action: String,
    /// Target door
    pub door_id: DoorId,
    /// Whether the policy allowed the action
    pub authorized: bool,
    /// Whether the door changed as requested
    pub applied: bool,
    /// Door state after the request; `None` for an unknown door
    pub state: Option<DoorStateName>,
    /// Physical flag after the request; `None` for an unknown door
    pub closed: Option<bool>,
    /// Denial causes, empty on success
    pub reasons: Vec<DenialReason>,
}

impl RequestResult {
    fn pending(request: &AccessRequest) -> Self {
        Self {
            request_id: RequestId::new(),
            credential: request.credential.clone(),
            action: request.action.clone(),
            door_id: request.door.clone(),
            authorized: false,
            applied: false,
            state: None,
            closed: None,
            reasons: Vec::new(),
        }
    }

    /// Whether the request was authorized and carried out
    pub fn succeeded(&self) -> bool {
        self.authorized && self.applied
    }
}

/// Outcome of an area request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaRequestResult {
    /// Correlation id
    pub request_id: RequestId,
    /// Credential as presented
    pub credential: String,
    /// Action as presented
    pub action: String,
    /// Target area
    pub area_id: AreaId,
    /// Area-level denial causes; when set no door was touched
    pub reasons: Vec<DenialReason>,
    /// One result per door giving access to the area
    pub doors: Vec<RequestResult>,
}

/// Processes access requests against shared directories and doors
#[derive(Debug, Clone)]
pub struct RequestProcessor {
    users: Arc<UserDirectory>,
    areas: Arc<AreaDirectory>,
    doors: Arc<DoorRegistry>,
    evaluator: AccessPolicyEvaluator,
}

impl RequestProcessor {
    /// Create a processor over the given directories
    pub fn new(users: Arc<UserDirectory>, areas: Arc<AreaDirectory>, doors: Arc<DoorRegistry>) -> Self {
        Self { users, areas, doors, evaluator: AccessPolicyEvaluator::new() }
    }

    /// The user directory
    pub fn users(&self) -> &Arc<UserDirectory> {
        &self.users
    }

    /// The area directory
    pub fn areas(&self) -> &Arc<AreaDirectory> {
        &self.areas
    }

    /// The door registry
    pub fn doors(&self) -> &Arc<DoorRegistry> {
        &self.doors
    }

    /// Process a door request at the current wall-clock time
    pub fn process(&self, request: &AccessRequest) -> AccessControlResult<RequestResult> {
        self.process_at(request, now())
    }

    /// Process a door request, checking the group schedule at `at`.
    ///
    /// `at` only feeds authorization; the door's own timing (the start of an
    /// unlock-shortly period) is always stamped with the current UTC instant,
    /// the same time base the clock ticks on.
    ///
    /// Denials never touch the door and report its current state. An
    /// authorized action that the door state does not support is reported
    /// with `authorized` set, `applied` unset and the state's reason.
    pub fn process_at(&self, request: &AccessRequest, at: Moment) -> AccessControlResult<RequestResult> {
        let mut result = RequestResult::pending(request);
        let span = info_span!(
            "request",
            request_id = %result.request_id,
            credential = %request.credential,
            door_id = %request.door,
        );
        let _enter = span.enter();

        if !self.doors.contains(&request.door) {
            return Ok(self.deny(result, DenialReason::UnknownDoor));
        }

        let Some(action) = Action::canonicalize(&request.action) else {
            debug!(action = %request.action, "Unrecognized action");
            return self.deny_with_state(result, DenialReason::NotAllowedAction);
        };

        let Some(user) = self.users.find_user_by_credential(&request.credential) else {
            return self.deny_with_state(result, DenialReason::UnknownCredential);
        };

        let area = match self.doors.to_space(&request.door)? {
            Some(area) if self.areas.find(&area).is_some() => area,
            _ => return self.deny_with_state(result, DenialReason::UnknownArea),
        };

        let decision = self.evaluator.authorize(user, action.as_str(), &area, at);
        if !decision.is_authorized() {
            result.reasons = decision.reasons;
            self.refresh_state(&mut result)?;
            info!(
                user = %user.name,
                action = action.as_str(),
                reasons = ?result.reasons.iter().map(|r| r.to_string()).collect::<Vec<_>>(),
                "Request denied"
            );
            return Ok(result);
        }

        let outcome = self.doors.do_action(&request.door, action, timestamp_now())?;
        result.authorized = true;
        result.applied = outcome.applied();
        result.state = Some(outcome.state);
        result.closed = Some(outcome.closed);
        if let Some(rejection) = outcome.rejection {
            result.reasons.push(DenialReason::InvalidForState(rejection));
        }

        info!(
            user = %user.name,
            action = action.as_str(),
            applied = result.applied,
            state = outcome.state.as_str(),
            "Request processed"
        );
        Ok(result)
    }

    /// Process an area request at the current wall-clock time
    pub fn process_area(&self, request: &AreaRequest) -> AccessControlResult<AreaRequestResult> {
        self.process_area_at(request, now())
    }

    /// Process an area request, checking the group schedule at `at`.
    ///
    /// Each door giving access to a space under the area is authorized on
    /// its own, against the space it leads into.
    pub fn process_area_at(
        &self,
        request: &AreaRequest,
        at: Moment,
    ) -> AccessControlResult<AreaRequestResult> {
        let mut result = AreaRequestResult {
            request_id: RequestId::new(),
            credential: request.credential.clone(),
            action: request.action.clone(),
            area_id: request.area.clone(),
            reasons: Vec::new(),
            doors: Vec::new(),
        };
        let span = info_span!("area_request", request_id = %result.request_id, area_id = %request.area);
        let _enter = span.enter();

        let doors = match self.areas.doors_in(&request.area) {
            Some(doors) => doors,
            None => {
                result.reasons.push(DenialReason::UnknownArea);
                return Ok(result);
            }
        };
        if Action::canonicalize(&request.action).is_none() {
            result.reasons.push(DenialReason::NotAllowedAction);
            return Ok(result);
        }
        if self.users.find_user_by_credential(&request.credential).is_none() {
            result.reasons.push(DenialReason::UnknownCredential);
            return Ok(result);
        }

        for door in doors {
            let door_request = AccessRequest {
                credential: request.credential.clone(),
                action: request.action.clone(),
                door,
            };
            result.doors.push(self.process_at(&door_request, at)?);
        }

        info!(
            doors = result.doors.len(),
            applied = result.doors.iter().filter(|r| r.succeeded()).count(),
            "Area request processed"
        );
        Ok(result)
    }

    fn deny(&self, mut result: RequestResult, reason: DenialReason) -> RequestResult {
        info!(reason = %reason, "Request denied");
        result.reasons.push(reason);
        result
    }

    fn deny_with_state(
        &self,
        result: RequestResult,
        reason: DenialReason,
    ) -> AccessControlResult<RequestResult> {
        let mut result = self.deny(result, reason);
        self.refresh_state(&mut result)?;
        Ok(result)
    }

    fn refresh_state(&self, result: &mut RequestResult) -> AccessControlResult<()> {
        let snapshot = self.doors.snapshot(&result.door_id)?;
        result.state = Some(snapshot.state);
        result.closed = Some(snapshot.closed);
        Ok(())
    }
}
