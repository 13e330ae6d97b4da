//! User groups and users
//!
//! A group bundles the actions its members may request, the areas they may
//! request them in and the schedule during which that holds. Every user
//! belongs to exactly one group.

use super::schedule::Schedule;
use crate::types::{Action, AreaId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

/// A named set of permissions shared by its members
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserGroup {
    /// Group name
    pub name: String,
    /// Actions members may request
    pub allowed_actions: HashSet<Action>,
    /// Areas in which members may request them
    pub allowed_areas: HashSet<AreaId>,
    /// When the permissions are active
    pub schedule: Schedule,
}

impl UserGroup {
    /// Create a new group
    pub fn new(
        name: impl Into<String>,
        allowed_actions: impl IntoIterator<Item = Action>,
        allowed_areas: impl IntoIterator<Item = AreaId>,
        schedule: Schedule,
    ) -> Self {
        Self {
            name: name.into(),
            allowed_actions: allowed_actions.into_iter().collect(),
            allowed_areas: allowed_areas.into_iter().collect(),
            schedule,
        }
    }

    /// Whether members may request `action`
    pub fn allows_action(&self, action: Action) -> bool {
        self.allowed_actions.contains(&action)
    }

    /// Whether members may act in `area`
    pub fn allows_area(&self, area: &AreaId) -> bool {
        self.allowed_areas.contains(area)
    }
}

/// A person holding a credential
#[derive(Debug, Clone)]
pub struct User {
    /// Display name
    pub name: String,
    /// Unique credential string presented at readers
    pub credential: String,
    /// The group this user belongs to
    pub group: Arc<UserGroup>,
}

impl User {
    /// Create a new user in `group`
    pub fn new(name: impl Into<String>, credential: impl Into<String>, group: Arc<UserGroup>) -> Self {
        Self { name: name.into(), credential: credential.into(), group }
    }

    /// Name of the user's group
    pub fn group_name(&self) -> &str {
        &self.group.name
    }
}
