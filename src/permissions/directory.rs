//! User directory
//!
//! Read-only registry of groups and users, built once at startup and looked
//! up by credential for every request.

use super::group::{User, UserGroup};
use std::collections::HashMap;
use std::sync::Arc;

/// A collection of user groups and their members with credential lookup
#[derive(Debug, Clone, Default)]
pub struct UserDirectory {
    /// All groups, in insertion order
    groups: Vec<Arc<UserGroup>>,
    /// All users, in insertion order
    users: Vec<User>,
    /// Quick lookup map from credential to index in `users`
    credential_index: HashMap<String, usize>,
}

impl UserDirectory {
    /// Create a new empty directory
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a group; returns the shared handle members should point at
    pub fn add_group(&mut self, group: UserGroup) -> Arc<UserGroup> {
        let group = Arc::new(group);
        self.groups.push(Arc::clone(&group));
        group
    }

    /// Add a user.
    ///
    /// Credentials are unique; adding a second user with an existing
    /// credential is rejected and returns `false`.
    pub fn add_user(&mut self, user: User) -> bool {
        if self.credential_index.contains_key(&user.credential) {
            tracing::warn!(
                credential = %user.credential,
                user = %user.name,
                "Duplicate credential ignored"
            );
            return false;
        }

        self.credential_index.insert(user.credential.clone(), self.users.len());
        self.users.push(user);
        true
    }

    /// Find a user by credential
    pub fn find_user_by_credential(&self, credential: &str) -> Option<&User> {
        self.credential_index.get(credential).and_then(|&idx| self.users.get(idx))
    }

    /// Find a group by name
    pub fn find_group(&self, name: &str) -> Option<&Arc<UserGroup>> {
        self.groups.iter().find(|group| group.name == name)
    }

    /// Members of a group, in insertion order
    pub fn members_of(&self, group_name: &str) -> Vec<&User> {
        self.users.iter().filter(|user| user.group_name() == group_name).collect()
    }

    /// All groups
    pub fn groups(&self) -> &[Arc<UserGroup>] {
        &self.groups
    }

    /// Number of users
    pub fn user_count(&self) -> usize {
        self.users.len()
    }
}
