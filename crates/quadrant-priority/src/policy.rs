//! Role resolution and the approval privilege boundary.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use quadrant_models::{ChangeStatus, UserId};
use quadrant_persistence::atomic::{atomic_write_json, read_json_optional};
use serde::{Deserialize, Serialize};

use crate::error::{PriorityError, Result};

/// Organisational role of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    ProjectManager,
    Member,
    Viewer,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Admin, Role::ProjectManager, Role::Member, Role::Viewer];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::ProjectManager => "PROJECT_MANAGER",
            Role::Member => "MEMBER",
            Role::Viewer => "VIEWER",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = PriorityError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_uppercase().replace('-', "_");
        Role::ALL
            .into_iter()
            .find(|r| r.as_str() == normalized)
            .ok_or_else(|| PriorityError::Validation(format!("unknown role: {}", s)))
    }
}

/// Looks up a user's role. Unknown users have none.
pub trait RoleResolver: Send + Sync {
    fn role_of(&self, user: &UserId) -> Option<Role>;
}

/// Fixed user-to-role table, persisted as a JSON object.
///
/// ```json
/// { "user-alice": "ADMIN", "user-bob": "MEMBER" }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StaticRoles {
    roles: HashMap<UserId, Role>,
}

impl StaticRoles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_role(mut self, user: impl Into<UserId>, role: Role) -> Self {
        self.roles.insert(user.into(), role);
        self
    }

    pub fn assign(&mut self, user: UserId, role: Role) -> Option<Role> {
        self.roles.insert(user, role)
    }

    /// Loads the table from `path`; a missing file is an empty table.
    pub fn load(path: &Path) -> Result<Self> {
        Ok(read_json_optional(path)?.unwrap_or_default())
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        Ok(atomic_write_json(path, self)?)
    }
}

impl RoleResolver for StaticRoles {
    fn role_of(&self, user: &UserId) -> Option<Role> {
        self.roles.get(user).copied()
    }
}

/// Decides who may approve priority changes.
#[derive(Clone)]
pub struct ApprovalPolicy {
    privileged: HashSet<Role>,
    resolver: Arc<dyn RoleResolver>,
}

impl ApprovalPolicy {
    /// Roles that bypass review by default.
    pub const DEFAULT_PRIVILEGED: [Role; 2] = [Role::Admin, Role::ProjectManager];

    pub fn new(resolver: Arc<dyn RoleResolver>) -> Self {
        Self {
            privileged: Self::DEFAULT_PRIVILEGED.into_iter().collect(),
            resolver,
        }
    }

    pub fn with_privileged_roles(mut self, roles: impl IntoIterator<Item = Role>) -> Self {
        self.privileged = roles.into_iter().collect();
        self
    }

    pub fn role_of(&self, user: &UserId) -> Option<Role> {
        self.resolver.role_of(user)
    }

    pub fn is_privileged(&self, user: &UserId) -> bool {
        self.role_of(user)
            .is_some_and(|role| self.privileged.contains(&role))
    }

    /// Status a new change record gets for this requester.
    pub fn initial_status(&self, requester: &UserId) -> ChangeStatus {
        if self.is_privileged(requester) {
            ChangeStatus::Approved
        } else {
            ChangeStatus::Pending
        }
    }
}

impl fmt::Debug for ApprovalPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApprovalPolicy")
            .field("privileged", &self.privileged)
            .finish_non_exhaustive()
    }
}
