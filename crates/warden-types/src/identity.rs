//! Identity records: principals, roles and groups.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::{GroupId, OrgId, RoleId, UserId, UserStatus};

// ============================================================================
// Principal
// ============================================================================

/// The user an access request is evaluated for.
///
/// Role and group lists keep the order the administrative layer assigned them
/// in; permission aggregation does not depend on that order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Principal {
    pub id: UserId,
    pub org_id: OrgId,
    pub status: UserStatus,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role_ids: Vec<RoleId>,
    #[serde(default)]
    pub group_ids: Vec<GroupId>,
    /// Directly granted permission strings (`category:action`).
    #[serde(default)]
    pub permissions: BTreeSet<String>,
    /// Free-form profile attributes (department, title, clearance, ...).
    #[serde(default)]
    pub profile: serde_json::Map<String, serde_json::Value>,
}

impl Principal {
    /// Creates an active principal with no roles, groups or permissions.
    pub fn new(id: impl Into<UserId>, org_id: impl Into<OrgId>) -> Self {
        Self {
            id: id.into(),
            org_id: org_id.into(),
            status: UserStatus::Active,
            username: None,
            email: None,
            role_ids: Vec::new(),
            group_ids: Vec::new(),
            permissions: BTreeSet::new(),
            profile: serde_json::Map::new(),
        }
    }

    pub fn with_status(mut self, status: UserStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_username(mut self, username: &str) -> Self {
        self.username = Some(username.to_string());
        self
    }

    pub fn with_email(mut self, email: &str) -> Self {
        self.email = Some(email.to_string());
        self
    }

    /// Assigns a role. Assigning the same role twice is a no-op.
    pub fn with_role(mut self, role_id: impl Into<RoleId>) -> Self {
        let role_id = role_id.into();
        if !self.role_ids.contains(&role_id) {
            self.role_ids.push(role_id);
        }
        self
    }

    /// Adds the principal to a group. Adding the same group twice is a no-op.
    pub fn with_group(mut self, group_id: impl Into<GroupId>) -> Self {
        let group_id = group_id.into();
        if !self.group_ids.contains(&group_id) {
            self.group_ids.push(group_id);
        }
        self
    }

    pub fn with_permission(mut self, permission: &str) -> Self {
        self.permissions.insert(permission.to_string());
        self
    }

    pub fn with_profile_attr(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.profile.insert(key.to_string(), value.into());
        self
    }

    pub fn is_active(&self) -> bool {
        self.status == UserStatus::Active
    }
}

// ============================================================================
// Role
// ============================================================================

/// A named bundle of permission strings, optionally inheriting from a parent.
///
/// Parent links are not validated when roles are stored, so a chain may
/// dangle or loop back on itself. Readers must guard against both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: RoleId,
    pub org_id: OrgId,
    pub name: String,
    #[serde(default)]
    pub permissions: BTreeSet<String>,
    #[serde(default)]
    pub parent_id: Option<RoleId>,
}

impl Role {
    pub fn new(id: impl Into<RoleId>, org_id: impl Into<OrgId>, name: &str) -> Self {
        Self {
            id: id.into(),
            org_id: org_id.into(),
            name: name.to_string(),
            permissions: BTreeSet::new(),
            parent_id: None,
        }
    }

    pub fn with_permission(mut self, permission: &str) -> Self {
        self.permissions.insert(permission.to_string());
        self
    }

    pub fn with_parent(mut self, parent_id: impl Into<RoleId>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }
}

// ============================================================================
// Group
// ============================================================================

/// A set of roles granted to every member. Groups do not nest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub org_id: OrgId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub role_ids: Vec<RoleId>,
}

impl Group {
    pub fn new(id: impl Into<GroupId>, org_id: impl Into<OrgId>, name: &str) -> Self {
        Self {
            id: id.into(),
            org_id: org_id.into(),
            name: name.to_string(),
            role_ids: Vec::new(),
        }
    }

    pub fn with_role(mut self, role_id: impl Into<RoleId>) -> Self {
        self.role_ids.push(role_id.into());
        self
    }
}
