//! State access for the engine.
//!
//! The engine never owns or mutates roles, policies or overlays. It reads
//! them through a [`StateProvider`], which is simply the union of the lookup
//! traits each component crate defines.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use warden_abac::{Policy, PolicySource};
use warden_overlay::{OverlayPermission, OverlaySource};
use warden_rbac::RoleLookup;
use warden_types::{Group, GroupId, OrgId, Principal, ResourceCategory, Role, RoleId, UserId};

/// Read access to everything a decision consults.
pub trait StateProvider: RoleLookup + PolicySource + OverlaySource {}

impl<T: RoleLookup + PolicySource + OverlaySource + ?Sized> StateProvider for T {}

/// Error type for loading a [`Snapshot`].
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to read snapshot {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid snapshot: {0}")]
    Parse(#[from] serde_json::Error),
}

// ============================================================================
// Snapshot
// ============================================================================

/// Serialized layout of a snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
struct SnapshotData {
    users: Vec<Principal>,
    roles: Vec<Role>,
    groups: Vec<Group>,
    policies: Vec<Policy>,
    overlays: Vec<OverlayPermission>,
}

/// An immutable, in-memory copy of access-control state.
///
/// Deserializes from JSON of the form
/// `{"users": [...], "roles": [...], "groups": [...], "policies": [...], "overlays": [...]}`,
/// every key optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "SnapshotData", into = "SnapshotData")]
pub struct Snapshot {
    users: HashMap<UserId, Principal>,
    roles: HashMap<RoleId, Role>,
    groups: HashMap<GroupId, Group>,
    policies: Vec<Policy>,
    overlays: Vec<OverlayPermission>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json_str(json: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, SnapshotError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| SnapshotError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn with_user(mut self, user: Principal) -> Self {
        self.users.insert(user.id.clone(), user);
        self
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.roles.insert(role.id.clone(), role);
        self
    }

    pub fn with_group(mut self, group: Group) -> Self {
        self.groups.insert(group.id.clone(), group);
        self
    }

    pub fn with_policy(mut self, policy: Policy) -> Self {
        self.policies.push(policy);
        self
    }

    pub fn with_overlay(mut self, overlay: impl Into<OverlayPermission>) -> Self {
        self.overlays.push(overlay.into());
        self
    }

    pub fn user(&self, id: &UserId) -> Option<&Principal> {
        self.users.get(id)
    }

    /// Every stored policy, in storage order.
    pub fn all_policies(&self) -> &[Policy] {
        &self.policies
    }
}

impl From<SnapshotData> for Snapshot {
    fn from(data: SnapshotData) -> Self {
        Self {
            users: data.users.into_iter().map(|u| (u.id.clone(), u)).collect(),
            roles: data.roles.into_iter().map(|r| (r.id.clone(), r)).collect(),
            groups: data.groups.into_iter().map(|g| (g.id.clone(), g)).collect(),
            policies: data.policies,
            overlays: data.overlays,
        }
    }
}

impl From<Snapshot> for SnapshotData {
    fn from(snapshot: Snapshot) -> Self {
        let mut users: Vec<Principal> = snapshot.users.into_values().collect();
        let mut roles: Vec<Role> = snapshot.roles.into_values().collect();
        let mut groups: Vec<Group> = snapshot.groups.into_values().collect();
        users.sort_by(|a, b| a.id.cmp(&b.id));
        roles.sort_by(|a, b| a.id.cmp(&b.id));
        groups.sort_by(|a, b| a.id.cmp(&b.id));

        Self {
            users,
            roles,
            groups,
            policies: snapshot.policies,
            overlays: snapshot.overlays,
        }
    }
}

impl RoleLookup for Snapshot {
    fn role(&self, id: &RoleId) -> Option<&Role> {
        self.roles.get(id)
    }

    fn group(&self, id: &GroupId) -> Option<&Group> {
        self.groups.get(id)
    }
}

impl PolicySource for Snapshot {
    fn policies(&self, org_id: &OrgId) -> Vec<&Policy> {
        self.policies.policies(org_id)
    }
}

impl OverlaySource for Snapshot {
    fn overlays(
        &self,
        org_id: &OrgId,
        category: ResourceCategory,
        resource_id: &str,
    ) -> Vec<&OverlayPermission> {
        self.overlays.overlays(org_id, category, resource_id)
    }
}
