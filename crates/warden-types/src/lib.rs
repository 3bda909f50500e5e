//! # warden-types: Core types for `Warden`
//!
//! This crate contains the data model shared across the `Warden` crates:
//! - Entity IDs ([`OrgId`], [`UserId`], [`RoleId`], [`GroupId`], [`PolicyId`])
//! - Identity records ([`Principal`], [`Role`], [`Group`], [`UserStatus`])
//! - Resource typing ([`ResourceCategory`], [`Classification`])
//! - Targeting ([`Scope`])
//! - Request context ([`Context`])
//!
//! Every type here is an immutable snapshot as far as the engine is concerned.
//! Creation and persistence belong to the administrative layer.

use std::fmt::{self, Display};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

mod identity;

pub use identity::{Group, Principal, Role};

/// Request context supplied by the caller: request metadata, resource
/// attributes, and any author-defined keys referenced by policy conditions.
pub type Context = serde_json::Map<String, serde_json::Value>;

// ============================================================================
// Entity IDs
// ============================================================================

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

string_id!(
    /// Identifier of an organization (tenant). Nothing crosses org boundaries.
    OrgId
);
string_id!(
    /// Identifier of a user principal.
    UserId
);
string_id!(
    /// Identifier of a role.
    RoleId
);
string_id!(
    /// Identifier of a group.
    GroupId
);
string_id!(
    /// Identifier of an attribute-based policy.
    PolicyId
);

// ============================================================================
// User Status
// ============================================================================

/// Account lifecycle status. Only [`UserStatus::Active`] principals can be
/// granted access.
///
/// There is no default: a serialized principal must state its status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    Active,
    Suspended,
    Locked,
    Pending,
}

impl UserStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            UserStatus::Active => "active",
            UserStatus::Suspended => "suspended",
            UserStatus::Locked => "locked",
            UserStatus::Pending => "pending",
        }
    }
}

impl Display for UserStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Resource Category
// ============================================================================

/// The kind of resource an action targets.
///
/// The category doubles as the prefix of permission strings
/// (`tool:execute`, `knowledge_base:search`, ...). Only [`Tool`],
/// [`KnowledgeBase`] and [`Database`] carry per-resource overlay grants.
///
/// [`Tool`]: ResourceCategory::Tool
/// [`KnowledgeBase`]: ResourceCategory::KnowledgeBase
/// [`Database`]: ResourceCategory::Database
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceCategory {
    #[serde(alias = "TOOL")]
    Tool,
    #[serde(alias = "KNOWLEDGE_BASE")]
    KnowledgeBase,
    #[serde(alias = "DATABASE")]
    Database,
    #[serde(alias = "AGENT")]
    Agent,
    #[serde(alias = "WORKFLOW")]
    Workflow,
    #[serde(alias = "DOCUMENT")]
    Document,
    #[serde(alias = "USER")]
    User,
    #[serde(alias = "ROLE")]
    Role,
    #[serde(alias = "GROUP")]
    Group,
    #[serde(alias = "POLICY")]
    Policy,
    #[serde(alias = "AUDIT_LOG")]
    AuditLog,
    #[serde(alias = "SYSTEM")]
    System,
}

impl ResourceCategory {
    /// All categories, in declaration order.
    pub const ALL: [ResourceCategory; 12] = [
        ResourceCategory::Tool,
        ResourceCategory::KnowledgeBase,
        ResourceCategory::Database,
        ResourceCategory::Agent,
        ResourceCategory::Workflow,
        ResourceCategory::Document,
        ResourceCategory::User,
        ResourceCategory::Role,
        ResourceCategory::Group,
        ResourceCategory::Policy,
        ResourceCategory::AuditLog,
        ResourceCategory::System,
    ];

    /// Permission-string prefix for this category.
    pub fn as_str(self) -> &'static str {
        match self {
            ResourceCategory::Tool => "tool",
            ResourceCategory::KnowledgeBase => "knowledge_base",
            ResourceCategory::Database => "database",
            ResourceCategory::Agent => "agent",
            ResourceCategory::Workflow => "workflow",
            ResourceCategory::Document => "document",
            ResourceCategory::User => "user",
            ResourceCategory::Role => "role",
            ResourceCategory::Group => "group",
            ResourceCategory::Policy => "policy",
            ResourceCategory::AuditLog => "audit_log",
            ResourceCategory::System => "system",
        }
    }

    /// Returns whether resources of this category can carry overlay grants.
    pub fn has_overlays(self) -> bool {
        matches!(
            self,
            ResourceCategory::Tool | ResourceCategory::KnowledgeBase | ResourceCategory::Database
        )
    }
}

impl Display for ResourceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown category or classification label.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind}: {value:?}")]
pub struct ParseLabelError {
    kind: &'static str,
    value: String,
}

impl FromStr for ResourceCategory {
    type Err = ParseLabelError;

    /// Accepts both `knowledge_base` and `KNOWLEDGE_BASE` spellings.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        ResourceCategory::ALL
            .into_iter()
            .find(|c| c.as_str() == normalized)
            .ok_or_else(|| ParseLabelError {
                kind: "resource category",
                value: s.to_string(),
            })
    }
}

// ============================================================================
// Classification
// ============================================================================

/// Data sensitivity label, ordered from least to most sensitive:
/// `Public < Internal < Confidential < Restricted`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    #[default]
    Public,
    Internal,
    Confidential,
    Restricted,
}

impl Classification {
    pub fn as_str(self) -> &'static str {
        match self {
            Classification::Public => "public",
            Classification::Internal => "internal",
            Classification::Confidential => "confidential",
            Classification::Restricted => "restricted",
        }
    }

    /// Parses a label, mapping anything unrecognized to
    /// [`Classification::Restricted`] so unknown labels can never widen access.
    pub fn parse_or_restricted(label: &str) -> Self {
        label.parse().unwrap_or(Classification::Restricted)
    }
}

impl Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Classification {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "public" => Ok(Classification::Public),
            "internal" => Ok(Classification::Internal),
            "confidential" => Ok(Classification::Confidential),
            "restricted" => Ok(Classification::Restricted),
            _ => Err(ParseLabelError {
                kind: "classification",
                value: s.to_string(),
            }),
        }
    }
}

// ============================================================================
// Scope
// ============================================================================

/// The set of principals a policy or overlay grant targets.
///
/// A principal is included when its id is listed, or when any of its roles or
/// groups is listed. What an *empty* scope means is up to the caller: policies
/// treat it as "everyone", overlay grants as "nobody".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scope {
    pub user_ids: Vec<UserId>,
    pub role_ids: Vec<RoleId>,
    pub group_ids: Vec<GroupId>,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(mut self, id: impl Into<UserId>) -> Self {
        self.user_ids.push(id.into());
        self
    }

    pub fn with_role(mut self, id: impl Into<RoleId>) -> Self {
        self.role_ids.push(id.into());
        self
    }

    pub fn with_group(mut self, id: impl Into<GroupId>) -> Self {
        self.group_ids.push(id.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.user_ids.is_empty() && self.role_ids.is_empty() && self.group_ids.is_empty()
    }

    /// Returns whether the principal is listed directly, through one of its
    /// roles, or through one of its groups. Always false for an empty scope.
    pub fn includes(&self, principal: &Principal) -> bool {
        self.user_ids.contains(&principal.id)
            || principal.role_ids.iter().any(|r| self.role_ids.contains(r))
            || principal.group_ids.iter().any(|g| self.group_ids.contains(g))
    }
}

#[cfg(test)]
mod tests;
