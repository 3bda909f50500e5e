//! # warden-rbac: Role-Based Access Control
//!
//! Computes a principal's effective permissions and performs the baseline
//! `category:action` check that every access decision starts with.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  Principal                                   │
//! │  (direct grants + role ids + group ids)      │
//! └─────────────────┬───────────────────────────┘
//!                   │
//!                   ▼
//! ┌─────────────────────────────────────────────┐
//! │  Aggregator                                  │
//! │  ├─ Direct permission strings                │
//! │  ├─ Assigned roles + parent chain (visited)  │
//! │  └─ Roles attached to assigned groups        │
//! └─────────────────┬───────────────────────────┘
//!                   │
//!                   ▼
//! ┌─────────────────────────────────────────────┐
//! │  PermissionSet                               │
//! │  - exact `category:action`                   │
//! │  - category wildcard `category:*`            │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Role Graphs
//!
//! Parent links are plain ids and are never validated on write, so the
//! aggregator tolerates both dangling parents and cycles. Each call keeps its
//! own visited set; no state survives between calls.
//!
//! ## Examples
//!
//! ```
//! use std::collections::HashMap;
//! use warden_rbac::{RoleLookup, aggregate_permissions};
//! use warden_types::{Group, GroupId, Principal, ResourceCategory, Role, RoleId};
//!
//! struct Tables {
//!     roles: HashMap<RoleId, Role>,
//! }
//!
//! impl RoleLookup for Tables {
//!     fn role(&self, id: &RoleId) -> Option<&Role> {
//!         self.roles.get(id)
//!     }
//!     fn group(&self, _id: &GroupId) -> Option<&Group> {
//!         None
//!     }
//! }
//!
//! let viewer = Role::new("viewer", "acme", "Viewer").with_permission("tool:view");
//! let operator = Role::new("operator", "acme", "Operator")
//!     .with_permission("tool:execute")
//!     .with_parent("viewer");
//!
//! let tables = Tables {
//!     roles: HashMap::from([(viewer.id.clone(), viewer), (operator.id.clone(), operator)]),
//! };
//!
//! let alice = Principal::new("alice", "acme").with_role("operator");
//! let perms = aggregate_permissions(&alice, &tables);
//!
//! assert!(perms.allows(ResourceCategory::Tool, "view"));
//! assert!(perms.allows(ResourceCategory::Tool, "execute"));
//! assert!(!perms.allows(ResourceCategory::Tool, "delete"));
//! ```

pub mod aggregate;
pub mod permissions;

pub use aggregate::{RoleLookup, aggregate_permissions};
pub use permissions::{Permission, PermissionSet, WILDCARD_ACTION};

// Kani proofs for bounded model checking
#[cfg(kani)]
mod kani_proofs;

#[cfg(test)]
mod tests;
