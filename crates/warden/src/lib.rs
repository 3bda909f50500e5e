//! # Warden
//!
//! Access-decision engine for multi-tenant platforms.
//!
//! Warden answers one question: may this principal perform this action on
//! this resource, right now? It combines three permission sources:
//!
//! - **Roles** - permission strings aggregated over cycle-safe inheritance
//! - **Policies** - attribute-based deny rules over user, request and time
//! - **Overlays** - per-resource grants restricted by capability, hour, day,
//!   IP and data classification
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        AccessEngine                          │
//! │  ┌────────┐   ┌──────────┐   ┌──────────┐   ┌─────────────┐  │
//! │  │ Status │ → │   RBAC   │ → │   ABAC   │ → │  Overlays   │  │
//! │  │        │   │(baseline)│   │ (deny)   │   │(per resource│  │
//! │  └────────┘   └──────────┘   └──────────┘   └─────────────┘  │
//! └──────────────────────────────┬───────────────────────────────┘
//!                                │ reads
//!                         ┌──────┴───────┐
//!                         │StateProvider │
//!                         └──────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```
//! use warden::{AccessEngine, EngineConfig, Snapshot};
//! use warden::types::{Principal, ResourceCategory, Role};
//!
//! let state = Snapshot::new()
//!     .with_role(Role::new("operator", "acme", "Operator").with_permission("tool:*"));
//! let engine = AccessEngine::new(state, EngineConfig::default());
//!
//! let alice = Principal::new("alice", "acme").with_role("operator");
//! let decision = engine.evaluate_access(&alice, "execute", ResourceCategory::Tool, None, None);
//! assert!(decision.is_allowed());
//!
//! let bob = Principal::new("bob", "acme").with_permission("tool:view");
//! let (allowed, reason) = engine
//!     .evaluate_access(&bob, "execute", ResourceCategory::Tool, None, None)
//!     .into_parts();
//! assert!(!allowed);
//! assert_eq!(reason.as_deref(), Some("Missing permission: tool:execute"));
//! ```

mod decision;
mod engine;
mod state;


pub use decision::{Decision, DenialReason};
pub use engine::{AccessEngine, AccessRequest, DEFAULT_SYSTEM_ADMIN_PERMISSION, EngineConfig};
pub use state::{Snapshot, SnapshotError, StateProvider};

/// Re-export of the shared data model.
pub use warden_types as types;

pub use warden_abac as abac;
pub use warden_overlay as overlay;
pub use warden_rbac as rbac;
