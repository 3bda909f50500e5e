//! # warden-abac: Attribute-Based Access Control
//!
//! Context-aware deny policies evaluated on top of role-based permissions.
//! A permission grant says a principal *may* act; ABAC policies say when it
//! may not.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  Access Request                              │
//! │  (Principal + Category/Action + Context)     │
//! └─────────────────┬───────────────────────────┘
//!                   │
//!                   ▼
//! ┌─────────────────────────────────────────────┐
//! │  Matcher                                     │
//! │  ├─ Active, same org, same category          │
//! │  ├─ Action / resource / principal narrowing  │
//! │  └─ Sort ascending by priority               │
//! └─────────────────┬───────────────────────────┘
//!                   │
//!                   ▼
//! ┌─────────────────────────────────────────────┐
//! │  Evaluator                                   │
//! │  ├─ Resolve attributes (user, context, time) │
//! │  ├─ Rules: AND / OR over conditions          │
//! │  └─ First matching deny wins                 │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Examples
//!
//! ```
//! use warden_abac::{AttributeResolver, Effect, EnvironmentAttributes, Policy, PolicyTarget};
//! use warden_abac::{evaluate, select_policies};
//! use warden_types::{Context, Principal, ResourceCategory};
//! use chrono::{TimeZone, Utc};
//! use serde_json::json;
//!
//! let policies = vec![Policy::deny_from_ips(
//!     "block-office",
//!     "acme",
//!     ResourceCategory::Tool,
//!     &["203.0.113.7"],
//! )];
//!
//! let alice = Principal::new("alice", "acme");
//! let mut context = Context::new();
//! context.insert("ip_address".into(), json!("203.0.113.7"));
//! let now = Utc.with_ymd_and_hms(2025, 1, 8, 10, 0, 0).unwrap();
//! let env = EnvironmentAttributes::from_timestamp(now);
//!
//! let target = PolicyTarget::new(&alice, ResourceCategory::Tool, "execute");
//! let applicable = select_policies(&policies, &target);
//! let decision = evaluate(&applicable, &AttributeResolver::new(&alice, &context, &env));
//!
//! assert_eq!(decision.effect, Effect::Deny);
//! ```

pub mod attributes;
pub mod condition;
pub mod evaluator;
pub mod lint;
pub mod matcher;
pub mod policy;

// Kani proofs for bounded model checking
#[cfg(kani)]
mod kani_proofs;


pub use attributes::{AttributeResolver, BusinessHours, EnvironmentAttributes, KNOWN_ROOTS};
pub use condition::{Condition, ConditionError, Operator};
pub use evaluator::{Decision, evaluate, evaluate_condition, evaluate_rule, policy_matches};
pub use lint::{LintFinding, Severity, lint_policies, lint_policy};
pub use matcher::{PolicySource, PolicyTarget, applies_to, select_policies};
pub use policy::{Effect, Policy, Rule, RuleLogic};
