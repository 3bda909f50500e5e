//! Kani proofs for ABAC policy evaluation
//!
//! These proofs verify the fail-closed and ordering properties of the
//! evaluator using bounded model checking.
//!
//! **Proof Count**: 4 proofs
//!
//! Run with: `cargo kani --harness verify_*`

use chrono::{TimeZone, Utc};
use serde_json::Value;
use warden_types::{Context, Principal, ResourceCategory};

use crate::attributes::{AttributeResolver, EnvironmentAttributes};
use crate::condition::{Condition, Operator};
use crate::evaluator::{self, evaluate_condition};
use crate::policy::{Effect, Policy, Rule};

fn wednesday_morning() -> EnvironmentAttributes {
    let ts = Utc
        .timestamp_opt(1_736_330_400, 0)
        .single()
        .unwrap_or_default();
    EnvironmentAttributes::from_timestamp(ts)
}

/// Proof #1: Evaluation determinism
///
/// **Property**: Same inputs always produce the same decision
#[kani::proof]
#[kani::unwind(10)]
fn verify_policy_evaluation_determinism() {
    let policy = Policy::deny_outside_business_hours("bh", "org", ResourceCategory::Tool);
    let principal = Principal::new("u", "org");
    let context = Context::new();
    let env = wednesday_morning();
    let resolver = AttributeResolver::new(&principal, &context, &env);

    let first = evaluator::evaluate(&[&policy], &resolver);
    let second = evaluator::evaluate(&[&policy], &resolver);

    assert_eq!(first, second);
}

/// Proof #2: First matching deny wins
///
/// **Property**: With two matching deny policies, the one evaluated first is
/// reported regardless of the allow policies around it
#[kani::proof]
#[kani::unwind(10)]
fn verify_first_deny_wins() {
    let allow = Policy::new("allow", "org", "allow", ResourceCategory::Tool, Effect::Allow);
    let first = Policy::new("first", "org", "first", ResourceCategory::Tool, Effect::Deny);
    let second = Policy::new("second", "org", "second", ResourceCategory::Tool, Effect::Deny);
    let principal = Principal::new("u", "org");
    let context = Context::new();
    let env = wednesday_morning();
    let resolver = AttributeResolver::new(&principal, &context, &env);

    let decision = evaluator::evaluate(&[&allow, &first, &second], &resolver);

    assert_eq!(decision.effect, Effect::Deny);
    assert_eq!(decision.matched_policy_name.as_deref(), Some("first"));
}

/// Proof #3: Absent attributes fail closed
///
/// **Property**: An absent attribute satisfies no operator except
/// `eq` against `null`, for any operator
#[kani::proof]
#[kani::unwind(10)]
fn verify_absent_attribute_fails_closed() {
    let operators = [
        Operator::Ne,
        Operator::In,
        Operator::NotIn,
        Operator::Gt,
        Operator::Lt,
        Operator::Contains,
        Operator::NotContains,
        Operator::IsEmpty,
        Operator::IsNotEmpty,
    ];
    let index: usize = kani::any();
    kani::assume(index < operators.len());

    let principal = Principal::new("u", "org");
    let context = Context::new();
    let env = wednesday_morning();
    let resolver = AttributeResolver::new(&principal, &context, &env);
    let condition = Condition::new("profile.missing", operators[index], Value::Null);

    assert!(!evaluate_condition(&condition, &resolver));
}

/// Proof #4: Vacuous rules
///
/// **Property**: A rule without conditions holds under both logics
#[kani::proof]
#[kani::unwind(4)]
fn verify_empty_rule_holds() {
    let principal = Principal::new("u", "org");
    let context = Context::new();
    let env = wednesday_morning();
    let resolver = AttributeResolver::new(&principal, &context, &env);

    assert!(evaluator::evaluate_rule(&Rule::all(Vec::new()), &resolver));
    assert!(evaluator::evaluate_rule(&Rule::any(Vec::new()), &resolver));
}
