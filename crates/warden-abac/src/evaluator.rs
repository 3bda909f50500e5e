//! ABAC policy evaluation engine.
//!
//! Conditions resolve their attribute and apply their operator; rules combine
//! conditions with `AND`/`OR`; a policy matches when all of its rules hold.
//! [`evaluate`] scans an ordered set of policies for the first matching deny.

use tracing::debug;
use warden_types::PolicyId;

use crate::attributes::AttributeResolver;
use crate::condition::{Condition, Operator};
use crate::policy::{Effect, Policy, Rule, RuleLogic};

// ============================================================================
// Decision
// ============================================================================

/// The result of evaluating a request against a set of applicable policies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    /// `Deny` when a deny policy matched, `Allow` otherwise.
    pub effect: Effect,
    /// The deny policy that matched, if any.
    pub matched_policy: Option<PolicyId>,
    /// Name of the matched deny policy, for denial reasons.
    pub matched_policy_name: Option<String>,
    /// Allow policies whose rules held. Informational only.
    pub matched_allows: Vec<PolicyId>,
    /// Human-readable explanation of why this decision was made.
    pub reason: String,
}

// ============================================================================
// Public API
// ============================================================================

/// Evaluates `policies` in the order given and returns on the first matching
/// deny.
///
/// Matching allow policies never grant anything by themselves; they are
/// recorded so callers can explain a decision. The caller is expected to
/// pass the policies already sorted by priority (see
/// [`crate::matcher::select_policies`]).
///
/// # Postcondition
///
/// Always returns a `Decision` -- never panics, whatever the conditions contain.
pub fn evaluate(policies: &[&Policy], resolver: &AttributeResolver<'_>) -> Decision {
    let mut matched_allows = Vec::new();

    for policy in policies {
        if !policy_matches(policy, resolver) {
            continue;
        }

        match policy.effect {
            Effect::Deny => {
                return Decision {
                    effect: Effect::Deny,
                    matched_policy: Some(policy.id.clone()),
                    matched_policy_name: Some(policy.name.clone()),
                    matched_allows,
                    reason: format!(
                        "Matched deny policy '{}' (priority {})",
                        policy.name, policy.priority
                    ),
                };
            }
            Effect::Allow => matched_allows.push(policy.id.clone()),
        }
    }

    Decision {
        effect: Effect::Allow,
        matched_policy: None,
        matched_policy_name: None,
        reason: format!(
            "No deny policy matched ({} allow policies matched)",
            matched_allows.len()
        ),
        matched_allows,
    }
}

/// Returns whether every rule of `policy` holds. A policy without rules
/// matches unconditionally.
pub fn policy_matches(policy: &Policy, resolver: &AttributeResolver<'_>) -> bool {
    policy.rules.iter().all(|rule| evaluate_rule(rule, resolver))
}

/// Evaluates one rule. Both logics are vacuously true on an empty list.
pub fn evaluate_rule(rule: &Rule, resolver: &AttributeResolver<'_>) -> bool {
    if rule.conditions.is_empty() {
        return true;
    }

    match rule.logic {
        RuleLogic::And => rule
            .conditions
            .iter()
            .all(|c| evaluate_condition(c, resolver)),
        RuleLogic::Or => rule
            .conditions
            .iter()
            .any(|c| evaluate_condition(c, resolver)),
    }
}

/// Evaluates one condition, failing closed.
///
/// An absent attribute only satisfies `eq`/`is` against `null`. Comparison
/// errors are logged and treated as a non-match.
pub fn evaluate_condition(condition: &Condition, resolver: &AttributeResolver<'_>) -> bool {
    let Some(actual) = resolver.resolve(&condition.attribute) else {
        return condition.operator == Operator::Eq && condition.value.is_null();
    };

    match condition.operator.apply(&actual, &condition.value) {
        Ok(matched) => matched,
        Err(error) => {
            debug!(
                attribute = %condition.attribute,
                operator = %condition.operator,
                %error,
                "Condition comparison failed; treating as not matched"
            );
            false
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
