//! ABAC policy definitions.
//!
//! A policy targets one resource category, optionally narrowed to specific
//! actions, resource ids and principals. It carries an ordered list of rules;
//! the policy matches a request when every rule holds.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use warden_types::{OrgId, PolicyId, ResourceCategory, Scope};

use crate::condition::{Condition, Operator};

// ============================================================================
// Effect
// ============================================================================

/// The effect of a matching policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Effect {
    /// Grant access.
    Allow,
    /// Deny access.
    Deny,
}

impl Default for Effect {
    /// Defaults to `Deny` (safe default: deny unless explicitly allowed).
    fn default() -> Self {
        Self::Deny
    }
}

// ============================================================================
// Rule
// ============================================================================

/// How the conditions of a rule combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RuleLogic {
    #[default]
    #[serde(rename = "AND", alias = "and")]
    And,
    #[serde(rename = "OR", alias = "or")]
    Or,
}

/// A boolean combination of conditions.
///
/// A rule with no conditions holds under both `AND` and `OR`. A policy whose
/// rules all have empty condition lists therefore applies unconditionally to
/// everyone in its scope; [`crate::lint`] reports such rules.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    #[serde(default)]
    pub logic: RuleLogic,
    #[serde(default)]
    pub conditions: Vec<Condition>,
}

impl Rule {
    /// A rule requiring every condition.
    pub fn all(conditions: Vec<Condition>) -> Self {
        Self {
            logic: RuleLogic::And,
            conditions,
        }
    }

    /// A rule requiring at least one condition.
    pub fn any(conditions: Vec<Condition>) -> Self {
        Self {
            logic: RuleLogic::Or,
            conditions,
        }
    }
}

// ============================================================================
// Policy
// ============================================================================

/// An attribute-based access control policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Policy {
    pub id: PolicyId,
    pub org_id: OrgId,
    /// Human-readable name, quoted in denial reasons.
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub resource_category: ResourceCategory,
    /// Actions this policy covers. Empty covers every action.
    #[serde(default)]
    pub actions: Vec<String>,
    /// Resource ids this policy covers. Empty covers every resource.
    #[serde(default)]
    pub resource_ids: Vec<String>,
    /// Principals this policy covers. Empty covers everyone.
    #[serde(default)]
    pub target: Scope,
    #[serde(default)]
    pub rules: Vec<Rule>,
    #[serde(default)]
    pub effect: Effect,
    /// Evaluation order. Lower values are evaluated first.
    #[serde(default)]
    pub priority: i32,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl Policy {
    /// Creates an active policy with no narrowing and no rules.
    pub fn new(
        id: impl Into<PolicyId>,
        org_id: impl Into<OrgId>,
        name: &str,
        resource_category: ResourceCategory,
        effect: Effect,
    ) -> Self {
        Self {
            id: id.into(),
            org_id: org_id.into(),
            name: name.to_string(),
            description: None,
            resource_category,
            actions: Vec::new(),
            resource_ids: Vec::new(),
            target: Scope::default(),
            rules: Vec::new(),
            effect,
            priority: 0,
            is_active: true,
        }
    }

    pub fn for_action(mut self, action: &str) -> Self {
        self.actions.push(action.to_string());
        self
    }

    pub fn for_resource(mut self, resource_id: &str) -> Self {
        self.resource_ids.push(resource_id.to_string());
        self
    }

    pub fn targeting(mut self, target: Scope) -> Self {
        self.target = target;
        self
    }

    /// Adds a rule to the policy (builder pattern).
    pub fn with_rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }

    /// Returns a policy denying `category` access outside business hours.
    pub fn deny_outside_business_hours(
        id: impl Into<PolicyId>,
        org_id: impl Into<OrgId>,
        category: ResourceCategory,
    ) -> Self {
        Self::new(id, org_id, "deny-outside-business-hours", category, Effect::Deny)
            .with_description("Blocks access outside 09:00-17:00 UTC on weekdays")
            .with_rule(Rule::all(vec![Condition::new(
                "time.is_business_hours",
                Operator::Eq,
                false,
            )]))
    }

    /// Returns a policy denying `category` access from the listed addresses.
    ///
    /// The address is read from `context.ip_address` or `request.ip`, matching
    /// what overlay checks accept.
    pub fn deny_from_ips(
        id: impl Into<PolicyId>,
        org_id: impl Into<OrgId>,
        category: ResourceCategory,
        ips: &[&str],
    ) -> Self {
        let blocked: Vec<Value> = ips.iter().map(|ip| Value::from(*ip)).collect();
        Self::new(id, org_id, "deny-blocked-ips", category, Effect::Deny)
            .with_description("Blocks requests from listed IP addresses")
            .with_rule(Rule::any(vec![
                Condition::new("context.ip_address", Operator::In, blocked.clone()),
                Condition::new("request.ip", Operator::In, blocked),
            ]))
    }
}

// ============================================================================
// Tests
// ============================================================================
