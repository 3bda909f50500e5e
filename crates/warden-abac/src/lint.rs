//! Static checks over policy definitions.
//!
//! Evaluation never fails on a bad policy; it fails closed instead. These
//! checks surface the mistakes that would otherwise only show up as
//! unexpected decisions.

use std::fmt;

use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use warden_types::PolicyId;

use crate::attributes::KNOWN_ROOTS;
use crate::condition::Operator;
use crate::policy::{Effect, Policy};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Note,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Note => "note",
            Severity::Warning => "warning",
            Severity::Error => "error",
        })
    }
}

/// One problem found in a policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LintFinding {
    pub policy_id: PolicyId,
    pub severity: Severity,
    pub message: String,
}

impl fmt::Display for LintFinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: [{}] {}", self.severity, self.policy_id, self.message)
    }
}

/// Checks every policy and returns the findings, most severe first.
pub fn lint_policies<'a>(policies: impl IntoIterator<Item = &'a Policy>) -> Vec<LintFinding> {
    let mut findings: Vec<LintFinding> = policies.into_iter().flat_map(lint_policy).collect();
    findings.sort_by(|a, b| b.severity.cmp(&a.severity));
    findings
}

/// Checks one policy.
pub fn lint_policy(policy: &Policy) -> Vec<LintFinding> {
    let mut findings = Vec::new();
    let mut report = |severity, message: String| {
        findings.push(LintFinding {
            policy_id: policy.id.clone(),
            severity,
            message,
        });
    };

    if policy.rules.is_empty() {
        let severity = match policy.effect {
            Effect::Deny => Severity::Warning,
            Effect::Allow => Severity::Note,
        };
        report(
            severity,
            format!("policy '{}' has no rules and matches every request it targets", policy.name),
        );
    }

    for (index, rule) in policy.rules.iter().enumerate() {
        if rule.conditions.is_empty() {
            report(
                Severity::Warning,
                format!("rule {index} has no conditions and always holds"),
            );
        }

        for condition in &rule.conditions {
            let root = condition.attribute.split('.').next().unwrap_or_default();
            if !KNOWN_ROOTS.contains(&root) {
                report(
                    Severity::Note,
                    format!(
                        "attribute '{}' has no known namespace \
                         and is read from the request context",
                        condition.attribute
                    ),
                );
            }

            match (condition.operator, &condition.value) {
                (Operator::Regex, Value::String(pattern)) => {
                    if let Err(e) = Regex::new(pattern) {
                        report(
                            Severity::Error,
                            format!("invalid regex for '{}': {e}", condition.attribute),
                        );
                    }
                }
                (Operator::Regex, other) => report(
                    Severity::Error,
                    format!("regex target for '{}' is not a string: {other}", condition.attribute),
                ),
                (Operator::Between, Value::Array(bounds)) if bounds.len() == 2 => {}
                (Operator::Between, other) => report(
                    Severity::Error,
                    format!(
                        "'between' on '{}' needs a [low, high] array, got {other}",
                        condition.attribute
                    ),
                ),
                (Operator::In | Operator::NotIn, Value::Array(_) | Value::Object(_)) => {}
                (Operator::In | Operator::NotIn, other) => report(
                    Severity::Note,
                    format!(
                        "'{}' on '{}' uses a scalar target {other}; \
                         membership falls back to substring",
                        condition.operator, condition.attribute
                    ),
                ),
                _ => {}
            }
        }
    }

    findings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::Condition;
    use crate::policy::Rule;
    use serde_json::json;
    use warden_types::ResourceCategory;

    fn policy() -> Policy {
        Policy::new("p", "acme", "p", ResourceCategory::Tool, Effect::Deny)
    }

    fn severities(policy: &Policy) -> Vec<Severity> {
        lint_policy(policy).into_iter().map(|f| f.severity).collect()
    }

    #[test]
    fn clean_policy_has_no_findings() {
        let p = Policy::deny_outside_business_hours("bh", "acme", ResourceCategory::Tool);
        assert!(lint_policy(&p).is_empty());
    }

    #[test]
    fn ruleless_deny_warns() {
        assert_eq!(severities(&policy()), vec![Severity::Warning]);
    }

    #[test]
    fn empty_rule_warns() {
        let p = policy().with_rule(Rule::any(vec![]));
        assert_eq!(severities(&p), vec![Severity::Warning]);
    }

    #[test]
    fn bad_regex_and_range_are_errors() {
        let p = policy().with_rule(Rule::all(vec![
            Condition::new("user.email", Operator::Regex, "(["),
            Condition::new("profile.level", Operator::Between, json!([1])),
        ]));
        assert_eq!(severities(&p), vec![Severity::Error, Severity::Error]);
    }

    #[test]
    fn unknown_root_is_noted() {
        let p = policy().with_rule(Rule::all(vec![Condition::new(
            "ip_address",
            Operator::In,
            json!(["1.2.3.4"]),
        )]));
        let findings = lint_policy(&p);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::Note);
        assert!(findings[0].message.contains("ip_address"));
    }

    #[test]
    fn findings_sorted_most_severe_first() {
        let noisy = policy().with_rule(Rule::all(vec![Condition::new(
            "custom",
            Operator::Regex,
            "(",
        )]));
        let findings = lint_policies([&noisy, &policy()]);
        assert_eq!(findings.first().map(|f| f.severity), Some(Severity::Error));
        assert_eq!(findings.last().map(|f| f.severity), Some(Severity::Note));
    }
}
