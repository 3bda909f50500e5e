//! Condition operators.
//!
//! Every comparison is fallible internally and returns
//! `Result<bool, ConditionError>`. The evaluator turns errors into `false`,
//! so a malformed condition can only ever fail to match.

use std::cmp::Ordering;

use regex::RegexBuilder;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

// ============================================================================
// Errors
// ============================================================================

/// Why a comparison could not be carried out.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConditionError {
    /// The operands cannot be compared with this operator.
    #[error("cannot apply '{operator}' to {actual} and {target}")]
    TypeMismatch {
        operator: Operator,
        actual: &'static str,
        target: &'static str,
    },

    /// The regex target does not compile.
    #[error("invalid pattern {pattern:?}: {message}")]
    InvalidPattern { pattern: String, message: String },

    /// `between` needs a two-element `[low, high]` array.
    #[error("'between' expects a [low, high] array, got {0}")]
    InvalidRange(String),
}

// ============================================================================
// Operator
// ============================================================================

/// Comparison operator of a condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    #[serde(alias = "is")]
    Eq,
    Ne,
    In,
    NotIn,
    Gt,
    Lt,
    Gte,
    Lte,
    Contains,
    NotContains,
    StartsWith,
    EndsWith,
    #[serde(alias = "matches")]
    Regex,
    IsEmpty,
    IsNotEmpty,
    Between,
}

impl Operator {
    pub fn as_str(self) -> &'static str {
        match self {
            Operator::Eq => "eq",
            Operator::Ne => "ne",
            Operator::In => "in",
            Operator::NotIn => "not_in",
            Operator::Gt => "gt",
            Operator::Lt => "lt",
            Operator::Gte => "gte",
            Operator::Lte => "lte",
            Operator::Contains => "contains",
            Operator::NotContains => "not_contains",
            Operator::StartsWith => "starts_with",
            Operator::EndsWith => "ends_with",
            Operator::Regex => "regex",
            Operator::IsEmpty => "is_empty",
            Operator::IsNotEmpty => "is_not_empty",
            Operator::Between => "between",
        }
    }

    /// Applies the operator to a resolved (present) value and the target.
    pub fn apply(self, actual: &Value, target: &Value) -> Result<bool, ConditionError> {
        match self {
            Operator::Eq => Ok(values_equal(actual, target)),
            Operator::Ne => Ok(!values_equal(actual, target)),
            Operator::In => Ok(is_member(actual, target)),
            Operator::NotIn => Ok(!is_member(actual, target)),
            Operator::Gt => Ok(self.order(actual, target)? == Ordering::Greater),
            Operator::Lt => Ok(self.order(actual, target)? == Ordering::Less),
            Operator::Gte => Ok(self.order(actual, target)? != Ordering::Less),
            Operator::Lte => Ok(self.order(actual, target)? != Ordering::Greater),
            Operator::Contains => Ok(contains_ignore_case(actual, target)),
            Operator::NotContains => Ok(!contains_ignore_case(actual, target)),
            Operator::StartsWith => Ok(lowercase(actual).starts_with(&lowercase(target))),
            Operator::EndsWith => Ok(lowercase(actual).ends_with(&lowercase(target))),
            Operator::Regex => self.regex_search(actual, target),
            Operator::IsEmpty => Ok(is_falsy(actual)),
            Operator::IsNotEmpty => Ok(!is_falsy(actual)),
            Operator::Between => self.between(actual, target),
        }
    }

    fn order(self, actual: &Value, target: &Value) -> Result<Ordering, ConditionError> {
        let ordering = match (actual, target) {
            (Value::Number(a), Value::Number(b)) => {
                match (a.as_i64(), b.as_i64()) {
                    (Some(a), Some(b)) => Some(a.cmp(&b)),
                    _ => a.as_f64().zip(b.as_f64()).and_then(|(a, b)| a.partial_cmp(&b)),
                }
            }
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
            _ => None,
        };

        ordering.ok_or(ConditionError::TypeMismatch {
            operator: self,
            actual: type_name(actual),
            target: type_name(target),
        })
    }

    fn regex_search(self, actual: &Value, target: &Value) -> Result<bool, ConditionError> {
        let Value::String(pattern) = target else {
            return Err(ConditionError::TypeMismatch {
                operator: self,
                actual: type_name(actual),
                target: type_name(target),
            });
        };

        let regex = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|e| ConditionError::InvalidPattern {
                pattern: pattern.clone(),
                message: e.to_string(),
            })?;

        Ok(regex.is_match(&stringify(actual)))
    }

    fn between(self, actual: &Value, target: &Value) -> Result<bool, ConditionError> {
        let bounds = match target {
            Value::Array(bounds) if bounds.len() == 2 => bounds,
            other => return Err(ConditionError::InvalidRange(other.to_string())),
        };

        let above_low = self.order(actual, &bounds[0])? != Ordering::Less;
        let below_high = self.order(actual, &bounds[1])? != Ordering::Greater;
        Ok(above_low && below_high)
    }
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Condition
// ============================================================================

/// One `attribute <operator> value` test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    /// Dotted attribute path, e.g. `user.profile.department`.
    pub attribute: String,
    pub operator: Operator,
    /// Target literal. Defaults to `null` when omitted.
    #[serde(default)]
    pub value: Value,
}

impl Condition {
    pub fn new(attribute: &str, operator: Operator, value: impl Into<Value>) -> Self {
        Self {
            attribute: attribute.to_string(),
            operator,
            value: value.into(),
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// JSON equality, with numbers compared by value so `1 == 1.0`.
fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => x == y,
            _ => x.as_f64() == y.as_f64(),
        },
        _ => a == b,
    }
}

/// Membership in an array, key membership in an object, otherwise substring
/// of the stringified operands.
fn is_member(actual: &Value, target: &Value) -> bool {
    match target {
        Value::Array(items) => items.iter().any(|item| values_equal(actual, item)),
        Value::Object(map) => map.contains_key(&stringify(actual)),
        _ => stringify(target).contains(&stringify(actual)),
    }
}

/// Case-insensitive substring, or element membership when `actual` is an array.
fn contains_ignore_case(actual: &Value, target: &Value) -> bool {
    match actual {
        Value::Array(items) => items.iter().any(|item| match (item, target) {
            (Value::String(a), Value::String(b)) => a.to_lowercase() == b.to_lowercase(),
            _ => values_equal(item, target),
        }),
        _ => lowercase(actual).contains(&lowercase(target)),
    }
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

/// Strings render without quotes; everything else renders as JSON.
fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn lowercase(value: &Value) -> String {
    stringify(value).to_lowercase()
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ============================================================================
// Tests
// ============================================================================
