//! Attribute resolution for ABAC evaluation.
//!
//! Condition attributes are dotted paths. The first segment picks a
//! namespace, the rest walk into it:
//! - **user**: enumerated principal fields, `user.profile.*` walks the profile
//! - **profile**: the principal's profile object
//! - **context**, **request**, **resource**: the caller's context map
//! - **time** / **datetime**: fields derived from the evaluation instant (UTC)
//! - **env**: configured environment variables
//!
//! Any other root is looked up directly in the context map. Missing fields
//! and `null` values resolve to `None`; resolution never fails.

use chrono::{DateTime, Datelike, Timelike, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use warden_types::{Context, Principal};

/// Namespace roots with a dedicated resolver.
pub const KNOWN_ROOTS: [&str; 8] = [
    "user", "profile", "context", "request", "resource", "time", "datetime", "env",
];

// ============================================================================
// Business Hours
// ============================================================================

/// UTC business-hours window: `start <= hour < end` on weekdays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessHours {
    pub start: u32,
    pub end: u32,
}

impl Default for BusinessHours {
    fn default() -> Self {
        Self { start: 9, end: 17 }
    }
}

// ============================================================================
// Environment Attributes
// ============================================================================

/// Attributes describing the environment of the access request.
///
/// Computed by the engine, not supplied by the requester, so conditions on
/// time cannot be forged through the context map.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvironmentAttributes {
    /// The instant the decision is evaluated at.
    pub timestamp: DateTime<Utc>,
    /// Window used for `time.is_business_hours`.
    pub business_hours: BusinessHours,
    /// Values exposed under the `env` namespace.
    pub variables: Map<String, Value>,
}

impl EnvironmentAttributes {
    /// Creates environment attributes for `ts` with default business hours
    /// (09:00-17:00 UTC, Mon-Fri) and no variables.
    pub fn from_timestamp(ts: DateTime<Utc>) -> Self {
        Self {
            timestamp: ts,
            business_hours: BusinessHours::default(),
            variables: Map::new(),
        }
    }

    pub fn with_business_hours(mut self, business_hours: BusinessHours) -> Self {
        self.business_hours = business_hours;
        self
    }

    pub fn with_variables(mut self, variables: Map<String, Value>) -> Self {
        self.variables = variables;
        self
    }

    /// Day of week, 0 = Monday.
    pub fn weekday(&self) -> u32 {
        self.timestamp.weekday().num_days_from_monday()
    }

    pub fn hour(&self) -> u32 {
        self.timestamp.hour()
    }

    pub fn is_weekend(&self) -> bool {
        self.weekday() >= 5
    }

    pub fn is_business_hours(&self) -> bool {
        let hour = self.hour();
        !self.is_weekend() && (self.business_hours.start..self.business_hours.end).contains(&hour)
    }

    fn time_field(&self, field: &str) -> Option<Value> {
        let ts = &self.timestamp;
        let value = match field {
            "hour" => Value::from(ts.hour()),
            "minute" => Value::from(ts.minute()),
            "day" | "weekday" => Value::from(self.weekday()),
            "day_of_month" => Value::from(ts.day()),
            "month" => Value::from(ts.month()),
            "year" => Value::from(ts.year()),
            "date" => Value::from(ts.format("%Y-%m-%d").to_string()),
            "time" => Value::from(ts.format("%H:%M:%S").to_string()),
            "timestamp" => Value::from(ts.timestamp()),
            "is_weekend" => Value::from(self.is_weekend()),
            "is_business_hours" => Value::from(self.is_business_hours()),
            _ => return None,
        };
        Some(value)
    }
}

// ============================================================================
// Attribute Resolver
// ============================================================================

/// Resolves dotted attribute paths for one access request.
#[derive(Debug, Clone, Copy)]
pub struct AttributeResolver<'a> {
    principal: &'a Principal,
    context: &'a Context,
    env: &'a EnvironmentAttributes,
}

impl<'a> AttributeResolver<'a> {
    pub fn new(
        principal: &'a Principal,
        context: &'a Context,
        env: &'a EnvironmentAttributes,
    ) -> Self {
        Self {
            principal,
            context,
            env,
        }
    }

    pub fn principal(&self) -> &'a Principal {
        self.principal
    }

    pub fn context(&self) -> &'a Context {
        self.context
    }

    pub fn env(&self) -> &'a EnvironmentAttributes {
        self.env
    }

    /// Resolves `path`, returning `None` when any segment is missing or null.
    pub fn resolve(&self, path: &str) -> Option<Value> {
        let mut segments = path.split('.');
        let root = segments.next()?;
        let rest: Vec<&str> = segments.collect();

        let resolved = match root {
            "user" => self.resolve_user(&rest),
            "profile" => walk_map(&self.principal.profile, &rest),
            "context" => walk_map(self.context, &rest),
            "request" => self
                .context
                .get("request")
                .and_then(|v| walk(v, &rest)),
            "resource" => self
                .context
                .get("resource")
                .and_then(|v| walk(v, &rest)),
            "time" | "datetime" => self.resolve_time(&rest),
            "env" => walk_map(&self.env.variables, &rest),
            _ => self
                .context
                .get(path)
                .cloned()
                .or_else(|| walk_map(self.context, &path.split('.').collect::<Vec<_>>())),
        };

        resolved.filter(|v| !v.is_null())
    }

    fn resolve_user(&self, rest: &[&str]) -> Option<Value> {
        let p = self.principal;
        let Some((field, tail)) = rest.split_first() else {
            return Some(Value::from(p.id.as_str()));
        };

        let value = match *field {
            "id" => Value::from(p.id.as_str()),
            "org_id" => Value::from(p.org_id.as_str()),
            "status" => Value::from(p.status.as_str()),
            "is_active" => Value::from(p.is_active()),
            "username" => Value::from(p.username.clone()?),
            "email" => Value::from(p.email.clone()?),
            "roles" | "role_ids" => p.role_ids.iter().map(|r| r.as_str()).collect(),
            "groups" | "group_ids" => p.group_ids.iter().map(|g| g.as_str()).collect(),
            "permissions" => p.permissions.iter().map(String::as_str).collect(),
            "profile" => return walk_map(&p.profile, tail),
            _ => return None,
        };

        walk(&value, tail)
    }

    fn resolve_time(&self, rest: &[&str]) -> Option<Value> {
        match rest {
            [] => Some(Value::from(self.env.timestamp.to_rfc3339())),
            [field] => self.env.time_field(field),
            _ => None,
        }
    }
}

/// Walks `segments` starting from an object root.
fn walk_map(root: &Map<String, Value>, segments: &[&str]) -> Option<Value> {
    let Some((first, tail)) = segments.split_first() else {
        return Some(Value::Object(root.clone()));
    };
    root.get(*first).and_then(|v| walk(v, tail))
}

/// Walks `segments` through nested objects and arrays.
fn walk(root: &Value, segments: &[&str]) -> Option<Value> {
    let mut current = root;
    for segment in segments {
        current = match current {
            Value::Object(map) => map.get(*segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    if current.is_null() {
        None
    } else {
        Some(current.clone())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;
    use test_case::test_case;
    use warden_types::UserStatus;

    fn principal() -> Principal {
        Principal::new("u-1", "acme")
            .with_username("ada")
            .with_role("analyst")
            .with_group("research")
            .with_permission("tool:view")
            .with_profile_attr("department", "engineering")
            .with_profile_attr("clearance", 2)
            .with_profile_attr("manager", Value::Null)
    }

    fn context() -> Context {
        let value = json!({
            "ip_address": "10.0.0.7",
            "request": { "ip": "10.0.0.7", "headers": { "user_agent": "curl" } },
            "resource": { "owner": "u-1", "tags": ["pii", "finance"] },
            "tenant.flag": "direct-key",
            "custom": { "nested": { "value": 42 } }
        });
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    /// Wednesday 2025-01-08 10:30:15 UTC.
    fn env() -> EnvironmentAttributes {
        let ts = Utc.with_ymd_and_hms(2025, 1, 8, 10, 30, 15).unwrap();
        let mut vars = Map::new();
        vars.insert("region".to_string(), json!("eu-west-1"));
        EnvironmentAttributes::from_timestamp(ts).with_variables(vars)
    }

    fn resolve(path: &str) -> Option<Value> {
        let p = principal();
        let c = context();
        let e = env();
        AttributeResolver::new(&p, &c, &e).resolve(path)
    }

    #[test_case("user.id", json!("u-1"))]
    #[test_case("user.org_id", json!("acme"))]
    #[test_case("user.status", json!("active"))]
    #[test_case("user.username", json!("ada"))]
    #[test_case("user.roles", json!(["analyst"]))]
    #[test_case("user.group_ids", json!(["research"]))]
    #[test_case("user.roles.0", json!("analyst"))]
    #[test_case("user.permissions", json!(["tool:view"]))]
    #[test_case("user.profile.department", json!("engineering"))]
    #[test_case("profile.clearance", json!(2))]
    #[test_case("context.ip_address", json!("10.0.0.7"))]
    #[test_case("request.ip", json!("10.0.0.7"))]
    #[test_case("request.headers.user_agent", json!("curl"))]
    #[test_case("resource.owner", json!("u-1"))]
    #[test_case("resource.tags.1", json!("finance"))]
    #[test_case("env.region", json!("eu-west-1"))]
    #[test_case("ip_address", json!("10.0.0.7"))]
    #[test_case("tenant.flag", json!("direct-key"))]
    #[test_case("custom.nested.value", json!(42))]
    fn resolves_namespaces(path: &str, expected: Value) {
        assert_eq!(resolve(path), Some(expected));
    }

    #[test_case("user.email" ; "unset optional field")]
    #[test_case("user.password" ; "unknown user field")]
    #[test_case("user.id.extra" ; "walk past scalar")]
    #[test_case("profile.manager" ; "null leaf")]
    #[test_case("profile.manager.name" ; "null intermediate")]
    #[test_case("request.missing.deep" ; "missing intermediate")]
    #[test_case("resource.tags.9" ; "index out of range")]
    #[test_case("resource.tags.x" ; "non numeric index")]
    #[test_case("env.missing" ; "missing env var")]
    #[test_case("time.fortnight" ; "unknown time field")]
    #[test_case("time.hour.extra" ; "walk past time field")]
    #[test_case("nothing.here" ; "unknown root")]
    #[test_case("" ; "empty path")]
    fn unresolvable_paths_are_absent(path: &str) {
        assert_eq!(resolve(path), None);
    }

    #[test_case("time.hour", json!(10))]
    #[test_case("time.minute", json!(30))]
    #[test_case("time.day", json!(2))]
    #[test_case("time.weekday", json!(2))]
    #[test_case("datetime.weekday", json!(2))]
    #[test_case("time.day_of_month", json!(8))]
    #[test_case("time.month", json!(1))]
    #[test_case("time.year", json!(2025))]
    #[test_case("time.date", json!("2025-01-08"))]
    #[test_case("time.time", json!("10:30:15"))]
    #[test_case("time.timestamp", json!(1_736_332_215))]
    #[test_case("time.is_weekend", json!(false))]
    #[test_case("time.is_business_hours", json!(true))]
    fn resolves_time_fields(path: &str, expected: Value) {
        assert_eq!(resolve(path), Some(expected));
    }

    #[test]
    fn bare_time_is_rfc3339() {
        assert_eq!(resolve("time"), Some(json!("2025-01-08T10:30:15+00:00")));
    }

    #[test]
    fn test_business_hours_boundaries() {
        let at = |h| {
            let ts = Utc.with_ymd_and_hms(2025, 1, 8, h, 0, 0).unwrap();
            EnvironmentAttributes::from_timestamp(ts)
        };
        assert!(at(9).is_business_hours(), "09:00 is inclusive start");
        assert!(at(16).is_business_hours());
        assert!(!at(17).is_business_hours(), "17:00 is exclusive end");
        assert!(!at(8).is_business_hours());
    }

    #[test]
    fn test_weekend_is_never_business_hours() {
        // Saturday at 10:00 UTC
        let saturday = Utc.with_ymd_and_hms(2025, 1, 11, 10, 0, 0).unwrap();
        let env = EnvironmentAttributes::from_timestamp(saturday);
        assert!(env.is_weekend());
        assert_eq!(env.weekday(), 5);
        assert!(!env.is_business_hours());
    }

    #[test]
    fn test_custom_business_hours() {
        let early = Utc.with_ymd_and_hms(2025, 1, 8, 7, 0, 0).unwrap();
        let env = EnvironmentAttributes::from_timestamp(early)
            .with_business_hours(BusinessHours { start: 6, end: 14 });
        assert!(env.is_business_hours());
    }

    #[test]
    fn inactive_principal_status_is_visible() {
        let p = principal().with_status(UserStatus::Suspended);
        let c = Context::new();
        let e = env();
        let resolver = AttributeResolver::new(&p, &c, &e);
        assert_eq!(resolver.resolve("user.status"), Some(json!("suspended")));
        assert_eq!(resolver.resolve("user.is_active"), Some(json!(false)));
    }
}
