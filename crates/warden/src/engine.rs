//! The access-decision engine.
//!
//! [`AccessEngine::evaluate_access`] runs the stages in a fixed order:
//!
//! 1. account status
//! 2. system-admin bypass
//! 3. baseline `category:action` permission
//! 4. applicable ABAC policies, ascending priority, first matching deny wins
//! 5. resource overlays, when a concrete resource id is given
//!
//! Every stage either denies with a [`DenialReason`] or passes to the next.
//! The engine performs no I/O and holds no mutable state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};
use warden_abac::{
    AttributeResolver, BusinessHours, Effect, EnvironmentAttributes, Policy, PolicyTarget,
    evaluate, select_policies,
};
use warden_overlay::{OverlayDecision, OverlayRequest, check_resource};
use warden_rbac::{Permission, PermissionSet, aggregate_permissions};
use warden_types::{Context, Principal, ResourceCategory};

use crate::decision::{Decision, DenialReason};
use crate::state::StateProvider;

/// Permission string that bypasses every other check.
pub const DEFAULT_SYSTEM_ADMIN_PERMISSION: &str = "system:admin";

// ============================================================================
// Configuration
// ============================================================================

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Holders of this permission are allowed everything.
    pub system_admin_permission: String,
    /// Window behind `time.is_business_hours`.
    pub business_hours: BusinessHours,
    /// Values exposed to conditions under the `env` namespace.
    pub environment: Map<String, Value>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            system_admin_permission: DEFAULT_SYSTEM_ADMIN_PERMISSION.to_string(),
            business_hours: BusinessHours::default(),
            environment: Map::new(),
        }
    }
}

impl EngineConfig {
    pub fn with_system_admin_permission(mut self, permission: &str) -> Self {
        self.system_admin_permission = permission.to_string();
        self
    }

    pub fn with_business_hours(mut self, start: u32, end: u32) -> Self {
        self.business_hours = BusinessHours { start, end };
        self
    }

    pub fn with_environment(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.environment.insert(key.to_string(), value.into());
        self
    }
}

// ============================================================================
// Requests
// ============================================================================

/// One access request, for batch evaluation.
#[derive(Debug, Clone, Copy)]
pub struct AccessRequest<'a> {
    pub principal: &'a Principal,
    pub action: &'a str,
    pub category: ResourceCategory,
    pub resource_id: Option<&'a str>,
    pub context: Option<&'a Context>,
}

impl<'a> AccessRequest<'a> {
    pub fn new(principal: &'a Principal, action: &'a str, category: ResourceCategory) -> Self {
        Self {
            principal,
            action,
            category,
            resource_id: None,
            context: None,
        }
    }

    pub fn on_resource(mut self, resource_id: &'a str) -> Self {
        self.resource_id = Some(resource_id);
        self
    }

    pub fn with_context(mut self, context: &'a Context) -> Self {
        self.context = Some(context);
        self
    }
}

// ============================================================================
// Engine
// ============================================================================

/// Decides access requests against the state of a [`StateProvider`].
///
/// Decisions are pure functions of the provider's state, the configuration
/// and the evaluation instant, so one engine can serve many threads as long
/// as the state is not mutated underneath it.
#[derive(Debug)]
pub struct AccessEngine<S> {
    state: S,
    config: EngineConfig,
    audit_enabled: bool,
}

impl<S: StateProvider> AccessEngine<S> {
    pub fn new(state: S, config: EngineConfig) -> Self {
        Self {
            state,
            config,
            audit_enabled: true,
        }
    }

    /// Disables decision logging (for testing).
    pub fn without_audit(mut self) -> Self {
        self.audit_enabled = false;
        self
    }

    pub fn state(&self) -> &S {
        &self.state
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The principal's aggregated permission set.
    pub fn effective_permissions(&self, principal: &Principal) -> PermissionSet {
        aggregate_permissions(principal, &self.state)
    }

    /// The active policies applicable to a request, ascending by priority.
    pub fn matching_policies(
        &self,
        principal: &Principal,
        action: &str,
        category: ResourceCategory,
        resource_id: Option<&str>,
    ) -> Vec<&Policy> {
        let target = PolicyTarget::new(principal, category, action).with_resource(resource_id);
        select_policies(&self.state, &target)
    }

    /// Decides a request at the current instant.
    pub fn evaluate_access(
        &self,
        principal: &Principal,
        action: &str,
        category: ResourceCategory,
        resource_id: Option<&str>,
        context: Option<&Context>,
    ) -> Decision {
        self.evaluate_access_at(principal, action, category, resource_id, context, Utc::now())
    }

    /// Decides a request as if it were made at `at`.
    pub fn evaluate_access_at(
        &self,
        principal: &Principal,
        action: &str,
        category: ResourceCategory,
        resource_id: Option<&str>,
        context: Option<&Context>,
        at: DateTime<Utc>,
    ) -> Decision {
        let resource_id = resource_id.filter(|id| !id.is_empty());
        let decision = self.decide(principal, action, category, resource_id, context, at);

        if self.audit_enabled {
            match decision.reason() {
                None => info!(
                    user = %principal.id,
                    org = %principal.org_id,
                    action,
                    category = %category,
                    resource = resource_id.unwrap_or("-"),
                    "Access granted"
                ),
                Some(reason) => warn!(
                    user = %principal.id,
                    org = %principal.org_id,
                    action,
                    category = %category,
                    resource = resource_id.unwrap_or("-"),
                    %reason,
                    "Access denied"
                ),
            }
        }

        decision
    }

    /// Decides every request against the same instant.
    pub fn evaluate_many(
        &self,
        requests: &[AccessRequest<'_>],
        at: DateTime<Utc>,
    ) -> Vec<Decision> {
        requests
            .iter()
            .map(|r| {
                self.evaluate_access_at(
                    r.principal,
                    r.action,
                    r.category,
                    r.resource_id,
                    r.context,
                    at,
                )
            })
            .collect()
    }

    fn decide(
        &self,
        principal: &Principal,
        action: &str,
        category: ResourceCategory,
        resource_id: Option<&str>,
        context: Option<&Context>,
        at: DateTime<Utc>,
    ) -> Decision {
        if !principal.is_active() {
            return Decision::deny(DenialReason::Inactive(principal.status));
        }

        let permissions = self.effective_permissions(principal);
        if permissions.contains(&self.config.system_admin_permission) {
            debug!(user = %principal.id, "System admin bypass");
            return Decision::allow();
        }

        if !permissions.allows(category, action) {
            return Decision::deny(DenialReason::MissingPermission(Permission::required(
                category, action,
            )));
        }

        let empty = Context::new();
        let context = context.unwrap_or(&empty);

        let policies = self.matching_policies(principal, action, category, resource_id);
        if !policies.is_empty() {
            let env = EnvironmentAttributes::from_timestamp(at)
                .with_business_hours(self.config.business_hours)
                .with_variables(self.config.environment.clone());
            let resolver = AttributeResolver::new(principal, context, &env);
            let outcome = evaluate(&policies, &resolver);
            debug!(
                user = %principal.id,
                policies = policies.len(),
                reason = %outcome.reason,
                "Policy evaluation complete"
            );

            if let (Effect::Deny, Some(id)) = (outcome.effect, outcome.matched_policy) {
                return Decision::deny(DenialReason::Policy {
                    id,
                    name: outcome.matched_policy_name.unwrap_or_default(),
                });
            }
        }

        let Some(resource_id) = resource_id else {
            return Decision::allow();
        };

        let request = OverlayRequest {
            principal,
            action,
            resource_id,
            context,
            now: at,
        };
        match check_resource(&self.state, category, &request) {
            OverlayDecision::NoRecords | OverlayDecision::Granted => Decision::allow(),
            OverlayDecision::Denied(denial) => Decision::deny(denial.into()),
        }
    }
}
