//! Access decisions and denial reasons.

use serde::Serialize;
use thiserror::Error;
use warden_abac::Effect;
use warden_overlay::OverlayDenial;
use warden_rbac::Permission;
use warden_types::{PolicyId, UserStatus};

/// Why a request was denied.
///
/// The `Display` form is the reason string handed back to callers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DenialReason {
    /// The principal's account is not active.
    #[error("User account is {0}")]
    Inactive(UserStatus),

    /// Neither `category:action` nor `category:*` was granted.
    #[error("Missing permission: {0}")]
    MissingPermission(Permission),

    /// A deny policy matched.
    #[error("Access denied by policy: {name}")]
    Policy { id: PolicyId, name: String },

    /// The resource's overlay records did not grant access.
    #[error(transparent)]
    Overlay(#[from] OverlayDenial),
}

/// The outcome of one access request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    allowed: bool,
    reason: Option<DenialReason>,
}

impl Decision {
    pub fn allow() -> Self {
        Self {
            allowed: true,
            reason: None,
        }
    }

    pub fn deny(reason: DenialReason) -> Self {
        Self {
            allowed: false,
            reason: Some(reason),
        }
    }

    pub fn is_allowed(&self) -> bool {
        self.allowed
    }

    pub fn effect(&self) -> Effect {
        if self.allowed { Effect::Allow } else { Effect::Deny }
    }

    /// The denial reason. Always `None` for an allowed request.
    pub fn reason(&self) -> Option<&DenialReason> {
        self.reason.as_ref()
    }

    /// Splits the decision into `(allowed, reason)`.
    pub fn into_parts(self) -> (bool, Option<String>) {
        (self.allowed, self.reason.map(|r| r.to_string()))
    }
}

impl Serialize for Decision {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("Decision", 2)?;
        state.serialize_field("allowed", &self.allowed)?;
        state.serialize_field("reason", &self.reason.as_ref().map(ToString::to_string))?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use warden_types::ResourceCategory;

    #[test]
    fn reason_strings() {
        assert_eq!(
            DenialReason::Inactive(UserStatus::Suspended).to_string(),
            "User account is suspended"
        );
        assert_eq!(
            DenialReason::MissingPermission(Permission::required(ResourceCategory::Tool, "execute"))
                .to_string(),
            "Missing permission: tool:execute"
        );
        assert_eq!(
            DenialReason::Policy {
                id: "p-1".into(),
                name: "deny-blocked-ips".to_string()
            }
            .to_string(),
            "Access denied by policy: deny-blocked-ips"
        );
        assert_eq!(
            DenialReason::from(OverlayDenial::NotInScope).to_string(),
            "no permission granted for this resource"
        );
    }

    #[test]
    fn into_parts() {
        assert_eq!(Decision::allow().into_parts(), (true, None));
        assert_eq!(
            Decision::deny(DenialReason::Inactive(UserStatus::Locked)).into_parts(),
            (false, Some("User account is locked".to_string()))
        );
    }

    #[test]
    fn serializes_reason_as_string() {
        let decision = Decision::deny(DenialReason::Inactive(UserStatus::Pending));
        let json = serde_json::to_value(&decision).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"allowed": false, "reason": "User account is pending"})
        );
    }
}
