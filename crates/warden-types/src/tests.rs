//! Unit tests for warden-types

use std::str::FromStr;

use test_case::test_case;

use crate::{Classification, Principal, ResourceCategory, Scope, UserStatus};

// ============================================================================
// Resource Category Tests
// ============================================================================

#[test_case("tool", ResourceCategory::Tool)]
#[test_case("TOOL", ResourceCategory::Tool)]
#[test_case("knowledge_base", ResourceCategory::KnowledgeBase)]
#[test_case("KNOWLEDGE_BASE", ResourceCategory::KnowledgeBase)]
#[test_case("knowledge-base", ResourceCategory::KnowledgeBase)]
#[test_case("database", ResourceCategory::Database)]
#[test_case("audit_log", ResourceCategory::AuditLog)]
fn category_parses_both_spellings(input: &str, expected: ResourceCategory) {
    assert_eq!(ResourceCategory::from_str(input).unwrap(), expected);
}

#[test]
fn unknown_category_is_rejected() {
    let err = ResourceCategory::from_str("spaceship").unwrap_err();
    assert!(err.to_string().contains("spaceship"));
}

#[test]
fn category_display_matches_permission_prefix() {
    for category in ResourceCategory::ALL {
        assert_eq!(category.to_string(), category.as_str());
        assert_eq!(ResourceCategory::from_str(category.as_str()).unwrap(), category);
    }
}

#[test]
fn category_serde_accepts_upper_case_alias() {
    let parsed: ResourceCategory = serde_json::from_str("\"KNOWLEDGE_BASE\"").unwrap();
    assert_eq!(parsed, ResourceCategory::KnowledgeBase);
    assert_eq!(
        serde_json::to_string(&ResourceCategory::KnowledgeBase).unwrap(),
        "\"knowledge_base\""
    );
}

#[test]
fn only_three_categories_have_overlays() {
    let with_overlays: Vec<_> = ResourceCategory::ALL
        .into_iter()
        .filter(|c| c.has_overlays())
        .collect();
    assert_eq!(
        with_overlays,
        vec![
            ResourceCategory::Tool,
            ResourceCategory::KnowledgeBase,
            ResourceCategory::Database
        ]
    );
}

// ============================================================================
// Classification Tests
// ============================================================================

#[test]
fn classification_ordering() {
    assert!(Classification::Public < Classification::Internal);
    assert!(Classification::Internal < Classification::Confidential);
    assert!(Classification::Confidential < Classification::Restricted);
}

#[test]
fn unknown_classification_maps_to_restricted() {
    assert_eq!(
        Classification::parse_or_restricted("top-secret"),
        Classification::Restricted
    );
    assert_eq!(
        Classification::parse_or_restricted("Internal"),
        Classification::Internal
    );
}

// ============================================================================
// Scope Tests
// ============================================================================

fn analyst() -> Principal {
    Principal::new("u-1", "org-1")
        .with_role("analyst")
        .with_group("research")
}

#[test]
fn empty_scope_includes_nobody() {
    assert!(Scope::new().is_empty());
    assert!(!Scope::new().includes(&analyst()));
}

#[test]
fn scope_matches_user_role_or_group() {
    assert!(Scope::new().with_user("u-1").includes(&analyst()));
    assert!(Scope::new().with_role("analyst").includes(&analyst()));
    assert!(Scope::new().with_group("research").includes(&analyst()));
    assert!(
        !Scope::new()
            .with_user("u-2")
            .with_role("admin")
            .with_group("ops")
            .includes(&analyst())
    );
}

// ============================================================================
// Principal Tests
// ============================================================================

#[test]
fn principal_builder_deduplicates_assignments() {
    let principal = Principal::new("u-1", "org-1")
        .with_role("analyst")
        .with_role("analyst")
        .with_group("research")
        .with_group("research");

    assert_eq!(principal.role_ids.len(), 1);
    assert_eq!(principal.group_ids.len(), 1);
    assert!(principal.is_active());
}

#[test]
fn principal_deserializes_with_defaults() {
    let principal: Principal =
        serde_json::from_str(r#"{"id": "u-9", "org_id": "org-1", "status": "locked"}"#).unwrap();

    assert_eq!(principal.status, UserStatus::Locked);
    assert!(principal.role_ids.is_empty());
    assert!(principal.permissions.is_empty());
    assert!(!principal.is_active());
}

mod properties {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: a scope listing the principal's id always includes it
        #[test]
        fn prop_listed_user_is_included(user in "[a-z]{1,12}", org in "[a-z]{1,6}") {
            let principal = Principal::new(user.as_str(), org.as_str());
            let scope = Scope::new().with_user(user.as_str());
            prop_assert!(scope.includes(&principal));
        }

        /// Property: classification parsing never fails and round-trips known labels
        #[test]
        fn prop_classification_parse_is_total(label in ".{0,16}") {
            let parsed = Classification::parse_or_restricted(&label);
            if let Ok(strict) = label.parse::<Classification>() {
                prop_assert_eq!(parsed, strict);
            } else {
                prop_assert_eq!(parsed, Classification::Restricted);
            }
        }
    }
}
