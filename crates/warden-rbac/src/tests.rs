//! Unit tests for warden-rbac

use std::collections::HashMap;

use warden_types::{Group, GroupId, Principal, ResourceCategory, Role, RoleId};

use crate::{PermissionSet, RoleLookup, aggregate_permissions};

#[derive(Default)]
struct Tables {
    roles: HashMap<RoleId, Role>,
    groups: HashMap<GroupId, Group>,
}

impl Tables {
    fn with_role(mut self, role: Role) -> Self {
        self.roles.insert(role.id.clone(), role);
        self
    }

    fn with_group(mut self, group: Group) -> Self {
        self.groups.insert(group.id.clone(), group);
        self
    }
}

impl RoleLookup for Tables {
    fn role(&self, id: &RoleId) -> Option<&Role> {
        self.roles.get(id)
    }

    fn group(&self, id: &GroupId) -> Option<&Group> {
        self.groups.get(id)
    }
}

fn sorted(set: &PermissionSet) -> Vec<String> {
    set.iter().map(str::to_string).collect()
}

// ============================================================================
// Aggregation Tests
// ============================================================================

#[test]
fn direct_permissions_only() {
    let principal = Principal::new("u-1", "acme").with_permission("tool:view");
    let perms = aggregate_permissions(&principal, &Tables::default());

    assert_eq!(sorted(&perms), vec!["tool:view"]);
}

#[test]
fn parent_permissions_are_inherited() {
    let tables = Tables::default()
        .with_role(Role::new("b", "acme", "B").with_permission("tool:view"))
        .with_role(
            Role::new("a", "acme", "A")
                .with_permission("tool:execute")
                .with_parent("b"),
        );
    let principal = Principal::new("u-1", "acme").with_role("a");

    let perms = aggregate_permissions(&principal, &tables);

    assert!(perms.allows(ResourceCategory::Tool, "view"));
    assert!(perms.allows(ResourceCategory::Tool, "execute"));
}

#[test]
fn deep_chain_is_fully_walked() {
    let mut tables = Tables::default();
    for depth in 0..50 {
        let mut role = Role::new(format!("r{depth}"), "acme", "level")
            .with_permission(&format!("workflow:step{depth}"));
        if depth > 0 {
            role = role.with_parent(format!("r{}", depth - 1));
        }
        tables = tables.with_role(role);
    }
    let principal = Principal::new("u-1", "acme").with_role("r49");

    let perms = aggregate_permissions(&principal, &tables);

    assert_eq!(perms.len(), 50);
    assert!(perms.allows(ResourceCategory::Workflow, "step0"));
}

#[test]
fn parent_cycle_terminates() {
    let tables = Tables::default()
        .with_role(
            Role::new("a", "acme", "A")
                .with_permission("tool:execute")
                .with_parent("b"),
        )
        .with_role(
            Role::new("b", "acme", "B")
                .with_permission("tool:view")
                .with_parent("a"),
        );
    let principal = Principal::new("u-1", "acme").with_role("a");

    let perms = aggregate_permissions(&principal, &tables);

    assert_eq!(sorted(&perms), vec!["tool:execute", "tool:view"]);
}

#[test]
fn self_parent_terminates() {
    let tables = Tables::default().with_role(
        Role::new("loop", "acme", "Loop")
            .with_permission("agent:run")
            .with_parent("loop"),
    );
    let principal = Principal::new("u-1", "acme").with_role("loop");

    let perms = aggregate_permissions(&principal, &tables);

    assert_eq!(sorted(&perms), vec!["agent:run"]);
}

#[test]
fn dangling_parent_stops_walk() {
    let tables = Tables::default().with_role(
        Role::new("a", "acme", "A")
            .with_permission("tool:view")
            .with_parent("ghost"),
    );
    let principal = Principal::new("u-1", "acme").with_role("a").with_role("missing");

    let perms = aggregate_permissions(&principal, &tables);

    assert_eq!(sorted(&perms), vec!["tool:view"]);
}

#[test]
fn group_roles_contribute_without_parent_walk() {
    let tables = Tables::default()
        .with_role(Role::new("base", "acme", "Base").with_permission("database:select"))
        .with_role(
            Role::new("kb-reader", "acme", "KB Reader")
                .with_permission("knowledge_base:search")
                .with_parent("base"),
        )
        .with_group(Group::new("research", "acme", "Research").with_role("kb-reader"));
    let principal = Principal::new("u-1", "acme").with_group("research");

    let perms = aggregate_permissions(&principal, &tables);

    assert!(perms.allows(ResourceCategory::KnowledgeBase, "search"));
    assert!(!perms.allows(ResourceCategory::Database, "select"));
}

#[test]
fn foreign_org_roles_and_groups_are_ignored() {
    let tables = Tables::default()
        .with_role(Role::new("admin", "other-org", "Admin").with_permission("system:admin"))
        .with_role(Role::new("viewer", "acme", "Viewer").with_permission("tool:view"))
        .with_group(Group::new("ops", "other-org", "Ops").with_role("viewer"));
    let principal = Principal::new("u-1", "acme")
        .with_role("admin")
        .with_group("ops");

    let perms = aggregate_permissions(&principal, &tables);

    assert!(perms.is_empty());
}

#[test]
fn shared_ancestor_is_processed_once() {
    let tables = Tables::default()
        .with_role(Role::new("root", "acme", "Root").with_permission("tool:view"))
        .with_role(
            Role::new("left", "acme", "Left")
                .with_permission("tool:edit")
                .with_parent("root"),
        )
        .with_role(
            Role::new("right", "acme", "Right")
                .with_permission("tool:delete")
                .with_parent("root"),
        );
    let principal = Principal::new("u-1", "acme")
        .with_role("left")
        .with_role("right");

    let perms = aggregate_permissions(&principal, &tables);

    assert_eq!(sorted(&perms), vec!["tool:delete", "tool:edit", "tool:view"]);
}

// ============================================================================
// Property Tests
// ============================================================================

mod properties {
    use super::*;
    use proptest::prelude::*;

    /// Builds `n` roles where role `i` points at parent `parents[i] % n`,
    /// which produces arbitrary cycles and self-loops.
    fn random_graph(parents: &[usize]) -> Tables {
        let n = parents.len();
        let mut tables = Tables::default();
        for (i, parent) in parents.iter().enumerate() {
            tables = tables.with_role(
                Role::new(format!("r{i}"), "acme", "r")
                    .with_permission(&format!("tool:a{i}"))
                    .with_parent(format!("r{}", parent % n)),
            );
        }
        tables
    }

    proptest! {
        /// Property: aggregation terminates and is insensitive to role order
        #[test]
        fn prop_order_insensitive(
            parents in prop::collection::vec(0usize..16, 1..16),
            assigned in prop::collection::vec(0usize..16, 1..6),
        ) {
            let tables = random_graph(&parents);
            let n = parents.len();

            let mut forward = Principal::new("u", "acme");
            for i in &assigned {
                forward = forward.with_role(format!("r{}", i % n));
            }
            let mut backward = Principal::new("u", "acme");
            for i in assigned.iter().rev() {
                backward = backward.with_role(format!("r{}", i % n));
            }

            prop_assert_eq!(
                aggregate_permissions(&forward, &tables),
                aggregate_permissions(&backward, &tables)
            );
        }

        /// Property: aggregating twice gives the same set
        #[test]
        fn prop_idempotent(parents in prop::collection::vec(0usize..8, 1..8)) {
            let tables = random_graph(&parents);
            let principal = Principal::new("u", "acme").with_role("r0");

            let first = aggregate_permissions(&principal, &tables);
            let second = aggregate_permissions(&principal, &tables);
            prop_assert_eq!(first, second);
        }
    }
}
