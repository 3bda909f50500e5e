//! Kani bounded model checking proofs for permission aggregation.
//!
//! - Proof #1: Cycle termination - a parent cycle never hangs the walk
//! - Proof #2: Inheritance union - ancestors contribute their permissions
//! - Proof #3: Idempotence - aggregating twice yields the same set
//!
//! Run with: `cargo kani --harness verify_*`

use std::collections::HashMap;

use crate::aggregate::{RoleLookup, aggregate_permissions};
use warden_types::{Group, GroupId, Principal, ResourceCategory, Role, RoleId};

struct Tables {
    roles: HashMap<RoleId, Role>,
}

impl RoleLookup for Tables {
    fn role(&self, id: &RoleId) -> Option<&Role> {
        self.roles.get(id)
    }

    fn group(&self, _id: &GroupId) -> Option<&Group> {
        None
    }
}

fn cyclic_tables() -> Tables {
    let a = Role::new("a", "org", "A")
        .with_permission("tool:execute")
        .with_parent("b");
    let b = Role::new("b", "org", "B")
        .with_permission("tool:view")
        .with_parent("a");
    Tables {
        roles: HashMap::from([(a.id.clone(), a), (b.id.clone(), b)]),
    }
}

//=============================================================================
// Proof #1: Cycle Termination
//=============================================================================

/// **Property**: A → B → A terminates and yields the union of both roles.
#[cfg(kani)]
#[kani::proof]
#[kani::unwind(6)]
fn verify_cycle_termination() {
    let tables = cyclic_tables();
    let principal = Principal::new("u", "org").with_role("a");

    let perms = aggregate_permissions(&principal, &tables);

    assert_eq!(perms.len(), 2);
}

//=============================================================================
// Proof #2: Inheritance Union
//=============================================================================

/// **Property**: A principal holding only the child role gains the parent's grants.
#[cfg(kani)]
#[kani::proof]
#[kani::unwind(6)]
fn verify_inheritance_union() {
    let tables = cyclic_tables();
    let principal = Principal::new("u", "org").with_role("a");

    let perms = aggregate_permissions(&principal, &tables);

    assert!(perms.allows(ResourceCategory::Tool, "view"));
    assert!(perms.allows(ResourceCategory::Tool, "execute"));
}

//=============================================================================
// Proof #3: Idempotence
//=============================================================================

/// **Property**: Aggregation is a pure function of its inputs.
#[cfg(kani)]
#[kani::proof]
#[kani::unwind(6)]
fn verify_aggregation_idempotent() {
    let tables = cyclic_tables();
    let principal = Principal::new("u", "org").with_role("b").with_role("a");

    let first = aggregate_permissions(&principal, &tables);
    let second = aggregate_permissions(&principal, &tables);

    assert_eq!(first, second);
}
