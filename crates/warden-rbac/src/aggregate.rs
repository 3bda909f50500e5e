//! Permission aggregation over roles and groups.

use std::collections::HashSet;

use tracing::{debug, warn};
use warden_types::{Group, GroupId, Principal, Role, RoleId};

use crate::permissions::PermissionSet;

/// Read access to role and group definitions.
///
/// Implemented by whatever holds the caller's state snapshot.
pub trait RoleLookup {
    fn role(&self, id: &RoleId) -> Option<&Role>;
    fn group(&self, id: &GroupId) -> Option<&Group>;
}

/// Computes the effective permission set of `principal`.
///
/// The result is the union of:
/// 1. the principal's directly granted permissions,
/// 2. every assigned role and each ancestor along its parent chain,
/// 3. the roles attached to every assigned group (their own permissions only,
///    groups do not inherit further).
///
/// Roles belonging to another org are ignored.
///
/// # Postcondition
///
/// Terminates for any role graph, including cycles and dangling parents. A
/// role already visited during this call is never processed again, so the
/// result does not depend on assignment order.
pub fn aggregate_permissions<L: RoleLookup + ?Sized>(
    principal: &Principal,
    lookup: &L,
) -> PermissionSet {
    let mut permissions = PermissionSet::new();
    permissions.extend(principal.permissions.iter());

    let mut visited: HashSet<&RoleId> = HashSet::new();

    for role_id in &principal.role_ids {
        walk_role_chain(principal, role_id, lookup, &mut visited, &mut permissions);
    }

    for group_id in &principal.group_ids {
        let Some(group) = lookup.group(group_id) else {
            debug!(user = %principal.id, group = %group_id, "Assigned group not found");
            continue;
        };
        if group.org_id != principal.org_id {
            warn!(
                user = %principal.id,
                group = %group_id,
                "Ignoring group from another org"
            );
            continue;
        }
        for role_id in &group.role_ids {
            if let Some(role) = same_org_role(principal, role_id, lookup) {
                permissions.extend(role.permissions.iter());
            }
        }
    }

    permissions
}

/// Adds `start` and its ancestors, stopping at the first role already seen or
/// the first id that does not resolve.
fn walk_role_chain<'a, L: RoleLookup + ?Sized>(
    principal: &Principal,
    start: &'a RoleId,
    lookup: &'a L,
    visited: &mut HashSet<&'a RoleId>,
    permissions: &mut PermissionSet,
) {
    let mut next = Some(start);

    while let Some(role_id) = next {
        if !visited.insert(role_id) {
            debug!(user = %principal.id, role = %role_id, "Role already visited; stopping walk");
            return;
        }

        let Some(role) = same_org_role(principal, role_id, lookup) else {
            return;
        };

        permissions.extend(role.permissions.iter());
        next = role.parent_id.as_ref();
    }
}

fn same_org_role<'a, L: RoleLookup + ?Sized>(
    principal: &Principal,
    role_id: &RoleId,
    lookup: &'a L,
) -> Option<&'a Role> {
    let Some(role) = lookup.role(role_id) else {
        debug!(user = %principal.id, role = %role_id, "Role not found");
        return None;
    };
    if role.org_id != principal.org_id {
        warn!(user = %principal.id, role = %role_id, "Ignoring role from another org");
        return None;
    }
    Some(role)
}
