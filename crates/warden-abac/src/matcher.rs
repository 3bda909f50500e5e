//! Selection of the policies that apply to a request.

use warden_types::{OrgId, Principal, ResourceCategory};

use crate::policy::Policy;

/// Read access to the stored policies of an organization.
pub trait PolicySource {
    /// Every policy stored for `org_id`, active or not, in any order.
    fn policies(&self, org_id: &OrgId) -> Vec<&Policy>;
}

/// The request attributes a policy is matched against.
#[derive(Debug, Clone, Copy)]
pub struct PolicyTarget<'a> {
    pub principal: &'a Principal,
    pub category: ResourceCategory,
    pub action: &'a str,
    pub resource_id: Option<&'a str>,
}

impl<'a> PolicyTarget<'a> {
    pub fn new(principal: &'a Principal, category: ResourceCategory, action: &'a str) -> Self {
        Self {
            principal,
            category,
            action,
            resource_id: None,
        }
    }

    pub fn with_resource(mut self, resource_id: Option<&'a str>) -> Self {
        self.resource_id = resource_id;
        self
    }
}

/// Returns whether `policy` applies to `target`.
///
/// A policy applies when it is active, belongs to the principal's
/// organization, covers the category, lists the action (or no actions),
/// lists the resource (or no resources, or the request names none), and
/// targets the principal (or nobody in particular).
pub fn applies_to(policy: &Policy, target: &PolicyTarget<'_>) -> bool {
    if !policy.is_active {
        return false;
    }
    if policy.org_id != target.principal.org_id || policy.resource_category != target.category {
        return false;
    }
    if !policy.actions.is_empty() && !policy.actions.iter().any(|a| a == target.action) {
        return false;
    }
    if let Some(resource_id) = target.resource_id.filter(|id| !id.is_empty())
        && !policy.resource_ids.is_empty()
        && !policy.resource_ids.iter().any(|r| r == resource_id)
    {
        return false;
    }

    policy.target.is_empty() || policy.target.includes(target.principal)
}

/// Returns the applicable policies from `source`, ascending by priority.
///
/// The sort is stable, so equal priorities keep the source's order.
pub fn select_policies<'s, S: PolicySource + ?Sized>(
    source: &'s S,
    target: &PolicyTarget<'_>,
) -> Vec<&'s Policy> {
    let mut selected: Vec<&Policy> = source
        .policies(&target.principal.org_id)
        .into_iter()
        .filter(|policy| applies_to(policy, target))
        .collect();
    selected.sort_by_key(|policy| policy.priority);
    selected
}

impl PolicySource for [Policy] {
    fn policies(&self, org_id: &OrgId) -> Vec<&Policy> {
        self.iter().filter(|p| &p.org_id == org_id).collect()
    }
}

impl PolicySource for Vec<Policy> {
    fn policies(&self, org_id: &OrgId) -> Vec<&Policy> {
        self.as_slice().policies(org_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::Effect;
    use warden_types::Scope;

    fn alice() -> Principal {
        Principal::new("alice", "acme").with_role("analyst").with_group("research")
    }

    fn tool_policy(id: &str) -> Policy {
        Policy::new(id, "acme", id, ResourceCategory::Tool, Effect::Deny)
    }

    fn ids(policies: &[&Policy]) -> Vec<String> {
        policies.iter().map(|p| p.id.to_string()).collect()
    }

    #[test]
    fn filters_by_category_org_and_active() {
        let policies = vec![
            tool_policy("tool"),
            Policy::new("db", "acme", "db", ResourceCategory::Database, Effect::Deny),
            Policy::new("other-org", "globex", "x", ResourceCategory::Tool, Effect::Deny),
            tool_policy("off").inactive(),
        ];
        let p = alice();
        let target = PolicyTarget::new(&p, ResourceCategory::Tool, "execute");

        assert_eq!(ids(&select_policies(&policies, &target)), vec!["tool"]);
    }

    #[test]
    fn action_list_narrows() {
        let policies = vec![
            tool_policy("exec").for_action("execute"),
            tool_policy("read").for_action("read"),
            tool_policy("any"),
        ];
        let p = alice();
        let target = PolicyTarget::new(&p, ResourceCategory::Tool, "execute");

        assert_eq!(ids(&select_policies(&policies, &target)), vec!["exec", "any"]);
    }

    #[test]
    fn resource_filter_only_applies_when_both_sides_present() {
        let policies = vec![tool_policy("t9").for_resource("tool-9"), tool_policy("any")];
        let p = alice();

        let named =
            PolicyTarget::new(&p, ResourceCategory::Tool, "execute").with_resource(Some("tool-1"));
        assert_eq!(ids(&select_policies(&policies, &named)), vec!["any"]);

        let matching =
            PolicyTarget::new(&p, ResourceCategory::Tool, "execute").with_resource(Some("tool-9"));
        assert_eq!(ids(&select_policies(&policies, &matching)), vec!["t9", "any"]);

        let unnamed = PolicyTarget::new(&p, ResourceCategory::Tool, "execute");
        assert_eq!(ids(&select_policies(&policies, &unnamed)), vec!["t9", "any"]);
    }

    #[test]
    fn target_scope_narrows_to_principals() {
        let policies = vec![
            tool_policy("by-user").targeting(Scope::default().with_user("alice")),
            tool_policy("by-role").targeting(Scope::default().with_role("analyst")),
            tool_policy("by-group").targeting(Scope::default().with_group("research")),
            tool_policy("someone-else").targeting(Scope::default().with_user("bob")),
        ];
        let p = alice();
        let target = PolicyTarget::new(&p, ResourceCategory::Tool, "execute");

        assert_eq!(
            ids(&select_policies(&policies, &target)),
            vec!["by-user", "by-role", "by-group"]
        );
    }

    #[test]
    fn sorted_ascending_and_stable() {
        let policies = vec![
            tool_policy("c").with_priority(10),
            tool_policy("a").with_priority(-1),
            tool_policy("b1").with_priority(5),
            tool_policy("b2").with_priority(5),
        ];
        let p = alice();
        let target = PolicyTarget::new(&p, ResourceCategory::Tool, "execute");

        assert_eq!(
            ids(&select_policies(&policies, &target)),
            vec!["a", "b1", "b2", "c"]
        );
    }
}
