//! Capability flags derived from a role.
//!
//! This table is the access-control policy for the client. Non-owner roles
//! still see contract totals and cost breakdowns; only profit and the
//! administrative actions are owner-gated.
//!
//! ```text
//! flag                     owner  ops
//! can_see_profit           yes    no
//! can_see_contract_total   yes    yes
//! can_see_cost_breakdown   yes    yes
//! can_manage_billing       yes    no
//! can_manage_team          yes    no
//! can_invite_members       yes    no
//! can_remove_members       yes    no
//! ```

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::role::{Role, RoleState};

/// Boolean capabilities granted to a role.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Permissions {
    pub can_see_profit: bool,
    pub can_see_contract_total: bool,
    pub can_see_cost_breakdown: bool,
    pub can_manage_billing: bool,
    pub can_manage_team: bool,
    pub can_invite_members: bool,
    pub can_remove_members: bool,
}

impl Permissions {
    #[must_use]
    pub const fn for_role(role: Role) -> Self {
        let owner = matches!(role, Role::Owner);
        Self {
            can_see_profit: owner,
            can_see_contract_total: true,
            can_see_cost_breakdown: true,
            can_manage_billing: owner,
            can_manage_team: owner,
            can_invite_members: owner,
            can_remove_members: owner,
        }
    }

    /// Flags in table order, paired with their camelCase names.
    #[must_use]
    pub const fn flags(&self) -> [(&'static str, bool); 7] {
        [
            ("canSeeProfit", self.can_see_profit),
            ("canSeeContractTotal", self.can_see_contract_total),
            ("canSeeCostBreakdown", self.can_see_cost_breakdown),
            ("canManageBilling", self.can_manage_billing),
            ("canManageTeam", self.can_manage_team),
            ("canInviteMembers", self.can_invite_members),
            ("canRemoveMembers", self.can_remove_members),
        ]
    }
}

/// What a UI may show for the current principal.
///
/// Computed on demand from the cached profile's role; never stored apart
/// from it. `provisional` is set while the role is unresolved or a load is
/// still running, in which case the flags are the least-privileged set and
/// must not be treated as authoritative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Access {
    pub role: RoleState,
    pub is_owner: bool,
    #[serde(flatten)]
    pub permissions: Permissions,
    pub provisional: bool,
}

impl Access {
    #[must_use]
    pub const fn derive(role: RoleState, loading: bool) -> Self {
        Self {
            role,
            is_owner: role.is_owner(),
            permissions: Permissions::for_role(role.effective()),
            provisional: loading || !role.is_resolved(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn owner_has_every_flag() {
        let perms = Permissions::for_role(Role::Owner);
        for (name, value) in perms.flags() {
            assert!(value, "{name} should be granted to owner");
        }
    }

    #[test]
    fn ops_sees_only_totals_and_cost_breakdown() {
        let granted: Vec<&str> = Permissions::for_role(Role::Ops)
            .flags()
            .into_iter()
            .filter_map(|(name, value)| value.then_some(name))
            .collect();
        assert_eq!(granted, vec!["canSeeContractTotal", "canSeeCostBreakdown"]);
    }

    #[rstest]
    #[case::profit("canSeeProfit", true, false)]
    #[case::contract_total("canSeeContractTotal", true, true)]
    #[case::cost_breakdown("canSeeCostBreakdown", true, true)]
    #[case::billing("canManageBilling", true, false)]
    #[case::team("canManageTeam", true, false)]
    #[case::invite("canInviteMembers", true, false)]
    #[case::remove("canRemoveMembers", true, false)]
    fn flag_table(#[case] flag: &str, #[case] owner: bool, #[case] ops: bool) {
        let lookup = |role| {
            Permissions::for_role(role)
                .flags()
                .into_iter()
                .find(|(name, _)| *name == flag)
                .map(|(_, value)| value)
                .unwrap()
        };
        assert_eq!(lookup(Role::Owner), owner);
        assert_eq!(lookup(Role::Ops), ops);
    }

    #[test]
    fn unresolved_role_is_least_privileged_and_provisional() {
        let access = Access::derive(RoleState::Unresolved, false);
        assert!(access.provisional);
        assert!(!access.is_owner);
        assert_eq!(access.permissions, Permissions::for_role(Role::Ops));
    }

    #[test]
    fn resolved_role_is_authoritative_once_loaded() {
        let access = Access::derive(RoleState::Resolved(Role::Owner), false);
        assert!(!access.provisional);
        assert!(access.is_owner);
        assert_eq!(access.permissions, Permissions::for_role(Role::Owner));
    }

    #[test]
    fn loading_marks_resolved_role_provisional() {
        let access = Access::derive(RoleState::Resolved(Role::Ops), true);
        assert!(access.provisional);
        assert!(!access.is_owner);
    }

    #[test]
    fn serializes_with_camel_case_flags() {
        let value = serde_json::to_value(Access::derive(Role::Ops.into(), false)).unwrap();
        assert_eq!(value["canSeeProfit"], serde_json::json!(false));
        assert_eq!(value["canSeeContractTotal"], serde_json::json!(true));
        assert_eq!(value["isOwner"], serde_json::json!(false));
    }
}
