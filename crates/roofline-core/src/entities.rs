//! Rows read from the backend.
//!
//! Field names follow the backend's column names so rows deserialize
//! directly from the record store's JSON.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::identity::PrincipalId;
use crate::role::{Role, RoleState};

/// One user account. Created by the backend on signup; read-only here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Profile {
    /// Matches the principal identifier of the account owner.
    pub id: PrincipalId,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    pub role: Role,
    /// `None` until the user creates or joins an organization.
    #[serde(default)]
    pub org_id: Option<String>,
}

impl Profile {
    #[must_use]
    pub const fn role_state(&self) -> RoleState {
        RoleState::Resolved(self.role)
    }

    #[must_use]
    pub const fn is_owner(&self) -> bool {
        matches!(self.role, Role::Owner)
    }
}

/// A tenant workspace. A profile belongs to at most one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Organization {
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Remaining tenant-scoped columns, kept as-is.
    #[serde(flatten)]
    pub settings: serde_json::Map<String, serde_json::Value>,
}

impl Organization {
    /// Look up a tenant setting column by name.
    #[must_use]
    pub fn setting(&self, key: &str) -> Option<&serde_json::Value> {
        self.settings.get(key)
    }
}

/// Roster entry: a profile viewed as a member of an organization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct OrgMember {
    pub id: PrincipalId,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    pub role: Role,
    #[serde(default)]
    pub avatar_url: Option<String>,
}
