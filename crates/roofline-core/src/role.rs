//! Access tiers for a profile.
//!
//! `Role` is the value stored on the profile row. `RoleState` is what the
//! rest of the system sees before and after the profile loads: a permission
//! check made while the profile is still unknown is `Unresolved`, never an
//! authoritative `Ops`.

use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::CoreError;

/// Access tier stored on a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Full access, including profit, billing, and team administration.
    Owner,
    /// Operational access; profit and administrative actions are hidden.
    Ops,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::Ops => "ops",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "owner" => Ok(Self::Owner),
            "ops" => Ok(Self::Ops),
            other => Err(CoreError::Validation(format!("unknown role '{other}'"))),
        }
    }
}

/// Role of the current principal as far as the client knows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "state", content = "role", rename_all = "snake_case")]
pub enum RoleState {
    /// No profile has been loaded yet (or the load produced no profile).
    #[default]
    Unresolved,
    Resolved(Role),
}

impl RoleState {
    #[must_use]
    pub const fn is_owner(self) -> bool {
        matches!(self, Self::Resolved(Role::Owner))
    }

    #[must_use]
    pub const fn is_resolved(self) -> bool {
        matches!(self, Self::Resolved(_))
    }

    /// Role whose permissions apply: the resolved role, or the
    /// least-privileged `Ops` while unresolved.
    #[must_use]
    pub const fn effective(self) -> Role {
        match self {
            Self::Resolved(role) => role,
            Self::Unresolved => Role::Ops,
        }
    }

    #[must_use]
    pub const fn resolved(self) -> Option<Role> {
        match self {
            Self::Resolved(role) => Some(role),
            Self::Unresolved => None,
        }
    }
}

impl From<Role> for RoleState {
    fn from(role: Role) -> Self {
        Self::Resolved(role)
    }
}

impl From<Option<Role>> for RoleState {
    fn from(role: Option<Role>) -> Self {
        role.map_or(Self::Unresolved, Self::Resolved)
    }
}
