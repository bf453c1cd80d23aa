use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::CoreError;

/// Identifier of the authenticated session owner.
///
/// Opaque to Roofline: produced by the backend's auth service (the access
/// token `sub` claim) and matched against `profiles.id`. The profile cache
/// uses it as its validity key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct PrincipalId(String);

impl PrincipalId {
    /// Wrap a raw identifier.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Validation` if the identifier is empty or blank.
    pub fn new(id: impl Into<String>) -> Result<Self, CoreError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(CoreError::Validation(
                "principal identifier must not be empty".into(),
            ));
        }
        Ok(Self(id))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PrincipalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for PrincipalId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for PrincipalId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_blank_identifier() {
        assert!(PrincipalId::new("").is_err());
        assert!(PrincipalId::new("   ").is_err());
    }

    #[test]
    fn serializes_as_plain_string() {
        let id: PrincipalId = "3f1c2a9e-user".parse().unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"3f1c2a9e-user\"");
        assert_eq!(id.to_string(), "3f1c2a9e-user");
    }
}
