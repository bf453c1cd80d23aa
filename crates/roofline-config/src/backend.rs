//! Backend-as-a-service connection settings.

use serde::{Deserialize, Serialize};

fn default_profiles_table() -> String {
    "profiles".into()
}

fn default_organizations_table() -> String {
    "organizations".into()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BackendConfig {
    /// Project URL, e.g. `https://abcd.supabase.co`.
    #[serde(default)]
    pub url: String,

    /// Public (anon) API key sent as the `apikey` header.
    #[serde(default)]
    pub anon_key: String,

    /// Table holding one row per user account.
    #[serde(default = "default_profiles_table")]
    pub profiles_table: String,

    /// Table holding one row per tenant.
    #[serde(default = "default_organizations_table")]
    pub organizations_table: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            anon_key: String::new(),
            profiles_table: default_profiles_table(),
            organizations_table: default_organizations_table(),
        }
    }
}

impl BackendConfig {
    /// Check if the backend config has the minimum required fields.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.url.is_empty() && !self.anon_key.is_empty()
    }

    /// Project URL without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.url.trim_end_matches('/')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_not_configured() {
        let config = BackendConfig::default();
        assert!(!config.is_configured());
        assert_eq!(config.profiles_table, "profiles");
        assert_eq!(config.organizations_table, "organizations");
    }

    #[test]
    fn configured_when_url_and_key_set() {
        let config = BackendConfig {
            url: "https://abcd.supabase.co/".into(),
            anon_key: "anon-123".into(),
            ..Default::default()
        };
        assert!(config.is_configured());
        assert_eq!(config.base_url(), "https://abcd.supabase.co");
    }

    #[test]
    fn not_configured_when_missing_key() {
        let config = BackendConfig {
            url: "https://abcd.supabase.co".into(),
            ..Default::default()
        };
        assert!(!config.is_configured());
    }
}
