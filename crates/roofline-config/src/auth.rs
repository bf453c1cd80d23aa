//! Session and sign-in settings.

use serde::{Deserialize, Serialize};

const fn default_expiry_buffer_secs() -> i64 {
    60
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    /// Tokens expiring within this many seconds are treated as signed out.
    #[serde(default = "default_expiry_buffer_secs")]
    pub expiry_buffer_secs: i64,

    /// Where the backend redirects after sign-in (the auth callback route).
    #[serde(default)]
    pub redirect_url: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            expiry_buffer_secs: default_expiry_buffer_secs(),
            redirect_url: String::new(),
        }
    }
}
