//! PKCE verifier/challenge pairs for the authorization-code sign-in flow.

use base64::Engine as _;
use roofline_config::RooflineConfig;
use sha2::{Digest, Sha256};

use crate::error::AuthError;

/// Challenge method sent to the authorize endpoint.
pub const CHALLENGE_METHOD: &str = "s256";

/// A code verifier and its S256 challenge.
///
/// The verifier must be kept by the host until the callback arrives and is
/// passed to [`crate::callback::exchange_code`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PkcePair {
    pub verifier: String,
    pub challenge: String,
}

impl PkcePair {
    /// Generate a fresh pair from 32 random bytes.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Other` if the OS random source is unavailable.
    pub fn generate() -> Result<Self, AuthError> {
        let mut bytes = [0u8; 32];
        getrandom::fill(&mut bytes)
            .map_err(|e| AuthError::Other(format!("failed to generate PKCE verifier: {e}")))?;
        Ok(Self::from_verifier(
            base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes),
        ))
    }

    #[must_use]
    pub fn from_verifier(verifier: String) -> Self {
        let digest = Sha256::digest(verifier.as_bytes());
        let challenge = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(digest);
        Self {
            verifier,
            challenge,
        }
    }
}

/// URL that starts an OAuth sign-in with `provider` and returns to
/// `redirect_url` with a `code` parameter.
#[must_use]
pub fn authorize_url(base_url: &str, provider: &str, redirect_url: &str, pair: &PkcePair) -> String {
    format!(
        "{base}/auth/v1/authorize?provider={provider}&redirect_to={redirect}&code_challenge={challenge}&code_challenge_method={CHALLENGE_METHOD}",
        base = base_url.trim_end_matches('/'),
        provider = urlencoding::encode(provider),
        redirect = urlencoding::encode(redirect_url),
        challenge = pair.challenge,
    )
}

/// [`authorize_url`] for the configured backend and callback route.
///
/// # Errors
///
/// Returns `AuthError::Other` if the backend is not configured or
/// `auth.redirect_url` is empty.
pub fn sign_in_url(
    config: &RooflineConfig,
    provider: &str,
    pair: &PkcePair,
) -> Result<String, AuthError> {
    let backend = config
        .require_backend()
        .map_err(|e| AuthError::Other(e.to_string()))?;
    if config.auth.redirect_url.is_empty() {
        return Err(AuthError::Other(
            "auth.redirect_url must be configured to start a sign-in".into(),
        ));
    }
    Ok(authorize_url(
        backend.base_url(),
        provider,
        &config.auth.redirect_url,
        pair,
    ))
}
