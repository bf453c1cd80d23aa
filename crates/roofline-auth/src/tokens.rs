use base64::Engine as _;
use chrono::{DateTime, TimeDelta, Utc};
use roofline_core::PrincipalId;
use serde::{Deserialize, Serialize};

use crate::error::AuthError;

/// Tokens issued by the backend's auth service for one session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthTokens {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub token_type: String,
    pub expires_at: DateTime<Utc>,
}

impl AuthTokens {
    /// Check if the access token is expired or expires within `buffer_secs`.
    ///
    /// A buffer too large to represent counts every token as near expiry.
    #[must_use]
    pub fn is_near_expiry(&self, buffer_secs: i64) -> bool {
        seconds_from_now(buffer_secs).is_none_or(|threshold| self.expires_at <= threshold)
    }

    /// Principal named by the access token's `sub` claim.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` if the token cannot be decoded or
    /// carries an empty subject.
    pub fn principal(&self) -> Result<PrincipalId, AuthError> {
        let claims = decode_claims(&self.access_token)?;
        PrincipalId::new(claims.sub).map_err(|e| AuthError::InvalidToken(e.to_string()))
    }
}

/// Body returned by the token endpoint.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub expires_at: Option<i64>,
}

impl TokenResponse {
    pub(crate) fn into_tokens(self) -> Result<AuthTokens, AuthError> {
        let expires_at = resolve_expiry(&self.access_token, self.expires_at, self.expires_in)?;
        Ok(AuthTokens {
            access_token: self.access_token,
            refresh_token: self.refresh_token.filter(|t| !t.is_empty()),
            token_type: self.token_type.unwrap_or_else(|| "bearer".into()),
            expires_at,
        })
    }
}

/// Pick the expiry: absolute `expires_at`, then relative `expires_in`,
/// then the token's own `exp` claim.
pub(crate) fn resolve_expiry(
    access_token: &str,
    expires_at: Option<i64>,
    expires_in: Option<i64>,
) -> Result<DateTime<Utc>, AuthError> {
    if let Some(at) = expires_at {
        return DateTime::from_timestamp(at, 0)
            .ok_or_else(|| AuthError::InvalidToken(format!("invalid expires_at {at}")));
    }
    if let Some(secs) = expires_in {
        return seconds_from_now(secs)
            .ok_or_else(|| AuthError::InvalidToken(format!("invalid expires_in {secs}")));
    }
    let claims = decode_claims(access_token)?;
    DateTime::from_timestamp(claims.exp, 0)
        .ok_or_else(|| AuthError::InvalidToken("invalid exp timestamp".into()))
}

/// `now + secs`, or `None` if either step leaves chrono's range.
fn seconds_from_now(secs: i64) -> Option<DateTime<Utc>> {
    TimeDelta::try_seconds(secs).and_then(|delta| Utc::now().checked_add_signed(delta))
}

/// Claims read from an access token payload.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TokenClaims {
    pub sub: String,
    pub exp: i64,
    #[serde(default)]
    pub email: Option<String>,
}

/// Decode the JWT payload without verifying its signature.
///
/// Signature checks belong to the backend, which rejects forged tokens on
/// every request. This is only used to learn who the session belongs to and
/// when it expires.
///
/// # Errors
///
/// Returns `AuthError::InvalidToken` if the JWT format is invalid or the
/// `sub`/`exp` claims are missing.
pub fn decode_claims(jwt: &str) -> Result<TokenClaims, AuthError> {
    let parts: Vec<&str> = jwt.split('.').collect();
    if parts.len() != 3 {
        return Err(AuthError::InvalidToken("invalid JWT format".into()));
    }
    let payload = base64::engine::general_purpose::URL_SAFE_NO_PAD
        .decode(parts[1].trim_end_matches('='))
        .map_err(|e| AuthError::InvalidToken(format!("base64 decode failed: {e}")))?;
    serde_json::from_slice(&payload)
        .map_err(|e| AuthError::InvalidToken(format!("claims parse failed: {e}")))
}
