//! Auth callback handling.
//!
//! After sign-in the backend redirects to the callback route in one of two
//! shapes:
//!
//! ```text
//! PKCE:      /auth/callback?code=<auth code>
//! implicit:  /auth/callback#access_token=..&refresh_token=..&expires_in=3600&token_type=bearer
//! failure:   /auth/callback?error=access_denied&error_description=..
//! ```
//!
//! A PKCE code still has to be exchanged for tokens; the implicit shape
//! already carries them.

use std::collections::HashMap;

use roofline_config::BackendConfig;
use serde::Deserialize;

use crate::error::AuthError;
use crate::tokens::{AuthTokens, TokenResponse, resolve_expiry};

/// What a callback URL carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthCallback {
    /// Authorization code to exchange with the PKCE verifier.
    Code { code: String },
    /// Tokens delivered directly in the URL fragment.
    Implicit(AuthTokens),
    /// The provider or the backend refused the sign-in.
    Denied {
        error: String,
        description: Option<String>,
    },
}

/// Classify a callback URL (absolute, or just path + query + fragment).
///
/// # Errors
///
/// Returns `AuthError::InvalidCallback` if the URL carries neither a code,
/// tokens, nor an error, or if a parameter cannot be decoded or is out of
/// range.
pub fn parse_callback(url: &str) -> Result<AuthCallback, AuthError> {
    let (before_fragment, fragment) = url.split_once('#').unwrap_or((url, ""));
    let query = before_fragment.split_once('?').map_or("", |(_, q)| q);

    let query = parse_params(query)?;
    let fragment = parse_params(fragment)?;

    if let Some(error) = query.get("error").or_else(|| fragment.get("error")) {
        let description = query
            .get("error_description")
            .or_else(|| fragment.get("error_description"))
            .cloned();
        return Ok(AuthCallback::Denied {
            error: error.clone(),
            description,
        });
    }

    if let Some(code) = query.get("code").filter(|c| !c.is_empty()) {
        return Ok(AuthCallback::Code { code: code.clone() });
    }

    if let Some(access_token) = fragment.get("access_token").filter(|t| !t.is_empty()) {
        let expires_at = parse_int(&fragment, "expires_at")?;
        let expires_in = parse_int(&fragment, "expires_in")?;
        let expires_at = resolve_expiry(access_token, expires_at, expires_in)
            .map_err(|e| AuthError::InvalidCallback(e.to_string()))?;
        return Ok(AuthCallback::Implicit(AuthTokens {
            access_token: access_token.clone(),
            refresh_token: fragment
                .get("refresh_token")
                .filter(|t| !t.is_empty())
                .cloned(),
            token_type: fragment
                .get("token_type")
                .cloned()
                .unwrap_or_else(|| "bearer".into()),
            expires_at,
        }));
    }

    Err(AuthError::InvalidCallback(
        "callback carries no code, tokens, or error".into(),
    ))
}

/// Exchange a PKCE authorization code for session tokens.
///
/// # Errors
///
/// Returns `AuthError::Backend` if the request fails or the token endpoint
/// answers with a non-success status or an unreadable body.
pub async fn exchange_code(
    client: &reqwest::Client,
    backend: &BackendConfig,
    code: &str,
    code_verifier: &str,
) -> Result<AuthTokens, AuthError> {
    let url = format!("{}/auth/v1/token?grant_type=pkce", backend.base_url());
    let resp = client
        .post(&url)
        .header("apikey", &backend.anon_key)
        .json(&serde_json::json!({
            "auth_code": code,
            "code_verifier": code_verifier,
        }))
        .send()
        .await
        .map_err(|e| AuthError::Backend(format!("code exchange: {e}")))?;

    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        if let Ok(denied) = serde_json::from_str::<ErrorBody>(&body) {
            if let Some(error) = denied.error.or(denied.error_code) {
                return Err(AuthError::Denied {
                    error,
                    description: denied.error_description.or(denied.msg),
                });
            }
        }
        return Err(AuthError::Backend(format!(
            "code exchange: HTTP {status}: {body}"
        )));
    }

    let response: TokenResponse = resp
        .json()
        .await
        .map_err(|e| AuthError::Backend(format!("parse token response: {e}")))?;
    response.into_tokens()
}

/// Turn a callback URL into session tokens, exchanging the code if needed.
///
/// # Errors
///
/// Returns `AuthError::Denied` for error callbacks,
/// `AuthError::InvalidCallback` for a code callback without a verifier, and
/// any error from [`parse_callback`] or [`exchange_code`].
pub async fn complete_callback(
    client: &reqwest::Client,
    backend: &BackendConfig,
    url: &str,
    code_verifier: Option<&str>,
) -> Result<AuthTokens, AuthError> {
    match parse_callback(url)? {
        AuthCallback::Implicit(tokens) => {
            tracing::debug!("auth callback carried implicit-flow tokens");
            Ok(tokens)
        }
        AuthCallback::Code { code } => {
            let verifier = code_verifier.ok_or_else(|| {
                AuthError::InvalidCallback("code callback requires a PKCE verifier".into())
            })?;
            tracing::debug!("exchanging PKCE auth code");
            exchange_code(client, backend, &code, verifier).await
        }
        AuthCallback::Denied { error, description } => {
            tracing::warn!(%error, ?description, "sign-in denied");
            Err(AuthError::Denied { error, description })
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
    error_code: Option<String>,
    error_description: Option<String>,
    msg: Option<String>,
}

fn parse_params(raw: &str) -> Result<HashMap<String, String>, AuthError> {
    let mut params = HashMap::new();
    for pair in raw.split('&').filter(|p| !p.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        let value = urlencoding::decode(&value.replace('+', " "))
            .map_err(|e| AuthError::InvalidCallback(format!("URL decode of '{key}': {e}")))?
            .into_owned();
        params.insert(key.to_string(), value);
    }
    Ok(params)
}

fn parse_int(params: &HashMap<String, String>, key: &str) -> Result<Option<i64>, AuthError> {
    params
        .get(key)
        .map(|v| {
            v.parse::<i64>()
                .map_err(|e| AuthError::InvalidCallback(format!("invalid {key} '{v}': {e}")))
        })
        .transpose()
}
