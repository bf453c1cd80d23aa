//! Session accessors: where the cache learns who is signed in.

use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use roofline_core::PrincipalId;

use crate::error::AuthError;
use crate::tokens::AuthTokens;

/// Resolves the principal of the current session.
///
/// `Ok(None)` means nobody is signed in. Errors are treated as "nobody" by
/// callers that cannot act on them.
#[async_trait]
pub trait SessionAccessor: Send + Sync {
    async fn current_principal(&self) -> Result<Option<PrincipalId>, AuthError>;
}

/// Accessor over a principal the host already knows.
#[derive(Debug, Default)]
pub struct StaticSession {
    principal: RwLock<Option<PrincipalId>>,
}

impl StaticSession {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            principal: RwLock::new(None),
        }
    }

    #[must_use]
    pub const fn signed_in(principal: PrincipalId) -> Self {
        Self {
            principal: RwLock::new(Some(principal)),
        }
    }

    pub fn sign_in(&self, principal: PrincipalId) {
        *self.principal.write().unwrap_or_else(PoisonError::into_inner) = Some(principal);
    }

    pub fn sign_out(&self) {
        *self.principal.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

#[async_trait]
impl SessionAccessor for StaticSession {
    async fn current_principal(&self) -> Result<Option<PrincipalId>, AuthError> {
        Ok(self
            .principal
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }
}

/// Accessor backed by the tokens of the current sign-in.
///
/// The principal is the access token's `sub` claim. A token at or near
/// expiry counts as signed out; refreshing it is the host's job (hand the
/// new tokens to [`TokenSession::sign_in`]).
#[derive(Debug)]
pub struct TokenSession {
    tokens: RwLock<Option<AuthTokens>>,
    expiry_buffer_secs: i64,
}

impl TokenSession {
    #[must_use]
    pub const fn new(expiry_buffer_secs: i64) -> Self {
        Self {
            tokens: RwLock::new(None),
            expiry_buffer_secs,
        }
    }

    #[must_use]
    pub fn from_config(config: &roofline_config::AuthConfig) -> Self {
        Self::new(config.expiry_buffer_secs)
    }

    /// Replace the session tokens (after sign-in or a refresh).
    pub fn sign_in(&self, tokens: AuthTokens) {
        *self.tokens.write().unwrap_or_else(PoisonError::into_inner) = Some(tokens);
    }

    pub fn sign_out(&self) {
        *self.tokens.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    #[must_use]
    pub fn tokens(&self) -> Option<AuthTokens> {
        self.tokens
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Tokens of the current sign-in, if they are not at or near expiry.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::NotAuthenticated` when nobody is signed in and
    /// `AuthError::TokenExpired` when the tokens are inside the expiry
    /// buffer.
    pub fn live_tokens(&self) -> Result<AuthTokens, AuthError> {
        let tokens = self.tokens().ok_or(AuthError::NotAuthenticated)?;
        if tokens.is_near_expiry(self.expiry_buffer_secs) {
            return Err(AuthError::TokenExpired {
                buffer_secs: self.expiry_buffer_secs,
            });
        }
        Ok(tokens)
    }

    /// Access token for backend requests.
    ///
    /// # Errors
    ///
    /// See [`Self::live_tokens`].
    pub fn access_token(&self) -> Result<String, AuthError> {
        self.live_tokens().map(|t| t.access_token)
    }
}

#[async_trait]
impl SessionAccessor for TokenSession {
    async fn current_principal(&self) -> Result<Option<PrincipalId>, AuthError> {
        match self.live_tokens() {
            Ok(tokens) => tokens.principal().map(Some),
            Err(AuthError::NotAuthenticated) => Ok(None),
            Err(error @ AuthError::TokenExpired { .. }) => {
                let expires_at = self.tokens().map(|t| t.expires_at);
                tracing::warn!(?expires_at, %error, "treating expiring session as signed out");
                Ok(None)
            }
            Err(error) => Err(error),
        }
    }
}
