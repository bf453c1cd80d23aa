use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("not authenticated")]
    NotAuthenticated,

    #[error("session token expires within {buffer_secs}s, sign in again")]
    TokenExpired { buffer_secs: i64 },

    #[error("invalid access token: {0}")]
    InvalidToken(String),

    #[error("invalid auth callback: {0}")]
    InvalidCallback(String),

    #[error("sign-in was denied: {error}")]
    Denied {
        error: String,
        description: Option<String>,
    },

    #[error("auth backend error: {0}")]
    Backend(String),

    #[error("{0}")]
    Other(String),
}
