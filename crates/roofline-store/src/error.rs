//! Record store error types.

use thiserror::Error;

/// Errors from record store reads.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// The request never produced a response (connect, TLS, timeout).
    #[error("transport error: {0}")]
    Transport(String),

    /// The backend answered with a non-success status.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// A row could not be decoded into the requested type.
    #[error("decode error: {0}")]
    Decode(String),

    /// The store cannot serve reads (not configured, injected failure).
    #[error("store unavailable: {0}")]
    Unavailable(String),
}
