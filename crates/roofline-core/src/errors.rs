//! Cross-cutting error types for Roofline.
//!
//! Domain-specific errors (`AuthError`, `StoreError`, `CacheError`) are
//! defined in their respective crates.

use thiserror::Error;

/// Errors that can be raised by any Roofline crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Data failed validation (unknown role, empty identifier, ...).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
