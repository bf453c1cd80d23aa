//! Cache error types.

use roofline_config::ConfigError;
use roofline_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheError {
    /// The roster read failed; the previous roster is kept.
    #[error("failed to load members of organization {org_id}: {source}")]
    MembersFetch {
        org_id: String,
        #[source]
        source: StoreError,
    },

    /// The backend section is missing or invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Tokens were handed to a context that does not own a token session.
    #[error("session context is not backed by a token session")]
    NotTokenBacked,

    /// The record store could not be constructed.
    #[error(transparent)]
    Store(#[from] StoreError),
}
