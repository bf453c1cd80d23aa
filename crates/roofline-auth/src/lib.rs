//! # roofline-auth
//!
//! Session access for Roofline.
//!
//! Provides the [`SessionAccessor`] seam the profile cache reads the current
//! principal through, a token-backed implementation, PKCE sign-in helpers,
//! and auth callback handling (PKCE code exchange vs. implicit-flow
//! fragment tokens).

pub mod callback;
pub mod error;
pub mod pkce;
pub mod session;
pub mod tokens;

pub use callback::{AuthCallback, complete_callback, exchange_code, parse_callback};
pub use error::AuthError;
pub use pkce::{PkcePair, authorize_url, sign_in_url};
pub use session::{SessionAccessor, StaticSession, TokenSession};
pub use tokens::{AuthTokens, TokenClaims, decode_claims};
