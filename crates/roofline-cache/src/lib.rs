//! # roofline-cache
//!
//! Client-side profile and organization cache for Roofline.
//!
//! - [`ProfileCache`]: the signed-in principal's profile and organization,
//!   loaded once per principal with single-flight coordination, observable
//!   through a `watch` channel, and invalidated explicitly.
//! - [`MembershipLoader`]: on-demand roster of the cached organization.
//! - [`SessionContext`]: owns both for the lifetime of one session.
//!
//! Permission flags are never stored; [`CacheSnapshot::access`] derives them
//! from the cached role each time.

pub mod cache;
pub mod context;
pub mod error;
pub mod lookup;
pub mod members;

pub use cache::{CacheSnapshot, ProfileCache, Tables};
pub use context::SessionContext;
pub use error::CacheError;
pub use lookup::Lookup;
pub use members::{MembersOutcome, MembershipLoader};
