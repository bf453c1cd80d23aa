//! # roofline-core
//!
//! Core types shared across all Roofline crates:
//! - Principal identifier (the cache validity key)
//! - Profile, organization, and roster entities as read from the backend
//! - Role model with an explicit unresolved state
//! - Permission derivation from a role
//! - Cross-cutting error types

pub mod entities;
pub mod errors;
pub mod identity;
pub mod permissions;
pub mod role;

pub use entities::{OrgMember, Organization, Profile};
pub use errors::CoreError;
pub use identity::PrincipalId;
pub use permissions::{Access, Permissions};
pub use role::{Role, RoleState};
