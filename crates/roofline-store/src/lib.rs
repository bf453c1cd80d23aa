//! # roofline-store
//!
//! Read access to the backend's row storage.
//!
//! [`RecordStore`] is the narrow seam the profile cache and membership
//! loader read through. [`RestRecordStore`] talks to the backend's REST
//! endpoint; [`MemoryRecordStore`] keeps tables in memory and counts reads,
//! which is what the cache tests assert on.

pub mod error;
pub mod memory;
pub mod query;
pub mod rest;
pub mod store;

pub use error::StoreError;
pub use memory::MemoryRecordStore;
pub use query::{Filter, Order};
pub use rest::RestRecordStore;
pub use store::{RecordStore, fetch_many_as, fetch_one_as};
