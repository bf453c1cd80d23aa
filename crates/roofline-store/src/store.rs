use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::error::StoreError;
use crate::query::{Filter, Order};

/// Row-level reads against the backend's tables.
///
/// Rows are returned as JSON; use [`fetch_one_as`] / [`fetch_many_as`] to
/// decode them.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// First row of `table` matching `filter`, if any.
    async fn fetch_one(
        &self,
        table: &str,
        filter: &Filter,
    ) -> Result<Option<serde_json::Value>, StoreError>;

    /// All rows of `table` matching `filter`, sorted by `order`. Rows that
    /// tie on the order column come back in the store's natural order.
    async fn fetch_many(
        &self,
        table: &str,
        filter: &Filter,
        order: &Order,
    ) -> Result<Vec<serde_json::Value>, StoreError>;
}

/// Fetch one row and decode it.
///
/// # Errors
///
/// Propagates the store's error, or `StoreError::Decode` if the row does not
/// match `T`.
pub async fn fetch_one_as<T: DeserializeOwned>(
    store: &dyn RecordStore,
    table: &str,
    filter: &Filter,
) -> Result<Option<T>, StoreError> {
    store
        .fetch_one(table, filter)
        .await?
        .map(|row| decode(table, row))
        .transpose()
}

/// Fetch many rows and decode each one.
///
/// # Errors
///
/// Propagates the store's error, or `StoreError::Decode` if any row does not
/// match `T`.
pub async fn fetch_many_as<T: DeserializeOwned>(
    store: &dyn RecordStore,
    table: &str,
    filter: &Filter,
    order: &Order,
) -> Result<Vec<T>, StoreError> {
    store
        .fetch_many(table, filter, order)
        .await?
        .into_iter()
        .map(|row| decode(table, row))
        .collect()
}

fn decode<T: DeserializeOwned>(table: &str, row: serde_json::Value) -> Result<T, StoreError> {
    serde_json::from_value(row).map_err(|e| StoreError::Decode(format!("{table}: {e}")))
}
