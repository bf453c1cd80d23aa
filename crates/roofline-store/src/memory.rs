//! In-memory record store.
//!
//! Tables are plain JSON rows in insertion order. Every read is counted per
//! table, tables can be made to fail, and reads can be held at a gate until
//! released, so callers can observe exactly how many reads a component
//! issued and what happens while one is still in flight.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use tokio::sync::Semaphore;

use crate::error::StoreError;
use crate::query::{Filter, Order, scalar_text};
use crate::store::RecordStore;

#[derive(Default)]
pub struct MemoryRecordStore {
    tables: Mutex<HashMap<String, Vec<serde_json::Value>>>,
    reads: Mutex<HashMap<String, usize>>,
    failing: Mutex<HashSet<String>>,
    gate: Mutex<Option<Arc<Semaphore>>>,
}

impl MemoryRecordStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a row to `table`.
    pub fn insert(&self, table: &str, row: serde_json::Value) {
        lock(&self.tables).entry(table.to_string()).or_default().push(row);
    }

    /// Drop every row of `table` matching `filter`.
    pub fn remove(&self, table: &str, filter: &Filter) {
        if let Some(rows) = lock(&self.tables).get_mut(table) {
            rows.retain(|row| !filter.matches(row));
        }
    }

    /// Make every read of `table` fail with `StoreError::Unavailable`.
    pub fn fail_table(&self, table: &str) {
        lock(&self.failing).insert(table.to_string());
    }

    pub fn heal_table(&self, table: &str) {
        lock(&self.failing).remove(table);
    }

    /// Number of reads issued against `table` so far.
    #[must_use]
    pub fn reads(&self, table: &str) -> usize {
        lock(&self.reads).get(table).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn total_reads(&self) -> usize {
        lock(&self.reads).values().sum()
    }

    /// Hold every subsequent read until [`Self::release_reads`] lets it pass.
    pub fn hold_reads(&self) {
        *lock(&self.gate) = Some(Arc::new(Semaphore::new(0)));
    }

    /// Let `count` held reads proceed.
    pub fn release_reads(&self, count: usize) {
        if let Some(gate) = lock(&self.gate).as_ref() {
            gate.add_permits(count);
        }
    }

    /// Stop holding reads; reads already waiting proceed.
    pub fn open_gate(&self) {
        if let Some(gate) = lock(&self.gate).take() {
            gate.close();
        }
    }

    async fn begin_read(&self, table: &str) -> Result<(), StoreError> {
        *lock(&self.reads).entry(table.to_string()).or_default() += 1;

        let gate = lock(&self.gate).clone();
        if let Some(gate) = gate {
            // A closed gate means it was opened for good.
            if let Ok(permit) = gate.acquire().await {
                permit.forget();
            }
        }

        if lock(&self.failing).contains(table) {
            return Err(StoreError::Unavailable(format!("table '{table}' is failing")));
        }
        Ok(())
    }

    fn matching(&self, table: &str, filter: &Filter) -> Vec<serde_json::Value> {
        lock(&self.tables)
            .get(table)
            .map(|rows| rows.iter().filter(|row| filter.matches(row)).cloned().collect())
            .unwrap_or_default()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn fetch_one(
        &self,
        table: &str,
        filter: &Filter,
    ) -> Result<Option<serde_json::Value>, StoreError> {
        self.begin_read(table).await?;
        Ok(self.matching(table, filter).into_iter().next())
    }

    async fn fetch_many(
        &self,
        table: &str,
        filter: &Filter,
        order: &Order,
    ) -> Result<Vec<serde_json::Value>, StoreError> {
        self.begin_read(table).await?;
        let mut rows = self.matching(table, filter);
        let key = |row: &serde_json::Value| row.get(&order.column).and_then(scalar_text);
        // Stable sort keeps insertion order among ties.
        rows.sort_by(|a, b| {
            let ordering = key(a).cmp(&key(b));
            if order.ascending { ordering } else { ordering.reverse() }
        });
        Ok(rows)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
