//! REST record store.
//!
//! Speaks the backend's PostgREST dialect:
//!
//! ```text
//! GET {url}/rest/v1/{table}?select=*&{column}=eq.{value}&order={column}.asc[&limit=1]
//! apikey: <anon key>
//! Authorization: Bearer <session access token, or the anon key when signed out>
//! ```
//!
//! Row-level security on the backend decides what the bearer may see.

use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use roofline_config::BackendConfig;

use crate::error::StoreError;
use crate::query::{Filter, Order};
use crate::store::RecordStore;

pub struct RestRecordStore {
    client: reqwest::Client,
    base_url: String,
    anon_key: String,
    bearer: RwLock<Option<String>>,
}

impl RestRecordStore {
    /// Build a store from the backend section of the config.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Unavailable` if the backend URL or key is missing.
    pub fn new(backend: &BackendConfig) -> Result<Self, StoreError> {
        Self::with_client(reqwest::Client::new(), backend)
    }

    /// # Errors
    ///
    /// Returns `StoreError::Unavailable` if the backend URL or key is missing.
    pub fn with_client(client: reqwest::Client, backend: &BackendConfig) -> Result<Self, StoreError> {
        if !backend.is_configured() {
            return Err(StoreError::Unavailable(
                "backend url and anon_key must be configured".into(),
            ));
        }
        Ok(Self {
            client,
            base_url: backend.base_url().to_string(),
            anon_key: backend.anon_key.clone(),
            bearer: RwLock::new(None),
        })
    }

    /// Use `token` as the bearer for subsequent reads; `None` falls back to
    /// the anon key.
    pub fn set_access_token(&self, token: Option<String>) {
        *self.bearer.write().unwrap_or_else(PoisonError::into_inner) = token;
    }

    fn bearer(&self) -> String {
        self.bearer
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .unwrap_or_else(|| self.anon_key.clone())
    }

    fn table_url(&self, table: &str, filter: &Filter, order: Option<&Order>, limit: Option<u32>) -> String {
        let mut url = format!(
            "{base}/rest/v1/{table}?select=*&{column}=eq.{value}",
            base = self.base_url,
            table = urlencoding::encode(table),
            column = urlencoding::encode(&filter.column),
            value = urlencoding::encode(&filter.value),
        );
        if let Some(order) = order {
            let direction = if order.ascending { "asc" } else { "desc" };
            url.push_str(&format!(
                "&order={}.{direction}",
                urlencoding::encode(&order.column)
            ));
        }
        if let Some(limit) = limit {
            url.push_str(&format!("&limit={limit}"));
        }
        url
    }

    async fn get_rows(&self, url: &str) -> Result<Vec<serde_json::Value>, StoreError> {
        let resp = self
            .client
            .get(url)
            .header("apikey", &self.anon_key)
            .header("Authorization", format!("Bearer {}", self.bearer()))
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(StoreError::Http { status, body });
        }

        resp.json()
            .await
            .map_err(|e| StoreError::Decode(format!("response body: {e}")))
    }
}

#[async_trait]
impl RecordStore for RestRecordStore {
    async fn fetch_one(
        &self,
        table: &str,
        filter: &Filter,
    ) -> Result<Option<serde_json::Value>, StoreError> {
        let url = self.table_url(table, filter, None, Some(1));
        tracing::debug!(table, column = %filter.column, "fetching one row");
        Ok(self.get_rows(&url).await?.into_iter().next())
    }

    async fn fetch_many(
        &self,
        table: &str,
        filter: &Filter,
        order: &Order,
    ) -> Result<Vec<serde_json::Value>, StoreError> {
        let url = self.table_url(table, filter, Some(order), None);
        tracing::debug!(table, column = %filter.column, order = %order.column, "fetching rows");
        self.get_rows(&url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> RestRecordStore {
        RestRecordStore::new(&BackendConfig {
            url: "https://abcd.supabase.co/".into(),
            anon_key: "anon".into(),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn unconfigured_backend_is_rejected() {
        let result = RestRecordStore::new(&BackendConfig::default());
        assert!(matches!(result, Err(StoreError::Unavailable(_))));
    }

    #[test]
    fn single_row_url_is_limited() {
        let url = store().table_url("profiles", &Filter::eq("id", "user 1"), None, Some(1));
        assert_eq!(
            url,
            "https://abcd.supabase.co/rest/v1/profiles?select=*&id=eq.user%201&limit=1"
        );
    }

    #[test]
    fn many_rows_url_is_ordered() {
        let url = store().table_url(
            "profiles",
            &Filter::eq("org_id", "org-1"),
            Some(&Order::asc("role")),
            None,
        );
        assert_eq!(
            url,
            "https://abcd.supabase.co/rest/v1/profiles?select=*&org_id=eq.org-1&order=role.asc"
        );
    }

    #[test]
    fn bearer_falls_back_to_anon_key() {
        let store = store();
        assert_eq!(store.bearer(), "anon");
        store.set_access_token(Some("jwt-1".into()));
        assert_eq!(store.bearer(), "jwt-1");
        store.set_access_token(None);
        assert_eq!(store.bearer(), "anon");
    }
}
