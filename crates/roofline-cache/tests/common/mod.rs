//! Shared fixtures for roofline-cache integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use roofline_auth::{AuthError, SessionAccessor, StaticSession};
use roofline_cache::{ProfileCache, SessionContext, Tables};
use roofline_core::PrincipalId;
use roofline_store::{MemoryRecordStore, RecordStore};
use serde_json::json;

pub const PROFILES: &str = "profiles";
pub const ORGS: &str = "organizations";

pub fn principal(id: &str) -> PrincipalId {
    PrincipalId::new(id).unwrap()
}

/// Store with:
/// - `owner-1` (owner) and `ops-1`, `ops-2` (ops) in `org-1`
/// - `drifter` (ops) with no organization
pub fn seeded_store() -> Arc<MemoryRecordStore> {
    let store = Arc::new(MemoryRecordStore::new());
    store.insert(
        PROFILES,
        json!({"id": "ops-1", "full_name": "Jo Ops", "email": "jo@ridgeline.test", "role": "ops", "org_id": "org-1"}),
    );
    store.insert(
        PROFILES,
        json!({"id": "owner-1", "full_name": "Dana Owner", "email": "dana@ridgeline.test", "role": "owner", "org_id": "org-1"}),
    );
    store.insert(
        PROFILES,
        json!({"id": "ops-2", "full_name": "Lee Ops", "email": "lee@ridgeline.test", "role": "ops", "org_id": "org-1", "avatar_url": "avatars/lee.png"}),
    );
    store.insert(
        PROFILES,
        json!({"id": "drifter", "full_name": "New Signup", "email": "new@example.test", "role": "ops", "org_id": null}),
    );
    store.insert(
        ORGS,
        json!({"id": "org-1", "name": "Ridgeline Roofing", "default_margin_pct": 22}),
    );
    store
}

pub fn cache_with(session: &Arc<StaticSession>, store: &Arc<MemoryRecordStore>) -> ProfileCache {
    ProfileCache::new(
        Arc::clone(session) as Arc<dyn SessionAccessor>,
        Arc::clone(store) as Arc<dyn RecordStore>,
        Tables::default(),
    )
}

pub fn context_with(session: &Arc<StaticSession>, store: &Arc<MemoryRecordStore>) -> SessionContext {
    SessionContext::new(
        Arc::clone(session) as Arc<dyn SessionAccessor>,
        Arc::clone(store) as Arc<dyn RecordStore>,
        Tables::default(),
    )
}

pub fn signed_in(id: &str) -> Arc<StaticSession> {
    Arc::new(StaticSession::signed_in(principal(id)))
}

/// Session whose principal lookup always fails.
pub struct BrokenSession;

#[async_trait]
impl SessionAccessor for BrokenSession {
    async fn current_principal(&self) -> Result<Option<PrincipalId>, AuthError> {
        Err(AuthError::Backend("session endpoint unreachable".into()))
    }
}
