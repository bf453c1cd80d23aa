//! Session lifecycle: mutations, logout, and abandoned loads.

mod common;

use std::sync::Arc;

use common::{PROFILES, context_with, principal, seeded_store, signed_in};
use pretty_assertions::assert_eq;
use roofline_cache::{CacheSnapshot, MembersOutcome};
use roofline_core::Role;
use roofline_store::Filter;
use serde_json::json;

#[tokio::test]
async fn mutation_invalidates_and_next_load_sees_new_role() {
    let store = seeded_store();
    let context = context_with(&signed_in("ops-1"), &store);

    let before = context.load().await;
    assert!(!before.access().permissions.can_manage_team);
    context.load_members().await.unwrap();

    // Ownership transferred to ops-1.
    store.remove(PROFILES, &Filter::eq("id", "ops-1"));
    store.insert(
        PROFILES,
        json!({"id": "ops-1", "full_name": "Jo Ops", "role": "owner", "org_id": "org-1"}),
    );
    context.on_mutation();
    assert_eq!(context.snapshot(), CacheSnapshot::default());
    assert!(context.members().members().is_empty());

    let after = context.load().await;
    assert_eq!(after.profile().unwrap().role, Role::Owner);
    assert!(context.access().permissions.can_manage_team);
}

#[tokio::test]
async fn logout_clears_everything_observers_saw() {
    let store = seeded_store();
    let context = context_with(&signed_in("owner-1"), &store);
    context.load().await;
    assert!(matches!(
        context.load_members().await.unwrap(),
        MembersOutcome::Loaded(_)
    ));

    let cache = Arc::clone(context.cache());
    let observer = context.subscribe();
    context.logout();

    assert_eq!(cache.snapshot(), CacheSnapshot::default());
    assert_eq!(*observer.borrow(), CacheSnapshot::default());
}

#[tokio::test]
async fn logout_stops_an_in_flight_load() {
    let store = seeded_store();
    let context = context_with(&signed_in("owner-1"), &store);
    let mut observer = context.subscribe();
    store.hold_reads();

    let (snapshot, ()) = tokio::join!(context.load(), async {
        observer.wait_for(|s| s.loading).await.unwrap();
        context.logout();
    });
    store.open_gate();

    assert_eq!(snapshot, CacheSnapshot::default());
    assert_eq!(context.snapshot(), CacheSnapshot::default());
    assert_eq!(store.reads(PROFILES), 1);

    // Logged out for good: later loads read nothing.
    let again = context.load().await;
    assert_eq!(again, CacheSnapshot::default());
    assert_eq!(store.reads(PROFILES), 1);
}

#[tokio::test]
async fn abandoned_load_releases_its_flight() {
    let store = seeded_store();
    let context = context_with(&signed_in("owner-1"), &store);
    let cache = Arc::clone(context.cache());
    let mut observer = cache.subscribe();
    store.hold_reads();

    let loader = tokio::spawn({
        let cache = Arc::clone(&cache);
        async move { cache.load().await }
    });
    observer.wait_for(|s| s.loading).await.unwrap();
    loader.abort();
    assert!(loader.await.unwrap_err().is_cancelled());

    let abandoned = cache.snapshot();
    assert!(!abandoned.loading);
    assert!(abandoned.profile().is_none());

    store.open_gate();
    let snapshot = context.load().await;
    assert_eq!(snapshot.principal, Some(principal("owner-1")));
    assert_eq!(snapshot.profile().unwrap().role, Role::Owner);
}
