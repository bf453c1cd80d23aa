//! Roster loading for the cached organization.

mod common;

use common::{ORGS, PROFILES, cache_with, seeded_store, signed_in};
use pretty_assertions::assert_eq;
use roofline_cache::{CacheError, MembersOutcome, MembershipLoader};
use roofline_core::Role;
use roofline_store::StoreError;
use serde_json::json;
use std::sync::Arc;

fn loader_for(who: &str, store: &Arc<roofline_store::MemoryRecordStore>) -> MembershipLoader {
    MembershipLoader::new(Arc::new(cache_with(&signed_in(who), store)))
}

fn ids(members: &[roofline_core::OrgMember]) -> Vec<&str> {
    members.iter().map(|m| m.id.as_str()).collect()
}

#[tokio::test]
async fn loads_members_of_cached_org_grouped_by_role() {
    let store = seeded_store();
    let cache = Arc::new(cache_with(&signed_in("owner-1"), &store));
    let loader = MembershipLoader::new(Arc::clone(&cache));
    cache.load().await;

    let MembersOutcome::Loaded(members) = loader.load_members().await.unwrap() else {
        panic!("expected a roster");
    };

    assert_eq!(members.len(), 3);
    let mut sorted = ids(&members);
    sorted.sort_unstable();
    assert_eq!(sorted, vec!["ops-1", "ops-2", "owner-1"]);
    // Same-role members are adjacent; their relative order is the store's.
    let roles: Vec<Role> = members.iter().map(|m| m.role).collect();
    assert!(roles.windows(3).all(|w| w[0] == w[1] || w[1] == w[2]));
    assert!(!members.iter().any(|m| m.id.as_str() == "drifter"));
    assert_eq!(loader.members(), members);

    let lee = members.iter().find(|m| m.id.as_str() == "ops-2").unwrap();
    assert_eq!(lee.avatar_url.as_deref(), Some("avatars/lee.png"));
}

#[tokio::test]
async fn no_cached_org_is_a_no_op() {
    let store = seeded_store();
    let cache = Arc::new(cache_with(&signed_in("drifter"), &store));
    let loader = MembershipLoader::new(Arc::clone(&cache));
    cache.load().await;
    let reads_before = store.total_reads();

    let outcome = loader.load_members().await.unwrap();

    assert_eq!(outcome, MembersOutcome::NoOrganization);
    assert_eq!(store.total_reads(), reads_before);
    assert!(loader.members().is_empty());
}

#[tokio::test]
async fn nothing_loaded_yet_is_a_no_op() {
    let store = seeded_store();
    let loader = loader_for("owner-1", &store);
    assert_eq!(
        loader.load_members().await.unwrap(),
        MembersOutcome::NoOrganization
    );
    assert_eq!(store.total_reads(), 0);
}

#[tokio::test]
async fn failed_org_fetch_means_no_roster() {
    let store = seeded_store();
    store.fail_table(ORGS);
    let cache = Arc::new(cache_with(&signed_in("owner-1"), &store));
    let loader = MembershipLoader::new(Arc::clone(&cache));
    cache.load().await;

    assert_eq!(
        loader.load_members().await.unwrap(),
        MembersOutcome::NoOrganization
    );
}

#[tokio::test]
async fn every_call_re_reads_and_replaces() {
    let store = seeded_store();
    let cache = Arc::new(cache_with(&signed_in("owner-1"), &store));
    let loader = MembershipLoader::new(Arc::clone(&cache));
    cache.load().await;
    let profile_reads = store.reads(PROFILES);

    loader.load_members().await.unwrap();
    store.insert(
        PROFILES,
        json!({"id": "ops-3", "full_name": "Kai New", "role": "ops", "org_id": "org-1"}),
    );
    let MembersOutcome::Loaded(members) = loader.load_members().await.unwrap() else {
        panic!("expected a roster");
    };

    assert_eq!(store.reads(PROFILES), profile_reads + 2);
    assert_eq!(members.len(), 4);
    assert_eq!(loader.members().len(), 4);
}

#[tokio::test]
async fn failure_keeps_last_known_roster() {
    let store = seeded_store();
    let cache = Arc::new(cache_with(&signed_in("owner-1"), &store));
    let loader = MembershipLoader::new(Arc::clone(&cache));
    cache.load().await;
    loader.load_members().await.unwrap();

    store.fail_table(PROFILES);
    let error = loader.load_members().await.unwrap_err();

    match error {
        CacheError::MembersFetch { org_id, source } => {
            assert_eq!(org_id, "org-1");
            assert!(matches!(source, StoreError::Unavailable(_)));
        }
        other => panic!("expected MembersFetch, got {other:?}"),
    }
    assert_eq!(loader.members().len(), 3);
}

#[tokio::test]
async fn roster_read_across_invalidation_is_discarded() {
    let store = seeded_store();
    let cache = Arc::new(cache_with(&signed_in("owner-1"), &store));
    let loader = MembershipLoader::new(Arc::clone(&cache));
    cache.load().await;
    store.hold_reads();

    let (outcome, ()) = tokio::join!(loader.load_members(), async {
        tokio::task::yield_now().await;
        cache.invalidate();
        store.release_reads(1);
    });

    assert_eq!(outcome.unwrap(), MembersOutcome::Discarded);
    assert!(loader.members().is_empty());
}
