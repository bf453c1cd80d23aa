//! Organization roster.
//!
//! The roster is read on demand for the organization currently in the
//! profile cache. It is never served from cache: every call re-reads.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use roofline_core::OrgMember;
use roofline_store::{Filter, Order, fetch_many_as};

use crate::cache::ProfileCache;
use crate::error::CacheError;

/// Result of a roster load that did not fail.
#[derive(Debug, Clone, PartialEq)]
pub enum MembersOutcome {
    /// No organization is cached; nothing was read.
    NoOrganization,
    /// The fresh roster, which replaced the previous one.
    Loaded(Arc<Vec<OrgMember>>),
    /// The cache was invalidated while the read was in flight; the result
    /// was dropped.
    Discarded,
}

pub struct MembershipLoader {
    cache: Arc<ProfileCache>,
    roster: Mutex<Arc<Vec<OrgMember>>>,
}

impl MembershipLoader {
    #[must_use]
    pub fn new(cache: Arc<ProfileCache>) -> Self {
        Self {
            cache,
            roster: Mutex::new(Arc::new(Vec::new())),
        }
    }

    /// Last roster loaded (empty if none has been).
    #[must_use]
    pub fn members(&self) -> Arc<Vec<OrgMember>> {
        self.lock().clone()
    }

    /// Read all profiles of the cached organization, ordered by role.
    ///
    /// Members sharing a role come back in whatever order the store uses.
    ///
    /// # Errors
    ///
    /// Returns `CacheError::MembersFetch` if the read fails; the previous
    /// roster is kept.
    pub async fn load_members(&self) -> Result<MembersOutcome, CacheError> {
        let Some(org_id) = self.cache.snapshot().organization().map(|org| org.id.clone()) else {
            tracing::debug!("no cached organization; skipping member load");
            return Ok(MembersOutcome::NoOrganization);
        };
        let epoch = self.cache.epoch();

        let members = fetch_many_as::<OrgMember>(
            self.cache.store(),
            &self.cache.tables().profiles,
            &Filter::eq("org_id", org_id.as_str()),
            &Order::asc("role"),
        )
        .await
        .map_err(|source| {
            tracing::warn!(%org_id, error = %source, "member fetch failed");
            CacheError::MembersFetch {
                org_id: org_id.clone(),
                source,
            }
        })?;

        if self.cache.epoch() != epoch {
            tracing::debug!(%org_id, "discarding roster loaded before invalidation");
            return Ok(MembersOutcome::Discarded);
        }

        let members = Arc::new(members);
        *self.lock() = Arc::clone(&members);
        tracing::debug!(%org_id, count = members.len(), "loaded organization members");
        Ok(MembersOutcome::Loaded(members))
    }

    /// Forget the roster.
    pub fn clear(&self) {
        *self.lock() = Arc::new(Vec::new());
    }

    fn lock(&self) -> MutexGuard<'_, Arc<Vec<OrgMember>>> {
        self.roster.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
