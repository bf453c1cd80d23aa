//! Profile/organization cache.
//!
//! One cache per signed-in session. It remembers which principal it loaded
//! for and serves that principal's profile and organization until it is
//! invalidated or a different principal shows up.
//!
//! Load protocol:
//!
//! ```text
//! resolve principal ── none ──────────────────────────────▶ return as-is
//!        │
//!  load in flight? ── yes ─▶ wait ─▶ published for same principal? ─ yes ▶ return
//!        │ no                              │ no
//!        │                                 └──▶ start over
//!  cached for principal? ── yes ─────────────────────────▶ return (no reads)
//!        │ no
//!  mark in flight ─▶ read profile ─▶ read organization (if org_id) ─▶ publish
//! ```
//!
//! The in-flight marker is checked and set under one lock, so concurrent
//! callers share a single fetch. Invalidation bumps an epoch; a load that
//! finishes under an older epoch does not publish. A waiter whose flight
//! ended without publishing (cancelled, dropped, or invalidated) starts over
//! unless its own load was cancelled too.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use roofline_auth::SessionAccessor;
use roofline_config::BackendConfig;
use roofline_core::{Access, Organization, PrincipalId, Profile, RoleState};
use roofline_store::{Filter, RecordStore, fetch_one_as};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::lookup::Lookup;

/// Table names the cache and roster read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tables {
    pub profiles: String,
    pub organizations: String,
}

impl Default for Tables {
    fn default() -> Self {
        Self {
            profiles: "profiles".into(),
            organizations: "organizations".into(),
        }
    }
}

impl From<&BackendConfig> for Tables {
    fn from(config: &BackendConfig) -> Self {
        Self {
            profiles: config.profiles_table.clone(),
            organizations: config.organizations_table.clone(),
        }
    }
}

/// What observers see.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CacheSnapshot {
    /// Principal the profile and organization belong to.
    pub principal: Option<PrincipalId>,
    pub profile: Lookup<Profile>,
    pub organization: Lookup<Organization>,
    pub loading: bool,
}

impl CacheSnapshot {
    #[must_use]
    pub fn profile(&self) -> Option<Arc<Profile>> {
        self.profile.found().cloned()
    }

    #[must_use]
    pub fn organization(&self) -> Option<Arc<Organization>> {
        self.organization.found().cloned()
    }

    #[must_use]
    pub fn role_state(&self) -> RoleState {
        self.profile
            .found()
            .map_or(RoleState::Unresolved, |profile| profile.role_state())
    }

    /// Permission flags for the cached role, computed on every call.
    #[must_use]
    pub fn access(&self) -> Access {
        Access::derive(self.role_state(), self.loading)
    }
}

/// How a flight ended, as seen by its waiters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Settled {
    Published,
    Abandoned,
}

struct InFlight {
    id: u64,
    principal: PrincipalId,
    done: watch::Receiver<Option<Settled>>,
}

#[derive(Default)]
struct State {
    snapshot: CacheSnapshot,
    epoch: u64,
    next_flight: u64,
    in_flight: Option<InFlight>,
}

enum Step {
    Hit(CacheSnapshot),
    Wait {
        done: watch::Receiver<Option<Settled>>,
        principal: PrincipalId,
    },
    Fetch {
        flight: u64,
        epoch: u64,
        done: watch::Sender<Option<Settled>>,
    },
}

struct Fetched {
    profile: Lookup<Profile>,
    organization: Lookup<Organization>,
}

pub struct ProfileCache {
    session: Arc<dyn SessionAccessor>,
    store: Arc<dyn RecordStore>,
    tables: Tables,
    state: Mutex<State>,
    observers: watch::Sender<CacheSnapshot>,
}

impl ProfileCache {
    #[must_use]
    pub fn new(
        session: Arc<dyn SessionAccessor>,
        store: Arc<dyn RecordStore>,
        tables: Tables,
    ) -> Self {
        let (observers, _) = watch::channel(CacheSnapshot::default());
        Self {
            session,
            store,
            tables,
            state: Mutex::new(State::default()),
            observers,
        }
    }

    /// Receive every published snapshot.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CacheSnapshot> {
        self.observers.subscribe()
    }

    #[must_use]
    pub fn snapshot(&self) -> CacheSnapshot {
        self.lock().snapshot.clone()
    }

    #[must_use]
    pub fn access(&self) -> Access {
        self.snapshot().access()
    }

    /// Load the current principal's profile and organization, or serve them
    /// from cache.
    ///
    /// Never fails: an unauthenticated session leaves the cache untouched,
    /// and read failures are recorded as [`Lookup::Failed`].
    pub async fn load(&self) -> CacheSnapshot {
        self.load_with(&CancellationToken::new()).await
    }

    /// Like [`Self::load`], but gives up at the next suspension point once
    /// `cancel` fires. A cancelled load publishes nothing it fetched.
    pub async fn load_with(&self, cancel: &CancellationToken) -> CacheSnapshot {
        loop {
            if cancel.is_cancelled() {
                return self.snapshot();
            }
            let principal = match self.session.current_principal().await {
                Ok(Some(principal)) => principal,
                Ok(None) => {
                    tracing::debug!("no authenticated principal; skipping profile load");
                    return self.snapshot();
                }
                Err(error) => {
                    tracing::warn!(%error, "failed to resolve session principal; skipping profile load");
                    return self.snapshot();
                }
            };

            match self.begin(&principal) {
                Step::Hit(snapshot) => {
                    tracing::debug!(%principal, "profile cache hit");
                    return snapshot;
                }
                Step::Wait { done, principal: loading_for } => {
                    tracing::debug!(%principal, "profile load already in flight; waiting");
                    let settled = tokio::select! {
                        settled = wait_settled(done) => settled,
                        () = cancel.cancelled() => return self.snapshot(),
                    };
                    if loading_for != principal {
                        tracing::debug!(%principal, %loading_for, "finished load was for another principal; reloading");
                    } else if settled == Settled::Published {
                        return self.snapshot();
                    } else {
                        tracing::debug!(%principal, "awaited load ended without publishing; reloading");
                    }
                }
                Step::Fetch { flight, epoch, done } => {
                    let guard = FlightGuard {
                        cache: self,
                        flight,
                        epoch,
                        principal: principal.clone(),
                        done,
                        settled: false,
                    };
                    let fetched = tokio::select! {
                        fetched = self.fetch(&principal) => Some(fetched),
                        () = cancel.cancelled() => None,
                    };
                    return guard.settle(fetched);
                }
            }
        }
    }

    /// Drop everything cached and any in-flight marker.
    ///
    /// Call after any write that changes the signed-in user's role or
    /// organization, and on logout. A load still running when this is
    /// called will not publish its result.
    pub fn invalidate(&self) {
        let mut state = self.lock();
        state.epoch += 1;
        state.in_flight = None;
        state.snapshot = CacheSnapshot::default();
        tracing::debug!(epoch = state.epoch, "profile cache invalidated");
        self.publish(&state);
    }

    pub(crate) fn epoch(&self) -> u64 {
        self.lock().epoch
    }

    pub(crate) fn store(&self) -> &dyn RecordStore {
        &*self.store
    }

    pub(crate) const fn tables(&self) -> &Tables {
        &self.tables
    }

    fn begin(&self, principal: &PrincipalId) -> Step {
        let mut state = self.lock();

        if let Some(flight) = &state.in_flight {
            return Step::Wait {
                done: flight.done.clone(),
                principal: flight.principal.clone(),
            };
        }

        let cached_for_principal = state.snapshot.principal.as_ref() == Some(principal);
        if cached_for_principal && state.snapshot.profile.is_found() {
            return Step::Hit(state.snapshot.clone());
        }

        if !cached_for_principal {
            // Never let another principal's records sit next to this one.
            state.snapshot = CacheSnapshot {
                principal: Some(principal.clone()),
                ..CacheSnapshot::default()
            };
        }

        let (done, waiters) = watch::channel(None);
        state.next_flight += 1;
        let flight = state.next_flight;
        state.in_flight = Some(InFlight {
            id: flight,
            principal: principal.clone(),
            done: waiters,
        });
        state.snapshot.loading = true;
        self.publish(&state);

        Step::Fetch {
            flight,
            epoch: state.epoch,
            done,
        }
    }

    async fn fetch(&self, principal: &PrincipalId) -> Fetched {
        let profile = match fetch_one_as::<Profile>(
            self.store(),
            &self.tables.profiles,
            &Filter::eq("id", principal.as_str()),
        )
        .await
        {
            Ok(Some(profile)) => profile,
            Ok(None) => {
                tracing::debug!(%principal, "no profile for principal");
                return Fetched {
                    profile: Lookup::NotFound,
                    organization: Lookup::NotRequested,
                };
            }
            Err(error) => {
                tracing::warn!(%principal, %error, "profile fetch failed");
                return Fetched {
                    profile: Lookup::Failed(error.to_string()),
                    organization: Lookup::NotRequested,
                };
            }
        };

        let organization = match profile.org_id.as_deref() {
            None => Lookup::NotRequested,
            Some(org_id) => match fetch_one_as::<Organization>(
                self.store(),
                &self.tables.organizations,
                &Filter::eq("id", org_id),
            )
            .await
            {
                Ok(Some(org)) => Lookup::Found(Arc::new(org)),
                Ok(None) => {
                    tracing::warn!(%principal, org_id, "profile references a missing organization");
                    Lookup::NotFound
                }
                Err(error) => {
                    tracing::warn!(%principal, org_id, %error, "organization fetch failed");
                    Lookup::Failed(error.to_string())
                }
            },
        };

        Fetched {
            profile: Lookup::Found(Arc::new(profile)),
            organization,
        }
    }

    fn finish(
        &self,
        flight: u64,
        epoch: u64,
        principal: &PrincipalId,
        fetched: Option<Fetched>,
    ) -> (CacheSnapshot, Settled) {
        let mut state = self.lock();

        if state.epoch != epoch {
            tracing::debug!(%principal, "discarding profile load finished after invalidation");
            return (state.snapshot.clone(), Settled::Abandoned);
        }
        if state.in_flight.as_ref().is_some_and(|f| f.id == flight) {
            state.in_flight = None;
        }

        let settled = match fetched {
            Some(fetched) => {
                state.snapshot = CacheSnapshot {
                    principal: Some(principal.clone()),
                    profile: fetched.profile,
                    organization: fetched.organization,
                    loading: false,
                };
                Settled::Published
            }
            None => {
                tracing::debug!(%principal, "profile load cancelled");
                state.snapshot.loading = false;
                Settled::Abandoned
            }
        };

        self.publish(&state);
        (state.snapshot.clone(), settled)
    }

    fn publish(&self, state: &State) {
        self.observers.send_replace(state.snapshot.clone());
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Settles one flight exactly once: with its result, or as cancelled if
/// the loading future is dropped first.
struct FlightGuard<'a> {
    cache: &'a ProfileCache,
    flight: u64,
    epoch: u64,
    principal: PrincipalId,
    done: watch::Sender<Option<Settled>>,
    settled: bool,
}

impl FlightGuard<'_> {
    fn settle(mut self, fetched: Option<Fetched>) -> CacheSnapshot {
        self.settled = true;
        let (snapshot, settled) =
            self.cache
                .finish(self.flight, self.epoch, &self.principal, fetched);
        self.done.send_replace(Some(settled));
        snapshot
    }
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.cache
                .finish(self.flight, self.epoch, &self.principal, None);
            self.done.send_replace(Some(Settled::Abandoned));
        }
    }
}

async fn wait_settled(mut done: watch::Receiver<Option<Settled>>) -> Settled {
    // A closed channel means the loader vanished without settling.
    let settled = done.wait_for(Option::is_some).await.map(|value| *value);
    settled.ok().flatten().unwrap_or(Settled::Abandoned)
}
