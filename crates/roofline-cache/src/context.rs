//! Session-scoped owner of the cache and roster.
//!
//! Build one when a session starts, hand `&SessionContext` (or the cache
//! `Arc`) to whatever needs profile data, and call
//! [`SessionContext::logout`] when the session ends. A logged-out context
//! stays empty: its loads return immediately without reading.

use std::sync::Arc;

use roofline_auth::{AuthTokens, SessionAccessor, TokenSession};
use roofline_config::RooflineConfig;
use roofline_core::Access;
use roofline_store::{RecordStore, RestRecordStore};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::cache::{CacheSnapshot, ProfileCache, Tables};
use crate::error::CacheError;
use crate::members::{MembersOutcome, MembershipLoader};

struct TokenBinding {
    session: Arc<TokenSession>,
    store: Arc<RestRecordStore>,
}

pub struct SessionContext {
    cache: Arc<ProfileCache>,
    members: MembershipLoader,
    cancel: CancellationToken,
    tokens: Option<TokenBinding>,
}

impl SessionContext {
    /// Context over any session accessor and record store.
    #[must_use]
    pub fn new(
        session: Arc<dyn SessionAccessor>,
        store: Arc<dyn RecordStore>,
        tables: Tables,
    ) -> Self {
        let cache = Arc::new(ProfileCache::new(session, store, tables));
        Self {
            members: MembershipLoader::new(Arc::clone(&cache)),
            cache,
            cancel: CancellationToken::new(),
            tokens: None,
        }
    }

    /// Context reading from the configured backend, signed in through
    /// [`Self::sign_in`].
    ///
    /// # Errors
    ///
    /// Returns `CacheError::Config` if the backend section is not
    /// configured.
    pub fn connect(config: &RooflineConfig) -> Result<Self, CacheError> {
        let backend = config.require_backend()?;
        let session = Arc::new(TokenSession::from_config(&config.auth));
        let store = Arc::new(RestRecordStore::new(backend)?);

        let mut context = Self::new(
            Arc::clone(&session) as Arc<dyn SessionAccessor>,
            Arc::clone(&store) as Arc<dyn RecordStore>,
            Tables::from(backend),
        );
        context.tokens = Some(TokenBinding { session, store });
        Ok(context)
    }

    /// Install tokens from a completed sign-in or refresh.
    ///
    /// The cache notices a changed principal on its next load.
    ///
    /// # Errors
    ///
    /// Returns `CacheError::NotTokenBacked` for contexts built with
    /// [`Self::new`].
    pub fn sign_in(&self, tokens: AuthTokens) -> Result<(), CacheError> {
        let binding = self.tokens.as_ref().ok_or(CacheError::NotTokenBacked)?;
        binding
            .store
            .set_access_token(Some(tokens.access_token.clone()));
        binding.session.sign_in(tokens);
        Ok(())
    }

    #[must_use]
    pub const fn cache(&self) -> &Arc<ProfileCache> {
        &self.cache
    }

    #[must_use]
    pub const fn members(&self) -> &MembershipLoader {
        &self.members
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CacheSnapshot> {
        self.cache.subscribe()
    }

    #[must_use]
    pub fn snapshot(&self) -> CacheSnapshot {
        self.cache.snapshot()
    }

    #[must_use]
    pub fn access(&self) -> Access {
        self.cache.access()
    }

    pub async fn load(&self) -> CacheSnapshot {
        self.cache.load_with(&self.cancel).await
    }

    /// # Errors
    ///
    /// See [`MembershipLoader::load_members`].
    pub async fn load_members(&self) -> Result<MembersOutcome, CacheError> {
        self.members.load_members().await
    }

    /// Invalidate after a write that changed the user's role or
    /// organization. The next [`Self::load`] re-reads everything.
    pub fn on_mutation(&self) {
        self.cache.invalidate();
        self.members.clear();
    }

    /// End the session: stop in-flight loads, drop the tokens, and clear
    /// every cached record.
    pub fn logout(&self) {
        self.cancel.cancel();
        if let Some(binding) = &self.tokens {
            binding.session.sign_out();
            binding.store.set_access_token(None);
        }
        self.cache.invalidate();
        self.members.clear();
        tracing::debug!("session context torn down");
    }
}
