//! Owner of the operator session. `AuthSession` is the single writer of the
//! session state; consumers hold `SessionWatch` handles.
//!
//! Every operation takes a generation ticket when it starts. A result is only
//! applied while its ticket is still the newest one, so a reconcile or login
//! that resolves after a logout cannot bring the session back.

use super::{
    service::{AuthService, UserService},
    state::{SessionState, SessionWatch},
    store::SessionStore,
    types::{Credentials, Registration, Token, UserProfile},
    SessionError, StoreError,
};
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

pub struct AuthSession {
    store: SessionStore,
    auth: Arc<dyn AuthService>,
    users: Arc<dyn UserService>,
    state: watch::Sender<SessionState>,
    generation: AtomicU64,
}

impl AuthSession {
    /// Builds an unauthenticated session. Call [`AuthSession::reconcile`] to
    /// pick up a persisted token.
    pub fn new(
        store: SessionStore,
        auth: Arc<dyn AuthService>,
        users: Arc<dyn UserService>,
    ) -> Self {
        let (state, _) = watch::channel(SessionState::unauthenticated());
        Self {
            store,
            auth,
            users,
            state,
            generation: AtomicU64::new(0),
        }
    }

    #[must_use]
    pub fn watch(&self) -> SessionWatch {
        SessionWatch::new(self.state.subscribe())
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    #[must_use]
    pub fn user(&self) -> Option<UserProfile> {
        self.state.borrow().user().cloned()
    }

    #[must_use]
    pub const fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Brings the in-memory state in line with the session store. Never
    /// fails: a token whose profile cannot be resolved is discarded.
    #[instrument(skip(self))]
    pub async fn reconcile(&self) {
        let ticket = self.begin();

        if self.store.token().is_none() {
            debug!("no stored token");
            self.commit(ticket, SessionState::unauthenticated(), |store| {
                store.clear_cached_profile()
            });
            return;
        }

        self.commit(ticket, SessionState::resolving(), |_| Ok(()));

        if let Some(profile) = self.store.cached_profile() {
            debug!(user_id = %profile.id, "session restored from cached profile");
            self.commit(ticket, SessionState::authenticated(profile), |_| Ok(()));
            return;
        }

        match self.users.fetch_self().await {
            Ok(profile) => {
                debug!(user_id = %profile.id, "session restored from remote profile");
                let cached = profile.clone();
                self.commit(ticket, SessionState::authenticated(profile), move |store| {
                    store.set_cached_profile(&cached)
                });
            }
            Err(err) => {
                info!("stored token rejected, signing out locally: {err}");
                self.commit(ticket, SessionState::unauthenticated(), SessionStore::clear);
            }
        }
    }

    /// Signs in, then resolves the operator profile.
    ///
    /// # Errors
    /// Returns the sign-in or profile error unchanged. The session is not
    /// authenticated and no profile is cached when this fails.
    #[instrument(skip(self, credentials), fields(email = %credentials.email))]
    pub async fn login(&self, credentials: &Credentials) -> Result<UserProfile, SessionError> {
        let ticket = self.begin();

        if let Err(err) = self.auth.sign_in(credentials).await {
            warn!("login failed: {err}");
            return Err(err);
        }
        let issued = self.store.token();

        let profile = match self.users.fetch_self().await {
            Ok(profile) => profile,
            Err(err) => {
                warn!("login succeeded but profile lookup failed: {err}");
                self.discard(issued.as_ref());
                self.commit(ticket, SessionState::unauthenticated(), |_| Ok(()));
                return Err(err);
            }
        };

        let cached = profile.clone();
        let applied = self.commit(
            ticket,
            SessionState::authenticated(profile.clone()),
            move |store| store.set_cached_profile(&cached),
        );
        if !applied {
            self.discard(issued.as_ref());
            return Err(SessionError::Auth("login superseded".to_string()));
        }

        info!(user_id = %profile.id, role = %profile.role, "logged in");
        Ok(profile)
    }

    /// Ends the session. The remote sign-out is best effort; local state is
    /// always cleared. Calling this while signed out only repeats the remote
    /// call.
    #[instrument(skip(self))]
    pub async fn logout(&self) {
        let ticket = self.begin();

        if let Err(err) = self.auth.sign_out().await {
            warn!("remote sign-out failed, clearing local session anyway: {err}");
        }

        if self.commit(ticket, SessionState::unauthenticated(), SessionStore::clear) {
            info!("logged out");
        }
    }

    /// Creates an account and treats the returned profile as signed in.
    ///
    /// # Errors
    /// Returns local validation errors or the sign-up error. The session is
    /// left untouched on failure.
    #[instrument(skip(self, registration), fields(email = %registration.email))]
    pub async fn register(&self, registration: &Registration) -> Result<UserProfile, SessionError> {
        registration.validate()?;
        let ticket = self.begin();

        let profile = match self.auth.sign_up(registration).await {
            Ok(profile) => profile,
            Err(err) => {
                warn!("registration failed: {err}");
                return Err(err);
            }
        };
        let issued = self.store.token();

        let cached = profile.clone();
        let applied = self.commit(
            ticket,
            SessionState::authenticated(profile.clone()),
            move |store| store.set_cached_profile(&cached),
        );
        if !applied {
            self.discard(issued.as_ref());
            return Err(SessionError::Auth("registration superseded".to_string()));
        }

        info!(user_id = %profile.id, role = %profile.role, "registered");
        Ok(profile)
    }

    /// Starts a new operation, invalidating any that is still in flight.
    fn begin(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Applies `next` and its store side effects if `ticket` is still current.
    /// Store failures are logged; the in-memory state is applied regardless.
    fn commit(
        &self,
        ticket: u64,
        next: SessionState,
        persist: impl FnOnce(&SessionStore) -> Result<(), StoreError>,
    ) -> bool {
        let mut applied = false;
        self.state.send_if_modified(|state| {
            if self.generation.load(Ordering::SeqCst) != ticket {
                debug!(ticket, "discarding stale session result");
                return false;
            }
            applied = true;

            if let Err(err) = persist(&self.store) {
                warn!("session store update failed: {err}");
            }

            if *state == next {
                return false;
            }
            *state = next;
            true
        });
        applied
    }

    /// Drops a token this session stored if nothing newer replaced it.
    fn discard(&self, issued: Option<&Token>) {
        let Some(token) = issued else {
            return;
        };
        if let Err(err) = self.store.discard_token(token) {
            warn!("failed to discard issued token: {err}");
        }
    }
}

impl std::fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSession")
            .field("state", &*self.state.borrow())
            .field("generation", &self.generation.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}
