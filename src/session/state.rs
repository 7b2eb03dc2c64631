//! In-memory session state and the read-only handle handed to consumers.

use super::types::{Role, UserProfile};
use tokio::sync::watch;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Unauthenticated,
    /// A token exists but the profile behind it has not been resolved yet.
    Resolving,
    Authenticated,
}

impl Phase {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unauthenticated => "unauthenticated",
            Self::Resolving => "resolving",
            Self::Authenticated => "authenticated",
        }
    }
}

/// Snapshot of the session. A user is present exactly when authenticated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionState {
    phase: Phase,
    user: Option<UserProfile>,
}

impl SessionState {
    #[must_use]
    pub const fn unauthenticated() -> Self {
        Self {
            phase: Phase::Unauthenticated,
            user: None,
        }
    }

    #[must_use]
    pub const fn resolving() -> Self {
        Self {
            phase: Phase::Resolving,
            user: None,
        }
    }

    #[must_use]
    pub const fn authenticated(user: UserProfile) -> Self {
        Self {
            phase: Phase::Authenticated,
            user: Some(user),
        }
    }

    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self.phase, Phase::Authenticated)
    }

    #[must_use]
    pub const fn user(&self) -> Option<&UserProfile> {
        self.user.as_ref()
    }

    #[must_use]
    pub fn role(&self) -> Option<Role> {
        self.user.as_ref().map(|user| user.role)
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::unauthenticated()
    }
}

/// Read side of the session. Any number of these may exist; only the
/// `AuthSession` that created them can change what they observe.
#[derive(Clone, Debug)]
pub struct SessionWatch {
    receiver: watch::Receiver<SessionState>,
}

impl SessionWatch {
    pub(super) const fn new(receiver: watch::Receiver<SessionState>) -> Self {
        Self { receiver }
    }

    #[must_use]
    pub fn current(&self) -> SessionState {
        self.receiver.borrow().clone()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.receiver.borrow().is_authenticated()
    }

    #[must_use]
    pub fn role(&self) -> Option<Role> {
        self.receiver.borrow().role()
    }

    /// Waits for the next state change and returns it, or `None` once the
    /// owning session has been dropped.
    pub async fn changed(&mut self) -> Option<SessionState> {
        self.receiver.changed().await.ok()?;
        Some(self.receiver.borrow_and_update().clone())
    }
}
