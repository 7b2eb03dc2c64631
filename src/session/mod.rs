//! Session core: token persistence, the operator session state machine and
//! role-based route guards.
//!
//! Flow Overview: on start [`AuthSession::reconcile`] restores a persisted
//! token, trusting the cached profile when present and asking the API
//! otherwise. Login signs in and then fetches the profile; registration
//! returns the profile directly. Logout always clears local state, whatever
//! the server says. Token values must never be logged.

mod error;
pub mod guard;
mod manager;
pub mod service;
mod state;
pub mod store;
pub mod types;

pub use error::{SessionError, StoreError};
pub use manager::AuthSession;
pub use service::{AuthService, UserService};
pub use state::{Phase, SessionState, SessionWatch};
pub use store::{FileStore, KeyValueStore, MemoryStore, SessionStore};
pub use types::{Credentials, Registration, Role, Token, UserProfile};
