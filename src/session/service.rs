//! Remote collaborators of the session core. The HTTP implementation lives in
//! `crate::api`; tests substitute in-process fakes.

use super::{
    types::{Credentials, Registration, UserProfile},
    SessionError,
};
use async_trait::async_trait;

#[async_trait]
pub trait AuthService: Send + Sync {
    /// Signs in and stores the issued token in the session store.
    async fn sign_in(&self, credentials: &Credentials) -> Result<(), SessionError>;

    /// Ends the session on the server. Callers treat failure as non-fatal.
    async fn sign_out(&self) -> Result<(), SessionError>;

    /// Creates an account, stores the issued token and returns the profile.
    async fn sign_up(&self, registration: &Registration) -> Result<UserProfile, SessionError>;
}

#[async_trait]
pub trait UserService: Send + Sync {
    /// Fetches the profile that owns the stored token.
    async fn fetch_self(&self) -> Result<UserProfile, SessionError>;
}
