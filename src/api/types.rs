//! Wire payloads for the `/users` auth endpoints. Requests carry passwords and
//! responses carry tokens, so none of these types are ever logged.

use crate::session::{Role, UserProfile};
use serde::{Deserialize, Serialize};

#[derive(Serialize)]
pub struct SignInRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Serialize)]
pub struct SignUpRequest<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
    #[serde(rename = "passwordConfirm")]
    pub password_confirm: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

#[derive(Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub token: Option<String>,
}

#[derive(Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub data: Option<UserEnvelope>,
}

#[derive(Deserialize)]
pub struct UserResponse {
    pub data: UserEnvelope,
}

#[derive(Deserialize)]
pub struct UserEnvelope {
    pub user: UserProfile,
}

/// Error body returned by the API, e.g. `{"status":"fail","message":"..."}`.
#[derive(Deserialize)]
pub struct ErrorBody {
    pub message: String,
}
