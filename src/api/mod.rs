//! HTTP client for the vending machine REST API. It implements the session
//! core's auth and user services and shares the session store so sign-in and
//! sign-up can persist the issued token, and profile lookups can attach it as
//! a bearer header. Token and password values never reach the logs.

pub mod errors;
pub mod types;

pub use errors::ApiError;

use crate::{
    session::{
        AuthService, Credentials, Registration, SessionError, SessionStore, Token, UserProfile,
        UserService,
    },
    APP_USER_AGENT,
};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, instrument};
use types::{
    AuthResponse, ErrorBody, SignInRequest, SignUpRequest, TokenResponse, UserResponse,
};

/// Default request timeout applied to every call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
/// Maximum number of error body characters surfaced to callers.
const MAX_ERROR_CHARS: usize = 200;

#[derive(Clone, Debug)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    store: SessionStore,
}

impl ApiClient {
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(base_url: &str, timeout: Duration, store: SessionStore) -> Result<Self, ApiError> {
        let http = Client::builder()
            .user_agent(APP_USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|err| ApiError::Config(format!("Failed to build HTTP client: {err}")))?;

        Ok(Self {
            http,
            base_url: base_url.trim().trim_end_matches('/').to_string(),
            store,
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Builds a URL from the configured base URL and the provided path.
    fn endpoint(&self, path: &str) -> String {
        build_url_with_base(&self.base_url, path)
    }

    fn with_bearer(builder: RequestBuilder, token: Option<&Token>) -> RequestBuilder {
        match token {
            Some(token) => builder.bearer_auth(token.expose()),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response, ApiError> {
        let response = builder.send().await?;
        debug!(status = %response.status(), url = %response.url(), "api response");
        Ok(response)
    }

    fn store_token(&self, token: Option<String>) -> Result<(), SessionError> {
        let token = token
            .filter(|token| !token.trim().is_empty())
            .ok_or_else(|| SessionError::Auth("no token returned from server".to_string()))?;
        self.store.set_token(&Token::new(token))?;
        Ok(())
    }
}

#[async_trait]
impl AuthService for ApiClient {
    #[instrument(skip(self, credentials), fields(email = %credentials.email))]
    async fn sign_in(&self, credentials: &Credentials) -> Result<(), SessionError> {
        let body = SignInRequest {
            email: credentials.email.trim(),
            password: credentials.password.expose_secret(),
        };
        let request = self.http.post(self.endpoint("/users/signin")).json(&body);

        let response: TokenResponse = handle_json_response(self.send(request).await?).await?;
        self.store_token(response.token)
    }

    #[instrument(skip(self))]
    async fn sign_out(&self) -> Result<(), SessionError> {
        let token = self.store.token();
        let request = Self::with_bearer(self.http.get(self.endpoint("/users/logout")), token.as_ref());

        handle_empty_response(self.send(request).await?).await?;
        Ok(())
    }

    #[instrument(skip(self, registration), fields(email = %registration.email))]
    async fn sign_up(&self, registration: &Registration) -> Result<UserProfile, SessionError> {
        let body = SignUpRequest {
            name: registration.name.trim(),
            email: registration.email.trim(),
            password: registration.password.expose_secret(),
            password_confirm: registration.password_confirm.expose_secret(),
            role: registration.role,
        };
        let request = self.http.post(self.endpoint("/users/signup")).json(&body);

        let response: AuthResponse = handle_json_response(self.send(request).await?).await?;
        debug!(status = ?response.status, "sign-up accepted");

        let user = response
            .data
            .map(|data| data.user)
            .ok_or_else(|| ApiError::Parse("sign-up response has no user".to_string()))?;
        self.store_token(response.token)?;

        Ok(user)
    }
}

#[async_trait]
impl UserService for ApiClient {
    #[instrument(skip(self))]
    async fn fetch_self(&self) -> Result<UserProfile, SessionError> {
        let token = self.store.token().ok_or(ApiError::MissingToken)?;
        let request = Self::with_bearer(self.http.get(self.endpoint("/users/me")), Some(&token));

        let response: UserResponse = handle_json_response(self.send(request).await?).await?;
        Ok(response.data.user)
    }
}

/// Builds a URL from an explicit base URL and the provided path.
fn build_url_with_base(base_url: &str, path: &str) -> String {
    let base = base_url.trim().trim_end_matches('/');
    let path = path.trim();

    if base.is_empty() {
        path.to_string()
    } else {
        format!("{}/{}", base, path.trim_start_matches('/'))
    }
}

/// Parses JSON responses and surfaces HTTP errors with sanitized bodies.
async fn handle_json_response<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    if response.status().is_success() {
        let body = response.bytes().await?;
        serde_json::from_slice(&body)
            .map_err(|err| ApiError::Parse(format!("Failed to decode response: {err}")))
    } else {
        Err(http_error(response).await)
    }
}

/// Handles empty responses and returns sanitized HTTP errors when needed.
async fn handle_empty_response(response: Response) -> Result<(), ApiError> {
    if response.status().is_success() {
        Ok(())
    } else {
        Err(http_error(response).await)
    }
}

async fn http_error(response: Response) -> ApiError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    ApiError::Http {
        status,
        message: error_message(&body),
    }
}

/// Prefers the API's `message` field, falling back to the raw body.
fn error_message(body: &str) -> String {
    let message = serde_json::from_str::<ErrorBody>(body)
        .map(|parsed| parsed.message)
        .unwrap_or_else(|_| body.to_string());
    sanitize_body(&message)
}

/// Sanitizes HTTP error bodies for user-facing messages by trimming and truncating.
fn sanitize_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        "Request failed.".to_string()
    } else {
        trimmed.chars().take(MAX_ERROR_CHARS).collect()
    }
}
