#![allow(clippy::unwrap_used, clippy::expect_used, dead_code)]

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::{
    collections::HashMap,
    path::PathBuf,
    sync::{Arc, Mutex},
};
use tokio::net::TcpListener;

#[derive(Clone)]
pub struct Account {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: String,
}

impl Account {
    fn profile(&self) -> Value {
        json!({
            "_id": self.id,
            "name": self.name,
            "email": self.email,
            "role": self.role,
        })
    }
}

#[derive(Default)]
pub struct Backend {
    pub accounts: Vec<Account>,
    pub tokens: HashMap<String, String>,
    pub me_calls: usize,
    pub logout_calls: usize,
    pub fail_logout: bool,
    pub last_authorization: Option<String>,
}

pub type Shared = Arc<Mutex<Backend>>;

/// Mock of the vending machine API with one admin account seeded.
pub struct MockApi {
    pub base_url: String,
    pub backend: Shared,
}

impl MockApi {
    pub async fn start() -> Self {
        let backend: Shared = Arc::new(Mutex::new(Backend {
            accounts: vec![Account {
                id: "680f3ebcfe30188703724d36".to_string(),
                name: "Admin".to_string(),
                email: "admin@vendingmachine.gp".to_string(),
                password: "Admin#2025".to_string(),
                role: "admin".to_string(),
            }],
            ..Backend::default()
        }));

        let app = Router::new()
            .route("/api/users/signin", post(signin))
            .route("/api/users/signup", post(signup))
            .route("/api/users/me", get(me))
            .route("/api/users/logout", get(logout))
            .with_state(backend.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind mock api");
        let addr = listener.local_addr().expect("failed to read mock address");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("mock api failed");
        });

        Self {
            base_url: format!("http://{addr}/api"),
            backend,
        }
    }

    /// Issues a token directly, as if a previous run had signed in.
    pub fn issue_token(&self, email: &str) -> String {
        let mut backend = self.backend.lock().unwrap();
        let token = format!("tok-{}-{}", email, backend.tokens.len());
        backend.tokens.insert(token.clone(), email.to_string());
        token
    }

    pub fn revoke_all(&self) {
        self.backend.lock().unwrap().tokens.clear();
    }
}

pub fn temp_session_file() -> PathBuf {
    std::env::temp_dir()
        .join(format!("vending-admin-it-{}", uuid::Uuid::new_v4()))
        .join("session.json")
}

fn fail(status: StatusCode, message: &str) -> (StatusCode, Json<Value>) {
    (status, Json(json!({ "status": "fail", "message": message })))
}

fn bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::to_string)
}

async fn signin(State(backend): State<Shared>, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    let email = body["email"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();

    if email.is_empty() || password.is_empty() {
        return fail(StatusCode::BAD_REQUEST, "Please provide email and password");
    }
    if email == "tokenless@vendingmachine.gp" {
        return (StatusCode::OK, Json(json!({ "status": "success" })));
    }

    let mut backend = backend.lock().unwrap();
    let matched = backend
        .accounts
        .iter()
        .any(|account| account.email == email && account.password == password);
    if !matched {
        return fail(StatusCode::UNAUTHORIZED, "Incorrect email or password");
    }

    let token = format!("tok-{}-{}", email, backend.tokens.len());
    backend.tokens.insert(token.clone(), email.to_string());
    (StatusCode::OK, Json(json!({ "status": "success", "token": token })))
}

async fn signup(State(backend): State<Shared>, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    let mut backend = backend.lock().unwrap();
    let email = body["email"].as_str().unwrap_or_default().to_string();

    if backend.accounts.iter().any(|account| account.email == email) {
        return fail(StatusCode::BAD_REQUEST, "Duplicate field value: email");
    }
    if body["password"] != body["passwordConfirm"] {
        return fail(StatusCode::BAD_REQUEST, "Passwords are not the same!");
    }

    let account = Account {
        id: format!("user-{}", backend.accounts.len() + 1),
        name: body["name"].as_str().unwrap_or_default().to_string(),
        email: email.clone(),
        password: body["password"].as_str().unwrap_or_default().to_string(),
        role: body["role"].as_str().unwrap_or("user").to_string(),
    };
    let token = format!("tok-{}-{}", email, backend.tokens.len());
    backend.tokens.insert(token.clone(), email);
    let profile = account.profile();
    backend.accounts.push(account);

    (
        StatusCode::CREATED,
        Json(json!({ "status": "success", "token": token, "data": { "user": profile } })),
    )
}

async fn me(State(backend): State<Shared>, headers: HeaderMap) -> (StatusCode, Json<Value>) {
    let mut backend = backend.lock().unwrap();
    backend.me_calls += 1;
    backend.last_authorization = headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);

    let Some(token) = bearer(&headers) else {
        return fail(StatusCode::UNAUTHORIZED, "You are not logged in!");
    };
    let Some(email) = backend.tokens.get(&token).cloned() else {
        return fail(StatusCode::UNAUTHORIZED, "Invalid token. Please log in again!");
    };
    let Some(account) = backend.accounts.iter().find(|a| a.email == email) else {
        return fail(StatusCode::UNAUTHORIZED, "The user no longer exists.");
    };

    (
        StatusCode::OK,
        Json(json!({ "status": "success", "data": { "user": account.profile() } })),
    )
}

async fn logout(State(backend): State<Shared>, headers: HeaderMap) -> (StatusCode, Json<Value>) {
    let mut backend = backend.lock().unwrap();
    backend.logout_calls += 1;
    if backend.fail_logout {
        return fail(StatusCode::INTERNAL_SERVER_ERROR, "Something went very wrong!");
    }
    if let Some(token) = bearer(&headers) {
        backend.tokens.remove(&token);
    }
    (StatusCode::OK, Json(json!({ "status": "success" })))
}
