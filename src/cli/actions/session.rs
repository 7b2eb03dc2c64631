use crate::{
    api::ApiClient,
    cli::actions::Action,
    config::Config,
    session::{
        guard::{self, Decision, Route},
        AuthSession, SessionState, SessionStore,
    },
};
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::debug;

/// Opens the persisted session against the configured API and reconciles it.
///
/// # Errors
/// Returns an error if the session file or HTTP client cannot be prepared.
pub async fn open(config: &Config) -> Result<AuthSession> {
    let store = SessionStore::file(&config.session_file).with_context(|| {
        format!(
            "failed to open session file {}",
            config.session_file.display()
        )
    })?;
    let client = Arc::new(
        ApiClient::new(&config.api_base_url, config.timeout, store.clone())
            .context("failed to build API client")?,
    );

    let session = AuthSession::new(store, client.clone(), client);
    session.reconcile().await;
    debug!(phase = session.state().phase().as_str(), "session reconciled");

    Ok(session)
}

/// Handle a session action
///
/// # Errors
/// Returns an error if the session cannot be opened or a login or
/// registration is rejected.
pub async fn handle(action: Action) -> Result<()> {
    let session = open(action.config()).await?;

    match action {
        Action::Status { .. } => println!("{}", describe(&session.state())),
        Action::Login { credentials, .. } => {
            let user = session.login(&credentials).await.context("login failed")?;
            println!("signed in as {} <{}> ({})", user.name, user.email, user.role);
        }
        Action::Register { registration, .. } => {
            let user = session
                .register(&registration)
                .await
                .context("registration failed")?;
            println!("registered {} <{}> ({})", user.name, user.email, user.role);
        }
        Action::Logout { .. } => {
            session.logout().await;
            println!("signed out");
        }
        Action::Check { path: Some(path), .. } => {
            println!("{}", check(&path, Route::from_path(&path), &session.state()));
        }
        Action::Check { path: None, .. } => {
            let state = session.state();
            for route in Route::ALL.into_iter().filter(|r| *r != Route::NotFound) {
                println!("{}", check(route.path(), route, &state));
            }
        }
    }

    Ok(())
}

fn check(path: &str, route: Route, state: &SessionState) -> String {
    match guard::decide(route, state) {
        Decision::Render => format!("{path}: allowed"),
        Decision::Redirect(target) => format!("{path}: redirect to {}", target.path()),
    }
}

fn describe(state: &SessionState) -> String {
    match state.user() {
        Some(user) if state.is_authenticated() => format!(
            "{}: {} <{}> ({}), id {}",
            state.phase().as_str(),
            user.name,
            user.email,
            user.role,
            user.id
        ),
        _ => state.phase().as_str().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{Role, UserProfile};

    #[test]
    fn describe_shows_profile_when_signed_in() {
        let state = SessionState::authenticated(UserProfile {
            id: "1".to_string(),
            name: "Admin".to_string(),
            email: "admin@vendingmachine.gp".to_string(),
            role: Role::Admin,
            photo: None,
            password_changed_at: None,
        });
        assert_eq!(
            describe(&state),
            "authenticated: Admin <admin@vendingmachine.gp> (admin), id 1"
        );
        assert_eq!(describe(&SessionState::unauthenticated()), "unauthenticated");
    }

    #[test]
    fn check_reports_guard_decision() {
        let signed_out = SessionState::unauthenticated();
        assert_eq!(
            check("/users?page=2", Route::Users, &signed_out),
            "/users?page=2: redirect to /login"
        );
        assert_eq!(check("/login", Route::Login, &signed_out), "/login: allowed");
    }
}
