//! Role-based navigation decisions for the console routes. This is UX only;
//! the API still enforces access on every request.

use super::{state::SessionState, types::Role};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Route {
    Dashboard,
    Users,
    Products,
    Settings,
    Analytics,
    Welcome,
    Login,
    Register,
    NotFound,
}

/// Who may open a route.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Access {
    /// Only while signed out.
    Guest,
    /// Any signed-in operator.
    Authenticated,
    AdminOnly,
    Public,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    Render,
    Redirect(Route),
}

impl Route {
    pub const ALL: [Self; 9] = [
        Self::Dashboard,
        Self::Users,
        Self::Products,
        Self::Settings,
        Self::Analytics,
        Self::Welcome,
        Self::Login,
        Self::Register,
        Self::NotFound,
    ];

    /// Resolves a request path, ignoring query strings and trailing slashes.
    #[must_use]
    pub fn from_path(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or_default().trim();
        let path = path.trim_end_matches('/');

        match path {
            "" => Self::Dashboard,
            "/users" => Self::Users,
            "/products" => Self::Products,
            "/settings" => Self::Settings,
            "/analytics" => Self::Analytics,
            "/welcome" => Self::Welcome,
            "/login" => Self::Login,
            "/register" => Self::Register,
            _ => Self::NotFound,
        }
    }

    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Dashboard => "/",
            Self::Users => "/users",
            Self::Products => "/products",
            Self::Settings => "/settings",
            Self::Analytics => "/analytics",
            Self::Welcome => "/welcome",
            Self::Login => "/login",
            Self::Register => "/register",
            Self::NotFound => "*",
        }
    }

    #[must_use]
    pub const fn access(self) -> Access {
        match self {
            Self::Dashboard | Self::Users | Self::Products | Self::Settings | Self::Analytics => {
                Access::AdminOnly
            }
            Self::Welcome => Access::Authenticated,
            Self::Login | Self::Register => Access::Guest,
            Self::NotFound => Access::Public,
        }
    }
}

/// Landing page for a signed-in role.
#[must_use]
pub const fn home_for(role: Role) -> Route {
    match role {
        Role::Admin => Route::Dashboard,
        Role::StandardUser => Route::Welcome,
    }
}

#[must_use]
pub fn decide(route: Route, session: &SessionState) -> Decision {
    let role = if session.is_authenticated() {
        session.role()
    } else {
        None
    };

    match route.access() {
        Access::Public => Decision::Render,
        Access::Guest => match role {
            Some(role) => Decision::Redirect(home_for(role)),
            None => Decision::Render,
        },
        // A signed-in session without a role is treated as signed out.
        Access::Authenticated => match role {
            Some(_) => Decision::Render,
            None => Decision::Redirect(Route::Login),
        },
        Access::AdminOnly => match role {
            Some(Role::Admin) => Decision::Render,
            Some(Role::StandardUser) => Decision::Redirect(Route::Welcome),
            None => Decision::Redirect(Route::Login),
        },
    }
}
