//! Route access control.
//!
//! DESIGN
//! ======
//! Every screen belongs to one [`Requirement`] class. A navigation resolves
//! the path to a [`Route`], derives the caller's [`AccessLevel`] from the
//! stored session, and [`decide`] maps the pair to a [`Decision`]. The
//! decision is a pure function of its inputs and is recomputed on every
//! navigation; nothing is cached between calls.
//!
//! The facade and the CLI both call [`require`] before privileged remote
//! calls so a non-admin never reaches an admin endpoint.

#[cfg(test)]
#[path = "gate_test.rs"]
mod gate_test;

use std::fmt;

use crate::error::ClientError;
use crate::net::types::{MovieId, Role, UserId};
use crate::state::session::Session;

pub const LOGIN_PATH: &str = "/login";
pub const HOME_PATH: &str = "/";
pub const ADMIN_PATH: &str = "/admin";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Route {
    Home,
    UserHome(UserId),
    Login,
    Register,
    MovieDetails(MovieId),
    Favorites,
    MovieEditor,
    Admin,
    AdminFavorites(UserId),
    NotFound,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Requirement {
    Public,
    Authenticated,
    Admin,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum AccessLevel {
    Anonymous,
    User,
    Admin,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    Allow,
    RedirectToLogin,
    RedirectToHome,
}

impl Decision {
    /// Path to navigate to instead, if any.
    #[must_use]
    pub fn target(self) -> Option<&'static str> {
        match self {
            Self::Allow => None,
            Self::RedirectToLogin => Some(LOGIN_PATH),
            Self::RedirectToHome => Some(HOME_PATH),
        }
    }
}

impl Route {
    /// Resolve a path. Query strings and trailing slashes are ignored;
    /// unknown paths and malformed ids map to [`Route::NotFound`].
    #[must_use]
    pub fn parse(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        match segments.as_slice() {
            [] => Self::Home,
            ["home", id] => id.parse().map_or(Self::NotFound, Self::UserHome),
            ["login"] => Self::Login,
            ["register"] => Self::Register,
            ["movie", id] => id.parse().map_or(Self::NotFound, Self::MovieDetails),
            ["favorites"] => Self::Favorites,
            ["movies"] => Self::MovieEditor,
            ["admin"] => Self::Admin,
            ["admin", "favorites", id] => id.parse().map_or(Self::NotFound, Self::AdminFavorites),
            _ => Self::NotFound,
        }
    }

    #[must_use]
    pub fn requirement(self) -> Requirement {
        match self {
            Self::Home | Self::Login | Self::Register | Self::MovieDetails(_) | Self::NotFound => {
                Requirement::Public
            }
            Self::UserHome(_) | Self::Favorites => Requirement::Authenticated,
            Self::MovieEditor | Self::Admin | Self::AdminFavorites(_) => Requirement::Admin,
        }
    }

    #[must_use]
    pub fn path(self) -> String {
        match self {
            Self::Home => HOME_PATH.to_owned(),
            Self::UserHome(id) => format!("/home/{id}"),
            Self::Login => LOGIN_PATH.to_owned(),
            Self::Register => "/register".to_owned(),
            Self::MovieDetails(id) => format!("/movie/{id}"),
            Self::Favorites => "/favorites".to_owned(),
            Self::MovieEditor => "/movies".to_owned(),
            Self::Admin => ADMIN_PATH.to_owned(),
            Self::AdminFavorites(id) => format!("/admin/favorites/{id}"),
            Self::NotFound => "/404".to_owned(),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

impl AccessLevel {
    /// A stored role without a token counts as anonymous.
    #[must_use]
    pub fn of(session: &Session) -> Self {
        if session.has_role(Role::Admin) {
            Self::Admin
        } else if session.is_authenticated() {
            Self::User
        } else {
            Self::Anonymous
        }
    }
}

#[must_use]
pub fn decide(route: Route, session: &Session) -> Decision {
    let level = AccessLevel::of(session);
    match (route.requirement(), level) {
        (Requirement::Authenticated | Requirement::Admin, AccessLevel::Anonymous) => Decision::RedirectToLogin,
        (Requirement::Admin, AccessLevel::User) => Decision::RedirectToHome,
        _ => Decision::Allow,
    }
}

/// [`decide`] on a raw path.
#[must_use]
pub fn decide_path(path: &str, session: &Session) -> (Route, Decision) {
    let route = Route::parse(path);
    (route, decide(route, session))
}

/// Where a session lands right after login.
#[must_use]
pub fn landing_route(session: &Session) -> Route {
    match (AccessLevel::of(session), session.authenticated_user()) {
        (AccessLevel::Admin, _) => Route::Admin,
        (AccessLevel::User, Some(user_id)) => Route::UserHome(user_id),
        (AccessLevel::User, None) => Route::Home,
        (AccessLevel::Anonymous, _) => Route::Login,
    }
}

/// Local precondition check before privileged remote calls.
///
/// # Errors
///
/// [`ClientError::NotAuthenticated`] for anonymous sessions and
/// [`ClientError::Forbidden`] for authenticated sessions below `requirement`.
pub fn require(requirement: Requirement, session: &Session) -> Result<(), ClientError> {
    match (requirement, AccessLevel::of(session)) {
        (Requirement::Public, _) | (Requirement::Authenticated, AccessLevel::User | AccessLevel::Admin) => Ok(()),
        (Requirement::Admin, AccessLevel::Admin) => Ok(()),
        (_, AccessLevel::Anonymous) => Err(ClientError::NotAuthenticated),
        (Requirement::Admin, AccessLevel::User) => Err(ClientError::Forbidden),
    }
}

/// # Errors
///
/// See [`require`].
pub fn require_admin(session: &Session) -> Result<(), ClientError> {
    require(Requirement::Admin, session)
}
