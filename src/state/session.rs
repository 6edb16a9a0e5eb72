//! Client-held session: token, user id and role.
//!
//! DESIGN
//! ======
//! The session is exactly three keys in a [`KeyValueStore`]: `token`,
//! `role` and `userId`. Nothing is cached in memory, so every reader (the
//! HTTP client attaching bearer tokens, the access gate) sees the latest
//! login or logout. This module never talks to the network; it records what
//! the auth endpoint handed back.
//!
//! Login writes `token` last and logout removes it first, so a partially
//! applied write never looks authenticated.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::sync::Arc;

use tracing::{info, warn};

use super::storage::{KeyValueStore, MemoryStore, StorageError};
use crate::error::ClientError;
use crate::net::types::{LoginResponse, Role, UserId};

pub const TOKEN_KEY: &str = "token";
pub const ROLE_KEY: &str = "role";
pub const USER_ID_KEY: &str = "userId";

/// Snapshot of the stored session.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Session {
    pub token: Option<String>,
    pub user_id: Option<UserId>,
    pub role: Option<Role>,
}

impl Session {
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Role check; role is ignored without a token.
    #[must_use]
    pub fn has_role(&self, role: Role) -> bool {
        self.is_authenticated() && self.role == Some(role)
    }

    /// User id, only while authenticated.
    #[must_use]
    pub fn authenticated_user(&self) -> Option<UserId> {
        if self.is_authenticated() { self.user_id } else { None }
    }
}

/// Shared handle over durable session storage. Clones see the same keys.
#[derive(Clone)]
pub struct SessionStore {
    storage: Arc<dyn KeyValueStore>,
}

impl SessionStore {
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self { storage }
    }

    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// Record a successful login.
    ///
    /// # Errors
    ///
    /// Returns an error if storage rejects a write; the session is cleared
    /// again in that case.
    pub fn login(&self, token: &str, user_id: UserId, role: Option<Role>) -> Result<(), StorageError> {
        let result = self.write_login(token, user_id, role);
        if result.is_err() {
            self.logout();
        }
        result
    }

    fn write_login(&self, token: &str, user_id: UserId, role: Option<Role>) -> Result<(), StorageError> {
        self.storage.set(USER_ID_KEY, &user_id.to_string())?;
        match role {
            Some(role) => self.storage.set(ROLE_KEY, role.as_str())?,
            None => self.storage.remove(ROLE_KEY)?,
        }
        self.storage.set(TOKEN_KEY, token)
    }

    /// Validate a login response and store it.
    ///
    /// # Errors
    ///
    /// - [`ClientError::InvalidCredentials`] when the response has no token,
    ///   carrying the server's message.
    /// - [`ClientError::MalformedResponse`] when a token arrives without a user id.
    /// - [`ClientError::Storage`] when the session cannot be persisted.
    pub fn accept_login(&self, response: LoginResponse) -> Result<Session, ClientError> {
        let Some(token) = response.access_token.filter(|t| !t.is_empty()) else {
            let message = response.message.unwrap_or_else(|| "Login failed".to_owned());
            return Err(ClientError::InvalidCredentials(message));
        };
        let user_id = response.user_id.ok_or(ClientError::MalformedResponse("userId"))?;
        self.login(&token, user_id, response.role)?;
        info!(user_id, role = ?response.role, "session started");
        Ok(Session { token: Some(token), user_id: Some(user_id), role: response.role })
    }

    /// Clear all session keys. Idempotent.
    ///
    /// Storage failures are logged; the in-process view is cleared regardless.
    pub fn logout(&self) {
        for key in [TOKEN_KEY, ROLE_KEY, USER_ID_KEY] {
            if let Err(e) = self.storage.remove(key) {
                warn!(key, error = %e, "failed to persist session logout");
            }
        }
    }

    #[must_use]
    pub fn current(&self) -> Session {
        let token = self.token();
        let user_id = self
            .storage
            .get(USER_ID_KEY)
            .and_then(|raw| raw.trim().parse::<UserId>().ok());
        let role = self.storage.get(ROLE_KEY).as_deref().and_then(Role::parse);
        Session { token, user_id, role }
    }

    /// Bearer token, if logged in.
    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.storage.get(TOKEN_KEY).filter(|t| !t.is_empty())
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    #[must_use]
    pub fn has_role(&self, role: Role) -> bool {
        self.current().has_role(role)
    }

    #[must_use]
    pub fn user_id(&self) -> Option<UserId> {
        self.current().authenticated_user()
    }
}
