//! Client error taxonomy.
//!
//! ERROR HANDLING
//! ==============
//! Every remote failure is returned as a value; nothing in the client panics
//! on a bad response. Local precondition failures (duplicate favorite,
//! missing session, wrong role, invalid form input) are raised before any
//! request is sent, so callers can rely on "error means nothing changed
//! remotely" for those variants.

#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;

use crate::config::ConfigError;
use crate::net::types::MovieId;
use crate::state::storage::StorageError;

/// Errors produced by client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The auth endpoint answered without an access token.
    #[error("invalid credentials: {0}")]
    InvalidCredentials(String),

    /// The movie is already in the local favorites list.
    #[error("movie {movie_id} is already in favorites")]
    DuplicateFavorite { movie_id: MovieId },

    /// The favorites list could not be fetched.
    #[error("favorites unavailable: {0}")]
    FavoritesUnavailable(String),

    /// The request never produced an HTTP response.
    #[error("network request failed: {0}")]
    Network(String),

    /// The requested movie or user does not exist.
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    /// The server answered with a non-success status.
    #[error("API error: status {status}: {message}")]
    Api { status: u16, message: String },

    /// A success response did not carry a required field.
    #[error("malformed response: missing or invalid `{0}`")]
    MalformedResponse(&'static str),

    #[error("not logged in")]
    NotAuthenticated,

    #[error("administrator role required")]
    Forbidden,

    /// Form input rejected before sending.
    #[error("invalid input: {0}")]
    Validation(String),

    /// The register endpoint answered without a user id.
    #[error("registration failed: {0}")]
    Registration(String),

    #[error("session storage failed: {0}")]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl From<reqwest::Error> for ClientError {
    fn from(error: reqwest::Error) -> Self {
        Self::Network(error.to_string())
    }
}

impl ClientError {
    /// Stable machine-readable code for logs and CLI output.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidCredentials(_) => "E_INVALID_CREDENTIALS",
            Self::DuplicateFavorite { .. } => "E_DUPLICATE_FAVORITE",
            Self::FavoritesUnavailable(_) => "E_FAVORITES_UNAVAILABLE",
            Self::Network(_) => "E_NETWORK",
            Self::NotFound { .. } => "E_NOT_FOUND",
            Self::Api { .. } => "E_API",
            Self::MalformedResponse(_) => "E_MALFORMED_RESPONSE",
            Self::NotAuthenticated => "E_NOT_AUTHENTICATED",
            Self::Forbidden => "E_FORBIDDEN",
            Self::Validation(_) => "E_VALIDATION",
            Self::Registration(_) => "E_REGISTRATION",
            Self::Storage(_) => "E_STORAGE",
            Self::Config(_) => "E_CONFIG",
        }
    }

    /// Whether repeating the same request may succeed.
    #[must_use]
    pub fn retryable(&self) -> bool {
        matches!(
            self,
            Self::Network(_) | Self::FavoritesUnavailable(_) | Self::Api { status: 429 | 500..=599, .. }
        )
    }

    /// Short user-facing notification text.
    #[must_use]
    pub fn notice(&self) -> String {
        match self {
            Self::InvalidCredentials(message) | Self::Registration(message) => message.clone(),
            Self::DuplicateFavorite { .. } => "Already in favorites!".to_owned(),
            Self::FavoritesUnavailable(_) => "Failed to fetch favorites".to_owned(),
            Self::Network(_) | Self::Api { .. } | Self::MalformedResponse(_) => {
                "The movie service is unavailable right now.".to_owned()
            }
            Self::NotFound { entity, .. } => format!("That {entity} no longer exists."),
            Self::NotAuthenticated => "Please log in first.".to_owned(),
            Self::Forbidden => "Only administrators can do that.".to_owned(),
            Self::Validation(message) => message.clone(),
            Self::Storage(_) | Self::Config(_) => self.to_string(),
        }
    }
}
