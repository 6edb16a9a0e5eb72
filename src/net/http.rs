//! `reqwest`-backed implementation of the remote collaborators.
//!
//! Bearer tokens are read from the [`SessionStore`] on every request, so a
//! login or logout is picked up by the next call without rebuilding the
//! client. Response parsing lives in small pure functions for testability.
//!
//! ERROR HANDLING
//! ==============
//! Transport failures become [`ClientError::Network`], non-2xx statuses become
//! [`ClientError::Api`] carrying the server's `message`, and a 404 on a
//! lookup becomes [`ClientError::NotFound`]. Login and register answer 4xx
//! with a `{message}` body on rejection; those bodies are handed back to the
//! caller as data instead of errors.

#[cfg(test)]
#[path = "http_test.rs"]
mod http_test;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::api::{AuthApi, FavoritesApi, MailApi, MovieApi, UserApi};
use super::types::{
    ApiMessage, FavoriteRequest, LoginRequest, LoginResponse, MailRequest, Movie, MovieDraft, MovieId,
    RegisterRequest, RegisterResponse, Role, User, UserId, UserPatch,
};
use crate::config::{ClientConfig, ConfigError};
use crate::error::ClientError;
use crate::state::session::SessionStore;

pub struct HttpApi {
    http: reqwest::Client,
    base_url: Url,
    session: SessionStore,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Auth {
    Anonymous,
    Bearer,
}

impl HttpApi {
    /// Build the HTTP client from typed config.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the HTTP client fails to build.
    pub fn new(config: &ClientConfig, session: SessionStore) -> Result<Self, ClientError> {
        let base_url =
            Url::parse(&config.base_url).map_err(|_| ConfigError::InvalidBaseUrl(config.base_url.clone()))?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeouts.request_secs))
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .build()
            .map_err(|e| ClientError::Network(format!("HTTP client build failed: {e}")))?;
        Ok(Self { http, base_url, session })
    }

    fn request(&self, method: Method, segments: &[&str], auth: Auth) -> Result<RequestBuilder, ClientError> {
        let url = endpoint(&self.base_url, segments)?;
        let builder = self.http.request(method, url);
        if auth == Auth::Bearer
            && let Some(token) = self.session.token()
        {
            return Ok(builder.bearer_auth(token));
        }
        Ok(builder)
    }

    async fn send(&self, builder: RequestBuilder) -> Result<(u16, String), ClientError> {
        let request = builder.build()?;
        let method = request.method().clone();
        let path = request.url().path().to_owned();
        let response = self.http.execute(request).await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        debug!(%method, path = %path, status, "api response");
        Ok((status, body))
    }

    async fn get_json<T: DeserializeOwned>(&self, segments: &[&str], auth: Auth) -> Result<T, ClientError> {
        let (status, body) = self.send(self.request(Method::GET, segments, auth)?).await?;
        decode(status, &body)
    }

    async fn send_json<B, T>(&self, method: Method, segments: &[&str], auth: Auth, payload: &B) -> Result<T, ClientError>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        let (status, body) = self
            .send(self.request(method, segments, auth)?.json(payload))
            .await?;
        decode(status, &body)
    }
}

#[async_trait]
impl AuthApi for HttpApi {
    async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ClientError> {
        let payload = LoginRequest { email, password };
        let builder = self
            .request(Method::POST, &["auth", "login"], Auth::Anonymous)?
            .json(&payload);
        let (status, body) = self.send(builder).await?;
        decode_auth_body(status, &body)
    }

    async fn register(&self, name: &str, email: &str, password: &str) -> Result<RegisterResponse, ClientError> {
        let payload = RegisterRequest { name, email, password, role: Role::User };
        let builder = self
            .request(Method::POST, &["auth", "register"], Auth::Anonymous)?
            .json(&payload);
        let (status, body) = self.send(builder).await?;
        decode_auth_body(status, &body)
    }
}

#[async_trait]
impl MovieApi for HttpApi {
    async fn list_movies(&self) -> Result<Vec<Movie>, ClientError> {
        self.get_json(&["movies", "get-all-movies"], Auth::Anonymous)
            .await
    }

    async fn find_movie(&self, id: MovieId) -> Result<Movie, ClientError> {
        let id_segment = id.to_string();
        let found: Option<Movie> = self
            .get_json(&["movies", "findOne", &id_segment], Auth::Anonymous)
            .await
            .map_err(|e| not_found(e, "movie", &id_segment))?;
        found.ok_or(ClientError::NotFound { entity: "movie", id: id_segment })
    }

    async fn movies_by_genre(&self, genre: &str) -> Result<Vec<Movie>, ClientError> {
        self.get_json(&["movies", "genres", genre], Auth::Anonymous)
            .await
    }

    async fn create_movie(&self, draft: &MovieDraft) -> Result<Movie, ClientError> {
        self.send_json(Method::POST, &["movies", "movies"], Auth::Bearer, draft)
            .await
    }

    async fn update_movie(&self, id: MovieId, draft: &MovieDraft) -> Result<Movie, ClientError> {
        let id_segment = id.to_string();
        self.send_json(Method::PATCH, &["movies", "update", &id_segment], Auth::Bearer, draft)
            .await
            .map_err(|e| not_found(e, "movie", &id_segment))
    }

    async fn delete_movie(&self, id: MovieId) -> Result<(), ClientError> {
        let id_segment = id.to_string();
        let (status, body) = self
            .send(self.request(Method::DELETE, &["movies", "delete", &id_segment], Auth::Bearer)?)
            .await?;
        expect_success(status, &body).map_err(|e| not_found(e, "movie", &id_segment))
    }
}

#[async_trait]
impl UserApi for HttpApi {
    async fn list_users(&self) -> Result<Vec<User>, ClientError> {
        self.get_json(&["users", "get-all-users"], Auth::Bearer)
            .await
    }

    async fn find_user(&self, id: UserId) -> Result<User, ClientError> {
        let id_segment = id.to_string();
        let found: Option<User> = self
            .get_json(&["users", "find-one", &id_segment], Auth::Bearer)
            .await
            .map_err(|e| not_found(e, "user", &id_segment))?;
        found.ok_or(ClientError::NotFound { entity: "user", id: id_segment })
    }

    async fn update_user(&self, id: UserId, patch: &UserPatch) -> Result<User, ClientError> {
        let id_segment = id.to_string();
        self.send_json(Method::PATCH, &["users", "update", &id_segment], Auth::Bearer, patch)
            .await
            .map_err(|e| not_found(e, "user", &id_segment))
    }

    async fn delete_user(&self, id: UserId) -> Result<(), ClientError> {
        let id_segment = id.to_string();
        let (status, body) = self
            .send(self.request(Method::DELETE, &["users", "delete", &id_segment], Auth::Bearer)?)
            .await?;
        expect_success(status, &body).map_err(|e| not_found(e, "user", &id_segment))
    }
}

#[async_trait]
impl FavoritesApi for HttpApi {
    async fn list_favorites(&self, user_id: UserId) -> Result<Vec<Movie>, ClientError> {
        self.get_json(&["favorites", &user_id.to_string()], Auth::Bearer)
            .await
    }

    async fn add_favorite(&self, user_id: UserId, movie_id: MovieId) -> Result<(), ClientError> {
        let payload = FavoriteRequest { user_id, movie_id };
        let (status, body) = self
            .send(
                self.request(Method::POST, &["favorites", "add"], Auth::Bearer)?
                    .json(&payload),
            )
            .await?;
        expect_success(status, &body)
    }

    async fn remove_favorite(&self, user_id: UserId, movie_id: MovieId) -> Result<(), ClientError> {
        let payload = FavoriteRequest { user_id, movie_id };
        let (status, body) = self
            .send(
                self.request(Method::DELETE, &["favorites", "remove"], Auth::Bearer)?
                    .json(&payload),
            )
            .await?;
        expect_success(status, &body)
    }
}

#[async_trait]
impl MailApi for HttpApi {
    async fn send_mail(&self, mail: &MailRequest) -> Result<(), ClientError> {
        let (status, body) = self
            .send(
                self.request(Method::POST, &["mail", "send"], Auth::Anonymous)?
                    .json(mail),
            )
            .await?;
        expect_success(status, &body)
    }
}

// =============================================================================
// RESPONSE PARSING
// =============================================================================

/// Join percent-encoded path segments onto the base URL.
fn endpoint(base: &Url, segments: &[&str]) -> Result<Url, ClientError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| ConfigError::InvalidBaseUrl(base.to_string()))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

/// Server-provided error text, falling back to the raw body or the status.
fn error_message(status: u16, body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ApiMessage>(body)
        && let Some(message) = parsed.message
    {
        return message;
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        format!("HTTP {status}")
    } else {
        trimmed.to_owned()
    }
}

fn decode<T: DeserializeOwned>(status: u16, body: &str) -> Result<T, ClientError> {
    if !is_success(status) {
        return Err(ClientError::Api { status, message: error_message(status, body) });
    }
    let text = if body.trim().is_empty() { "null" } else { body };
    serde_json::from_str(text).map_err(|e| {
        debug!(error = %e, "response body did not match the expected shape");
        ClientError::MalformedResponse("body")
    })
}

/// Like [`decode`], but 4xx bodies that parse are returned as data.
fn decode_auth_body<T: DeserializeOwned>(status: u16, body: &str) -> Result<T, ClientError> {
    if (400..500).contains(&status)
        && let Ok(parsed) = serde_json::from_str::<T>(body)
    {
        return Ok(parsed);
    }
    decode(status, body)
}

fn expect_success(status: u16, body: &str) -> Result<(), ClientError> {
    if is_success(status) {
        Ok(())
    } else {
        Err(ClientError::Api { status, message: error_message(status, body) })
    }
}

fn not_found(error: ClientError, entity: &'static str, id: &str) -> ClientError {
    match error {
        ClientError::Api { status: 404, .. } => ClientError::NotFound { entity, id: id.to_owned() },
        other => other,
    }
}
