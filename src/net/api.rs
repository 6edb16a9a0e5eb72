//! Remote collaborator seams.
//!
//! Each trait covers one area of the HTTP contract so that components only
//! depend on what they call: the favorites cache sees [`FavoritesApi`], the
//! catalog sees [`MovieApi`]. [`RemoteApi`] bundles all of them for the
//! application facade. `HttpApi` is the production implementation; tests
//! script their own.

use async_trait::async_trait;

use super::types::{
    LoginResponse, MailRequest, Movie, MovieDraft, MovieId, RegisterResponse, User, UserId, UserPatch,
};
use crate::error::ClientError;

#[async_trait]
pub trait AuthApi: Send + Sync {
    /// Exchange credentials for a token.
    ///
    /// A rejected login is a successful call whose body has no token; only
    /// transport and server failures are errors.
    async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ClientError>;

    /// Create a `USER` account.
    async fn register(&self, name: &str, email: &str, password: &str) -> Result<RegisterResponse, ClientError>;
}

#[async_trait]
pub trait MovieApi: Send + Sync {
    async fn list_movies(&self) -> Result<Vec<Movie>, ClientError>;

    /// Returns [`ClientError::NotFound`] for unknown ids.
    async fn find_movie(&self, id: MovieId) -> Result<Movie, ClientError>;

    async fn movies_by_genre(&self, genre: &str) -> Result<Vec<Movie>, ClientError>;

    async fn create_movie(&self, draft: &MovieDraft) -> Result<Movie, ClientError>;

    async fn update_movie(&self, id: MovieId, draft: &MovieDraft) -> Result<Movie, ClientError>;

    async fn delete_movie(&self, id: MovieId) -> Result<(), ClientError>;
}

#[async_trait]
pub trait UserApi: Send + Sync {
    async fn list_users(&self) -> Result<Vec<User>, ClientError>;

    /// Returns [`ClientError::NotFound`] for unknown ids.
    async fn find_user(&self, id: UserId) -> Result<User, ClientError>;

    async fn update_user(&self, id: UserId, patch: &UserPatch) -> Result<User, ClientError>;

    async fn delete_user(&self, id: UserId) -> Result<(), ClientError>;
}

#[async_trait]
pub trait FavoritesApi: Send + Sync {
    /// The user's favorites as a flat movie list.
    async fn list_favorites(&self, user_id: UserId) -> Result<Vec<Movie>, ClientError>;

    async fn add_favorite(&self, user_id: UserId, movie_id: MovieId) -> Result<(), ClientError>;

    async fn remove_favorite(&self, user_id: UserId, movie_id: MovieId) -> Result<(), ClientError>;
}

#[async_trait]
pub trait MailApi: Send + Sync {
    async fn send_mail(&self, mail: &MailRequest) -> Result<(), ClientError>;
}

/// Every remote collaborator behind one handle.
pub trait RemoteApi: AuthApi + MovieApi + UserApi + FavoritesApi + MailApi {}

impl<T> RemoteApi for T where T: AuthApi + MovieApi + UserApi + FavoritesApi + MailApi {}
