//! Scripted in-memory backend shared by unit tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

use super::api::{AuthApi, FavoritesApi, MailApi, MovieApi, UserApi};
use super::types::{
    LoginResponse, MailRequest, Movie, MovieDraft, MovieId, RegisterResponse, Role, User, UserId, UserPatch,
};
use crate::error::ClientError;

pub(crate) fn movie(id: MovieId, title: &str) -> Movie {
    Movie {
        id,
        title: title.to_owned(),
        poster_url: Some(format!("https://img.example.test/{id}.jpg")),
        description: None,
        genre: Some("Action".to_owned()),
        release_year: Some(2000),
    }
}

pub(crate) fn unavailable() -> ClientError {
    ClientError::Network("connection refused".to_owned())
}

/// Server truth plus failure switches and a call log.
#[derive(Default)]
pub(crate) struct MockApi {
    pub movies: Mutex<Vec<Movie>>,
    pub users: Mutex<Vec<User>>,
    pub favorites: Mutex<HashMap<UserId, Vec<Movie>>>,
    pub login_response: Mutex<Option<LoginResponse>>,
    pub register_response: Mutex<Option<RegisterResponse>>,
    pub fail_list_favorites: AtomicBool,
    pub fail_add: AtomicBool,
    pub fail_remove: AtomicBool,
    pub fail_movies: AtomicBool,
    pub calls: Mutex<Vec<String>>,
}

impl MockApi {
    pub(crate) fn with_movies(movies: Vec<Movie>) -> Self {
        Self { movies: Mutex::new(movies), ..Self::default() }
    }

    pub(crate) fn set_favorites(&self, user_id: UserId, movies: Vec<Movie>) {
        self.favorites.lock().unwrap().insert(user_id, movies);
    }

    pub(crate) fn server_favorite_ids(&self, user_id: UserId) -> Vec<MovieId> {
        self.favorites
            .lock()
            .unwrap()
            .get(&user_id)
            .map(|list| list.iter().map(|m| m.id).collect())
            .unwrap_or_default()
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn admin_login(&self, user_id: UserId) {
        *self.login_response.lock().unwrap() = Some(LoginResponse {
            access_token: Some("admin-token".to_owned()),
            role: Some(Role::Admin),
            user_id: Some(user_id),
            message: None,
        });
    }

    pub(crate) fn user_login(&self, user_id: UserId) {
        *self.login_response.lock().unwrap() = Some(LoginResponse {
            access_token: Some("user-token".to_owned()),
            role: Some(Role::User),
            user_id: Some(user_id),
            message: None,
        });
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl AuthApi for MockApi {
    async fn login(&self, email: &str, _password: &str) -> Result<LoginResponse, ClientError> {
        self.record(format!("login {email}"));
        Ok(self
            .login_response
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| LoginResponse { message: Some("Invalid credentials".to_owned()), ..Default::default() }))
    }

    async fn register(&self, _name: &str, email: &str, _password: &str) -> Result<RegisterResponse, ClientError> {
        self.record(format!("register {email}"));
        Ok(self.register_response.lock().unwrap().clone().unwrap_or_default())
    }
}

#[async_trait]
impl MovieApi for MockApi {
    async fn list_movies(&self) -> Result<Vec<Movie>, ClientError> {
        self.record("list_movies".to_owned());
        if self.fail_movies.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        Ok(self.movies.lock().unwrap().clone())
    }

    async fn find_movie(&self, id: MovieId) -> Result<Movie, ClientError> {
        self.record(format!("find_movie {id}"));
        self.movies
            .lock()
            .unwrap()
            .iter()
            .find(|m| m.id == id)
            .cloned()
            .ok_or(ClientError::NotFound { entity: "movie", id: id.to_string() })
    }

    async fn movies_by_genre(&self, genre: &str) -> Result<Vec<Movie>, ClientError> {
        self.record(format!("movies_by_genre {genre}"));
        if self.fail_movies.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        Ok(self
            .movies
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.genre.as_deref() == Some(genre))
            .cloned()
            .collect())
    }

    async fn create_movie(&self, draft: &MovieDraft) -> Result<Movie, ClientError> {
        self.record(format!("create_movie {}", draft.title));
        let mut movies = self.movies.lock().unwrap();
        let id = movies.iter().map(|m| m.id).max().unwrap_or(0) + 1;
        let created = Movie {
            id,
            title: draft.title.clone(),
            poster_url: Some(draft.poster_url.clone()),
            description: draft.description.clone(),
            genre: Some(draft.genre.clone()),
            release_year: Some(draft.release_year),
        };
        movies.push(created.clone());
        Ok(created)
    }

    async fn update_movie(&self, id: MovieId, draft: &MovieDraft) -> Result<Movie, ClientError> {
        self.record(format!("update_movie {id}"));
        let mut movies = self.movies.lock().unwrap();
        let movie = movies
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or(ClientError::NotFound { entity: "movie", id: id.to_string() })?;
        movie.title.clone_from(&draft.title);
        movie.release_year = Some(draft.release_year);
        Ok(movie.clone())
    }

    async fn delete_movie(&self, id: MovieId) -> Result<(), ClientError> {
        self.record(format!("delete_movie {id}"));
        self.movies.lock().unwrap().retain(|m| m.id != id);
        Ok(())
    }
}

#[async_trait]
impl UserApi for MockApi {
    async fn list_users(&self) -> Result<Vec<User>, ClientError> {
        self.record("list_users".to_owned());
        Ok(self.users.lock().unwrap().clone())
    }

    async fn find_user(&self, id: UserId) -> Result<User, ClientError> {
        self.record(format!("find_user {id}"));
        self.users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.id == id)
            .cloned()
            .ok_or(ClientError::NotFound { entity: "user", id: id.to_string() })
    }

    async fn update_user(&self, id: UserId, patch: &UserPatch) -> Result<User, ClientError> {
        self.record(format!("update_user {id}"));
        let mut users = self.users.lock().unwrap();
        let user = users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(ClientError::NotFound { entity: "user", id: id.to_string() })?;
        if let Some(role) = patch.role {
            user.role = Some(role);
        }
        Ok(user.clone())
    }

    async fn delete_user(&self, id: UserId) -> Result<(), ClientError> {
        self.record(format!("delete_user {id}"));
        self.users.lock().unwrap().retain(|u| u.id != id);
        Ok(())
    }
}

#[async_trait]
impl FavoritesApi for MockApi {
    async fn list_favorites(&self, user_id: UserId) -> Result<Vec<Movie>, ClientError> {
        self.record(format!("list_favorites {user_id}"));
        if self.fail_list_favorites.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        Ok(self.favorites.lock().unwrap().get(&user_id).cloned().unwrap_or_default())
    }

    async fn add_favorite(&self, user_id: UserId, movie_id: MovieId) -> Result<(), ClientError> {
        self.record(format!("add_favorite {user_id} {movie_id}"));
        if self.fail_add.load(Ordering::SeqCst) {
            return Err(ClientError::Api { status: 500, message: "Internal server error".to_owned() });
        }
        let movie = self
            .movies
            .lock()
            .unwrap()
            .iter()
            .find(|m| m.id == movie_id)
            .cloned()
            .ok_or(ClientError::Api { status: 404, message: "Movie not found".to_owned() })?;
        let mut favorites = self.favorites.lock().unwrap();
        let list = favorites.entry(user_id).or_default();
        if !list.iter().any(|m| m.id == movie_id) {
            list.push(movie);
        }
        Ok(())
    }

    async fn remove_favorite(&self, user_id: UserId, movie_id: MovieId) -> Result<(), ClientError> {
        self.record(format!("remove_favorite {user_id} {movie_id}"));
        if self.fail_remove.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        if let Some(list) = self.favorites.lock().unwrap().get_mut(&user_id) {
            list.retain(|m| m.id != movie_id);
        }
        Ok(())
    }
}

#[async_trait]
impl MailApi for MockApi {
    async fn send_mail(&self, mail: &MailRequest) -> Result<(), ClientError> {
        self.record(format!("send_mail {}", mail.to));
        Ok(())
    }
}
