//! Application facade.
//!
//! DESIGN
//! ======
//! `App` wires the session store, the favorites cache and the catalog to one
//! [`RemoteApi`] handle. It is what a screen (or the CLI) talks to: every
//! method reads the signed-in user from the session, checks local
//! preconditions, then forwards to the component that owns the state.
//!
//! ERROR HANDLING
//! ==============
//! Preconditions (missing session, blank form fields) fail before any
//! request. Remote failures come back unchanged; the favorites cache has
//! already reconciled itself by the time they do.

#[cfg(test)]
#[path = "app_test.rs"]
mod app_test;

use std::sync::Arc;

use tracing::{info, warn};

use crate::error::ClientError;
use crate::gate::{self, Decision, Route};
use crate::net::api::RemoteApi;
use crate::net::types::{MailRequest, Movie, MovieId, UserId};
use crate::state::catalog::Catalog;
use crate::state::favorites::{FavoriteEntry, FavoritesCache};
use crate::state::session::{Session, SessionStore};

pub struct App<A: RemoteApi + 'static> {
    pub(crate) api: Arc<A>,
    pub(crate) session: SessionStore,
    pub(crate) favorites: FavoritesCache,
    pub(crate) catalog: Catalog,
}

impl<A: RemoteApi + 'static> App<A> {
    pub fn new(api: Arc<A>, session: SessionStore) -> Self {
        let favorites = FavoritesCache::new(api.clone());
        let catalog = Catalog::new(api.clone());
        Self { api, session, favorites, catalog }
    }

    #[must_use]
    pub fn session(&self) -> Session {
        self.session.current()
    }

    #[must_use]
    pub fn favorites(&self) -> &FavoritesCache {
        &self.favorites
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn catalog_mut(&mut self) -> &mut Catalog {
        &mut self.catalog
    }

    fn signed_in_user(&self) -> Result<UserId, ClientError> {
        self.session.user_id().ok_or(ClientError::NotAuthenticated)
    }

    // =========================================================================
    // ACCOUNT
    // =========================================================================

    /// Create a `USER` account and return its id.
    ///
    /// # Errors
    ///
    /// [`ClientError::Validation`] for blank fields, [`ClientError::Registration`]
    /// with the server's message when no id comes back.
    pub async fn register(&self, name: &str, email: &str, password: &str) -> Result<UserId, ClientError> {
        if [name, email, password].iter().any(|field| field.trim().is_empty()) {
            return Err(ClientError::Validation("Name, email and password are required".to_owned()));
        }
        let response = self.api.register(name.trim(), email.trim(), password).await?;
        match response.id {
            Some(id) => {
                info!(user_id = id, "account registered");
                Ok(id)
            }
            None => Err(ClientError::Registration(
                response.message.unwrap_or_else(|| "Registration failed".to_owned()),
            )),
        }
    }

    /// Sign in, seed favorites, and return the landing route.
    ///
    /// # Errors
    ///
    /// [`ClientError::InvalidCredentials`] with the server's message, or the
    /// transport error. A failure to seed favorites does not fail the login.
    /// If storing the session fails, the session and the cached favorites
    /// are both cleared.
    pub async fn login(&self, email: &str, password: &str) -> Result<Route, ClientError> {
        let response = self.api.login(email.trim(), password).await?;
        let session = match self.session.accept_login(response) {
            Ok(session) => session,
            Err(e) => {
                if !self.session.is_authenticated() {
                    self.favorites.discard();
                }
                return Err(e);
            }
        };
        self.favorites.discard();
        if let Some(user_id) = session.authenticated_user()
            && let Err(e) = self.favorites.load(user_id).await
        {
            warn!(user_id, error = %e, "favorites not seeded after login");
        }
        Ok(gate::landing_route(&session))
    }

    /// Clear the session and forget the cached favorites.
    pub fn logout(&self) {
        self.session.logout();
        self.favorites.discard();
        info!("session ended");
    }

    /// Reload favorites for a session that survived a restart.
    ///
    /// # Errors
    ///
    /// [`ClientError::FavoritesUnavailable`] when the reload fails. Returns
    /// `Ok` without a request when nobody is signed in.
    pub async fn restore(&self) -> Result<(), ClientError> {
        match self.session.user_id() {
            Some(user_id) => self.favorites.load(user_id).await,
            None => Ok(()),
        }
    }

    // =========================================================================
    // NAVIGATION
    // =========================================================================

    #[must_use]
    pub fn navigate(&self, path: &str) -> (Route, Decision) {
        gate::decide_path(path, &self.session.current())
    }

    // =========================================================================
    // FAVORITES
    // =========================================================================

    /// # Errors
    ///
    /// [`ClientError::NotAuthenticated`] without a session, otherwise
    /// [`ClientError::FavoritesUnavailable`].
    pub async fn load_favorites(&self) -> Result<Vec<FavoriteEntry>, ClientError> {
        let user_id = self.signed_in_user()?;
        self.favorites.load(user_id).await?;
        Ok(self.favorites.entries())
    }

    /// # Errors
    ///
    /// [`ClientError::NotAuthenticated`], [`ClientError::DuplicateFavorite`],
    /// or the server error after reconciliation.
    pub async fn add_favorite(&self, movie: Movie) -> Result<(), ClientError> {
        let user_id = self.signed_in_user()?;
        self.favorites.add(user_id, movie).await
    }

    /// Add by id, resolving the movie from the cached listing or the server.
    ///
    /// # Errors
    ///
    /// As [`App::add_favorite`], plus [`ClientError::NotFound`] for unknown ids.
    pub async fn add_favorite_by_id(&self, movie_id: MovieId) -> Result<Movie, ClientError> {
        let user_id = self.signed_in_user()?;
        if self.favorites.contains(movie_id) {
            return Err(ClientError::DuplicateFavorite { movie_id });
        }
        let movie = match self.catalog.movies().iter().find(|m| m.id == movie_id) {
            Some(movie) => movie.clone(),
            None => self.catalog.movie(movie_id).await?,
        };
        self.favorites.add(user_id, movie.clone()).await?;
        Ok(movie)
    }

    /// # Errors
    ///
    /// [`ClientError::NotAuthenticated`] or the server error after
    /// reconciliation.
    pub async fn remove_favorite(&self, movie_id: MovieId) -> Result<(), ClientError> {
        let user_id = self.signed_in_user()?;
        self.favorites.remove(user_id, movie_id).await
    }

    /// Returns whether the movie is a favorite afterwards.
    ///
    /// # Errors
    ///
    /// [`ClientError::NotAuthenticated`] or the server error after
    /// reconciliation.
    pub async fn toggle_favorite(&self, movie: Movie) -> Result<bool, ClientError> {
        let user_id = self.signed_in_user()?;
        self.favorites.toggle(user_id, movie).await
    }

    // =========================================================================
    // MAIL
    // =========================================================================

    /// # Errors
    ///
    /// [`ClientError::Validation`] without a recipient, otherwise the remote error.
    pub async fn send_mail(&self, to: &str, subject: &str, text: &str) -> Result<(), ClientError> {
        if to.trim().is_empty() {
            return Err(ClientError::Validation("Recipient is required".to_owned()));
        }
        let mail = MailRequest { to: to.trim().to_owned(), subject: subject.to_owned(), text: text.to_owned() };
        self.api.send_mail(&mail).await?;
        info!(to = %mail.to, "mail sent");
        Ok(())
    }
}
