//! Administrator operations on the facade.
//!
//! Every method checks the stored role through [`gate::require_admin`]
//! before the request leaves the process. The server enforces the same rule;
//! the local check only keeps non-admins from issuing doomed calls.

#[cfg(test)]
#[path = "admin_test.rs"]
mod admin_test;

use tracing::{debug, info};

use crate::app::App;
use crate::error::ClientError;
use crate::gate;
use crate::net::api::RemoteApi;
use crate::net::types::{Movie, MovieDraft, MovieId, Role, User, UserId, UserPatch};

impl<A: RemoteApi + 'static> App<A> {
    fn require_admin(&self) -> Result<(), ClientError> {
        gate::require_admin(&self.session.current())
    }

    // =========================================================================
    // MOVIES
    // =========================================================================

    /// # Errors
    ///
    /// [`ClientError::Forbidden`]/[`ClientError::NotAuthenticated`] for
    /// non-admins, [`ClientError::Validation`] for an incomplete draft.
    pub async fn create_movie(&mut self, draft: &MovieDraft) -> Result<Movie, ClientError> {
        self.require_admin()?;
        draft.validate().map_err(ClientError::Validation)?;
        let created = self.api.create_movie(draft).await?;
        info!(movie_id = created.id, title = %created.title, "movie created");
        self.refresh_after_edit().await;
        Ok(created)
    }

    /// # Errors
    ///
    /// As [`App::create_movie`], plus [`ClientError::NotFound`].
    pub async fn update_movie(&mut self, id: MovieId, draft: &MovieDraft) -> Result<Movie, ClientError> {
        self.require_admin()?;
        draft.validate().map_err(ClientError::Validation)?;
        let updated = self.api.update_movie(id, draft).await?;
        info!(movie_id = id, "movie updated");
        self.refresh_after_edit().await;
        Ok(updated)
    }

    /// # Errors
    ///
    /// Admin check failure or the remote error.
    pub async fn delete_movie(&mut self, id: MovieId) -> Result<(), ClientError> {
        self.require_admin()?;
        self.api.delete_movie(id).await?;
        info!(movie_id = id, "movie deleted");
        self.refresh_after_edit().await;
        Ok(())
    }

    async fn refresh_after_edit(&mut self) {
        if let Err(e) = self.catalog.refresh().await {
            debug!(error = %e, "listing not refreshed after edit");
        }
    }

    // =========================================================================
    // USERS
    // =========================================================================

    /// # Errors
    ///
    /// Admin check failure or the remote error.
    pub async fn list_users(&self) -> Result<Vec<User>, ClientError> {
        self.require_admin()?;
        self.api.list_users().await
    }

    /// # Errors
    ///
    /// Admin check failure, [`ClientError::NotFound`], or the remote error.
    pub async fn find_user(&self, user_id: UserId) -> Result<User, ClientError> {
        self.require_admin()?;
        self.api.find_user(user_id).await
    }

    /// # Errors
    ///
    /// Admin check failure, [`ClientError::NotFound`], or the remote error.
    pub async fn set_user_role(&self, user_id: UserId, role: Role) -> Result<User, ClientError> {
        self.require_admin()?;
        let patch = UserPatch { role: Some(role), ..UserPatch::default() };
        let user = self.api.update_user(user_id, &patch).await?;
        info!(user_id, role = %role, "user role changed");
        Ok(user)
    }

    /// # Errors
    ///
    /// Admin check failure or the remote error.
    pub async fn delete_user(&self, user_id: UserId) -> Result<(), ClientError> {
        self.require_admin()?;
        self.api.delete_user(user_id).await?;
        info!(user_id, "user deleted");
        Ok(())
    }

    /// Another user's favorites. Read-only; the own cache is not touched.
    ///
    /// # Errors
    ///
    /// Admin check failure or [`ClientError::FavoritesUnavailable`].
    pub async fn user_favorites(&self, user_id: UserId) -> Result<Vec<Movie>, ClientError> {
        self.require_admin()?;
        self.api
            .list_favorites(user_id)
            .await
            .map_err(|e| ClientError::FavoritesUnavailable(e.to_string()))
    }

    /// Remove a favorite on behalf of `user_id`.
    ///
    /// Another user's list goes straight to the server. The admin's own id is
    /// routed through the favorites cache so it stays in step.
    ///
    /// # Errors
    ///
    /// Admin check failure or the remote error.
    pub async fn remove_user_favorite(&self, user_id: UserId, movie_id: MovieId) -> Result<(), ClientError> {
        self.require_admin()?;
        if self.session.user_id() == Some(user_id) {
            return self.favorites.remove(user_id, movie_id).await;
        }
        self.api.remove_favorite(user_id, movie_id).await?;
        info!(user_id, movie_id, "favorite removed for user");
        Ok(())
    }
}
