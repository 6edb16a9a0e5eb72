//! Local mirror of a user's favorite movies.
//!
//! DESIGN
//! ======
//! Every favorite toggle is a two-phase change:
//!
//! 1. `stage_*` applies the mutation to the local list immediately and
//!    returns a [`PendingChange`] describing how to undo it.
//! 2. `commit` sends the change to the server. On failure it runs the one
//!    reconciliation routine: reload the list from the server, and if that
//!    reload also fails, roll the staged change back. The caller still gets
//!    the server's error.
//!
//! CONCURRENCY
//! ===========
//! State sits behind a `Mutex` that is never held across an `.await`, so
//! several toggles may be in flight and finish in any order. The list is
//! authoritative only after the next successful `load`.
//!
//! An epoch counter is bumped whenever the list is discarded or switches
//! owner. Loads and rollbacks that started under an older epoch are
//! dropped, so a request finishing after logout cannot write one user's
//! favorites into the next user's cache.

#[cfg(test)]
#[path = "favorites_test.rs"]
mod favorites_test;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, warn};

use crate::error::ClientError;
use crate::net::api::FavoritesApi;
use crate::net::types::{Movie, MovieId, UserId};

#[derive(Clone, Debug, PartialEq)]
pub struct FavoriteEntry {
    pub movie_id: MovieId,
    pub movie: Movie,
}

impl From<Movie> for FavoriteEntry {
    fn from(movie: Movie) -> Self {
        Self { movie_id: movie.id, movie }
    }
}

#[derive(Debug, Default)]
struct CacheState {
    owner: Option<UserId>,
    entries: Vec<FavoriteEntry>,
    epoch: u64,
}

impl CacheState {
    fn position(&self, movie_id: MovieId) -> Option<usize> {
        self.entries.iter().position(|e| e.movie_id == movie_id)
    }

    fn is_current(&self, user_id: UserId, epoch: u64) -> bool {
        self.epoch == epoch && self.owner == Some(user_id)
    }

    /// Drop entries belonging to another user before touching the list.
    fn claim(&mut self, user_id: UserId) {
        if self.owner != Some(user_id) {
            if self.owner.is_some() {
                self.entries.clear();
                self.epoch += 1;
            }
            self.owner = Some(user_id);
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Change {
    Insert { movie_id: MovieId },
    Delete { movie_id: MovieId, removed: Option<(usize, FavoriteEntry)> },
}

/// A local mutation that has been applied but not yet confirmed.
#[derive(Debug, Clone, PartialEq)]
#[must_use = "a staged change must be committed"]
pub struct PendingChange {
    user_id: UserId,
    epoch: u64,
    change: Change,
}

impl PendingChange {
    #[must_use]
    pub fn movie_id(&self) -> MovieId {
        match self.change {
            Change::Insert { movie_id } | Change::Delete { movie_id, .. } => movie_id,
        }
    }
}

pub struct FavoritesCache {
    api: Arc<dyn FavoritesApi>,
    state: Mutex<CacheState>,
}

impl FavoritesCache {
    pub fn new(api: Arc<dyn FavoritesApi>) -> Self {
        Self { api, state: Mutex::new(CacheState::default()) }
    }

    fn state(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // =========================================================================
    // READS
    // =========================================================================

    #[must_use]
    pub fn contains(&self, movie_id: MovieId) -> bool {
        self.state().position(movie_id).is_some()
    }

    #[must_use]
    pub fn entries(&self) -> Vec<FavoriteEntry> {
        self.state().entries.clone()
    }

    #[must_use]
    pub fn movie_ids(&self) -> Vec<MovieId> {
        self.state().entries.iter().map(|e| e.movie_id).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.state().entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state().entries.is_empty()
    }

    /// User whose favorites are currently held.
    #[must_use]
    pub fn owner(&self) -> Option<UserId> {
        self.state().owner
    }

    // =========================================================================
    // LOAD / DISCARD
    // =========================================================================

    /// Replace the list with the server's view for `user_id`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::FavoritesUnavailable`] if the fetch fails or the
    /// cache was discarded while the fetch was in flight. The previous
    /// contents are kept on failure.
    pub async fn load(&self, user_id: UserId) -> Result<(), ClientError> {
        let epoch = {
            let mut state = self.state();
            state.claim(user_id);
            state.epoch
        };
        self.fetch_into(user_id, epoch).await
    }

    /// Fetch and apply, unless the cache moved past `epoch` meanwhile.
    async fn fetch_into(&self, user_id: UserId, epoch: u64) -> Result<(), ClientError> {
        let movies = self.api.list_favorites(user_id).await.map_err(|e| {
            warn!(user_id, error = %e, "favorites fetch failed; keeping previous list");
            ClientError::FavoritesUnavailable(e.to_string())
        })?;

        let mut state = self.state();
        if !state.is_current(user_id, epoch) {
            debug!(user_id, "favorites load finished after the cache was reset; dropped");
            return Err(ClientError::FavoritesUnavailable("favorites were reset during load".to_owned()));
        }
        state.entries = dedup_entries(movies);
        info!(user_id, count = state.entries.len(), "favorites loaded");
        Ok(())
    }

    /// Forget everything, e.g. on logout.
    pub fn discard(&self) {
        let mut state = self.state();
        state.entries.clear();
        state.owner = None;
        state.epoch += 1;
    }

    // =========================================================================
    // STAGE
    // =========================================================================

    /// Optimistically insert `movie`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::DuplicateFavorite`] if the movie is already
    /// present; the list is unchanged.
    pub fn stage_add(&self, user_id: UserId, movie: Movie) -> Result<PendingChange, ClientError> {
        let mut state = self.state();
        state.claim(user_id);
        let movie_id = movie.id;
        if state.position(movie_id).is_some() {
            return Err(ClientError::DuplicateFavorite { movie_id });
        }
        state.entries.push(FavoriteEntry::from(movie));
        Ok(PendingChange { user_id, epoch: state.epoch, change: Change::Insert { movie_id } })
    }

    /// Optimistically delete `movie_id`. Absent ids still produce a change
    /// so the server gets the delete.
    pub fn stage_remove(&self, user_id: UserId, movie_id: MovieId) -> PendingChange {
        let mut state = self.state();
        state.claim(user_id);
        let removed = state
            .position(movie_id)
            .map(|index| (index, state.entries.remove(index)));
        PendingChange { user_id, epoch: state.epoch, change: Change::Delete { movie_id, removed } }
    }

    // =========================================================================
    // COMMIT / RECONCILE
    // =========================================================================

    /// Confirm a staged change with the server.
    ///
    /// # Errors
    ///
    /// Returns the server error after reconciling the local list.
    pub async fn commit(&self, pending: PendingChange) -> Result<(), ClientError> {
        let user_id = pending.user_id;
        let movie_id = pending.movie_id();
        let result = match pending.change {
            Change::Insert { .. } => self.api.add_favorite(user_id, movie_id).await,
            Change::Delete { .. } => self.api.remove_favorite(user_id, movie_id).await,
        };
        match result {
            Ok(()) => Ok(()),
            Err(e) => {
                warn!(user_id, movie_id, error = %e, "favorite change rejected; reconciling");
                self.reconcile(&pending).await;
                Err(e)
            }
        }
    }

    async fn reconcile(&self, pending: &PendingChange) {
        if !self.state().is_current(pending.user_id, pending.epoch) {
            debug!(movie_id = pending.movie_id(), "cache reset since staging; nothing to reconcile");
            return;
        }
        match self.fetch_into(pending.user_id, pending.epoch).await {
            Ok(()) => debug!(movie_id = pending.movie_id(), "reconciled by reload"),
            Err(e) => {
                debug!(error = %e, "reload failed; rolling back staged change");
                self.roll_back(pending);
            }
        }
    }

    fn roll_back(&self, pending: &PendingChange) {
        let mut state = self.state();
        if !state.is_current(pending.user_id, pending.epoch) {
            return;
        }
        match &pending.change {
            Change::Insert { movie_id } => {
                if let Some(index) = state.position(*movie_id) {
                    state.entries.remove(index);
                }
            }
            Change::Delete { movie_id, removed: Some((index, entry)) } => {
                if state.position(*movie_id).is_none() {
                    let index = (*index).min(state.entries.len());
                    state.entries.insert(index, entry.clone());
                }
            }
            Change::Delete { removed: None, .. } => {}
        }
    }

    // =========================================================================
    // ONE-SHOT OPERATIONS
    // =========================================================================

    /// Stage and commit an insert.
    ///
    /// # Errors
    ///
    /// [`ClientError::DuplicateFavorite`] before any request, or the server
    /// error after reconciliation.
    pub async fn add(&self, user_id: UserId, movie: Movie) -> Result<(), ClientError> {
        let pending = self.stage_add(user_id, movie)?;
        self.commit(pending).await
    }

    /// Stage and commit a delete.
    ///
    /// # Errors
    ///
    /// Returns the server error after reconciliation.
    pub async fn remove(&self, user_id: UserId, movie_id: MovieId) -> Result<(), ClientError> {
        let pending = self.stage_remove(user_id, movie_id);
        self.commit(pending).await
    }

    /// Add when absent, remove when present. Returns whether the movie is
    /// now a favorite.
    ///
    /// # Errors
    ///
    /// Returns the server error after reconciliation.
    pub async fn toggle(&self, user_id: UserId, movie: Movie) -> Result<bool, ClientError> {
        if self.contains(movie.id) {
            self.remove(user_id, movie.id).await?;
            Ok(false)
        } else {
            self.add(user_id, movie).await?;
            Ok(true)
        }
    }
}

/// Keep the first occurrence of each movie id, preserving server order.
fn dedup_entries(movies: Vec<Movie>) -> Vec<FavoriteEntry> {
    let mut entries: Vec<FavoriteEntry> = Vec::with_capacity(movies.len());
    for movie in movies {
        if !entries.iter().any(|e| e.movie_id == movie.id) {
            entries.push(FavoriteEntry::from(movie));
        }
    }
    entries
}
