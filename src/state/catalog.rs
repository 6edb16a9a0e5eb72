//! Movie listing with local title search.
//!
//! The server has no search endpoint; title filtering runs over the last
//! fetched listing. Genre filtering is remote.

#[cfg(test)]
#[path = "catalog_test.rs"]
mod catalog_test;

use std::sync::Arc;

use tracing::{info, warn};

use crate::error::ClientError;
use crate::net::api::MovieApi;
use crate::net::types::{Movie, MovieId};

/// Genres offered by the genre picker.
pub const GENRES: [&str; 5] = ["Action", "Horror", "Comedy", "Fantasy", "Adventure"];

/// Case-insensitive title substring filter. A blank query keeps everything.
#[must_use]
pub fn search_titles(movies: &[Movie], query: &str) -> Vec<Movie> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return movies.to_vec();
    }
    movies
        .iter()
        .filter(|m| m.title.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}

pub struct Catalog {
    api: Arc<dyn MovieApi>,
    movies: Vec<Movie>,
}

impl Catalog {
    pub fn new(api: Arc<dyn MovieApi>) -> Self {
        Self { api, movies: Vec::new() }
    }

    /// Last successfully fetched listing.
    #[must_use]
    pub fn movies(&self) -> &[Movie] {
        &self.movies
    }

    /// Re-fetch the full listing.
    ///
    /// # Errors
    ///
    /// Returns the remote error; the previous listing is kept.
    pub async fn refresh(&mut self) -> Result<&[Movie], ClientError> {
        match self.api.list_movies().await {
            Ok(movies) => {
                info!(count = movies.len(), "catalog refreshed");
                self.movies = movies;
                Ok(&self.movies)
            }
            Err(e) => {
                warn!(error = %e, "catalog refresh failed; keeping previous listing");
                Err(e)
            }
        }
    }

    #[must_use]
    pub fn search(&self, query: &str) -> Vec<Movie> {
        search_titles(&self.movies, query)
    }

    /// Movies in `genre`; a blank genre means the full cached listing.
    ///
    /// # Errors
    ///
    /// Returns the remote error for non-blank genres.
    pub async fn by_genre(&self, genre: &str) -> Result<Vec<Movie>, ClientError> {
        let genre = genre.trim();
        if genre.is_empty() {
            return Ok(self.movies.clone());
        }
        self.api.movies_by_genre(genre).await
    }

    /// # Errors
    ///
    /// [`ClientError::NotFound`] for unknown ids, or the remote error.
    pub async fn movie(&self, id: MovieId) -> Result<Movie, ClientError> {
        self.api.find_movie(id).await
    }
}
