//! CatalogClient trait definition
//!
//! Defines the synchronous RPC boundary to the song catalog service, which
//! owns canonical song metadata and the favourites / stream counters.
//! This trait follows the same pattern as `GraphStore`:
//! async trait + Send + Sync for `Arc<dyn CatalogClient>` usage.

use async_trait::async_trait;
use thiserror::Error;

/// Failure reported by the catalog boundary
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// The catalog has no song with this id
    #[error("song {0} not found in catalog")]
    NotFound(String),

    /// Transport error, timeout, or non-success response
    #[error("catalog request failed: {0}")]
    Remote(String),
}

pub type CatalogResult<T> = std::result::Result<T, CatalogError>;

/// Direction of a favourites counter change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FavouriteDelta {
    Increment,
    Decrement,
}

impl FavouriteDelta {
    /// Signed value of the change (+1 / -1)
    pub fn as_i64(self) -> i64 {
        match self {
            FavouriteDelta::Increment => 1,
            FavouriteDelta::Decrement => -1,
        }
    }

    pub fn is_decrement(self) -> bool {
        matches!(self, FavouriteDelta::Decrement)
    }
}

/// Abstract interface to the song catalog.
///
/// # Implementations
///
/// - [`HttpCatalogClient`](super::HttpCatalogClient): HTTP client for the song service
/// - `MockCatalogClient`: in-memory catalog with call counters (tests only)
#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// Apply `delta` to the song's favourites counter
    async fn adjust_favourites(&self, song_id: &str, delta: FavouriteDelta) -> CatalogResult<()>;

    /// Add one to the song's stream counter
    async fn increment_stream_count(&self, song_id: &str) -> CatalogResult<()>;

    /// Resolve a song id to its title.
    ///
    /// # Errors
    ///
    /// [`CatalogError::NotFound`] when the catalog no longer knows the song;
    /// [`CatalogError::Remote`] for every other failure.
    async fn resolve_title(&self, song_id: &str) -> CatalogResult<String>;
}
