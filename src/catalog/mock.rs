//! In-memory mock implementation of CatalogClient for testing without a real song service.

use super::traits::{CatalogClient, CatalogError, CatalogResult, FavouriteDelta};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;

/// Canonical song record as the catalog owns it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogSong {
    pub id: String,
    pub name: String,
    pub artist: String,
    pub album: String,
    pub favourites_count: u64,
    pub stream_count: u64,
}

/// In-memory mock implementation of CatalogClient for testing.
///
/// Counts every call per operation so tests can assert on remote-call
/// ordering and idempotency, and can simulate an outage or a slow catalog.
pub struct MockCatalogClient {
    songs: RwLock<HashMap<String, CatalogSong>>,
    unreachable: AtomicBool,
    latency: RwLock<Option<Duration>>,
    favourite_calls: AtomicUsize,
    stream_calls: AtomicUsize,
    resolve_calls: AtomicUsize,
}

impl MockCatalogClient {
    /// Create a new empty catalog.
    pub fn new() -> Self {
        Self {
            songs: RwLock::new(HashMap::new()),
            unreachable: AtomicBool::new(false),
            latency: RwLock::new(None),
            favourite_calls: AtomicUsize::new(0),
            stream_calls: AtomicUsize::new(0),
            resolve_calls: AtomicUsize::new(0),
        }
    }

    /// Seed a song into the catalog.
    pub async fn with_song(self, id: &str, name: &str) -> Self {
        self.songs.write().await.insert(
            id.to_string(),
            CatalogSong {
                id: id.to_string(),
                name: name.to_string(),
                artist: "Test Artist".to_string(),
                album: "Test Album".to_string(),
                favourites_count: 0,
                stream_count: 0,
            },
        );
        self
    }

    /// Delay every call by `latency` before answering.
    pub async fn with_latency(self, latency: Duration) -> Self {
        *self.latency.write().await = Some(latency);
        self
    }

    /// Delete a song, as the catalog's own delete endpoint would.
    pub async fn remove_song(&self, id: &str) {
        self.songs.write().await.remove(id);
    }

    /// Simulate a network outage.
    pub fn set_unreachable(&self, unreachable: bool) {
        self.unreachable.store(unreachable, Ordering::SeqCst);
    }

    pub async fn song(&self, id: &str) -> Option<CatalogSong> {
        self.songs.read().await.get(id).cloned()
    }

    pub async fn favourites_count(&self, id: &str) -> u64 {
        self.song(id).await.map(|s| s.favourites_count).unwrap_or(0)
    }

    pub async fn stream_count(&self, id: &str) -> u64 {
        self.song(id).await.map(|s| s.stream_count).unwrap_or(0)
    }

    pub fn favourite_calls(&self) -> usize {
        self.favourite_calls.load(Ordering::SeqCst)
    }

    pub fn stream_calls(&self) -> usize {
        self.stream_calls.load(Ordering::SeqCst)
    }

    pub fn resolve_calls(&self) -> usize {
        self.resolve_calls.load(Ordering::SeqCst)
    }

    async fn simulate_network(&self) -> CatalogResult<()> {
        let latency = *self.latency.read().await;
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        if self.unreachable.load(Ordering::SeqCst) {
            return Err(CatalogError::Remote(
                "unreachable: connection refused".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for MockCatalogClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CatalogClient for MockCatalogClient {
    async fn adjust_favourites(&self, song_id: &str, delta: FavouriteDelta) -> CatalogResult<()> {
        self.favourite_calls.fetch_add(1, Ordering::SeqCst);
        self.simulate_network().await?;

        let mut songs = self.songs.write().await;
        let song = songs
            .get_mut(song_id)
            .ok_or_else(|| CatalogError::Remote(format!("HTTP 404 Not Found: {}", song_id)))?;
        song.favourites_count = match delta {
            FavouriteDelta::Increment => song.favourites_count + 1,
            FavouriteDelta::Decrement => song.favourites_count.saturating_sub(1),
        };
        Ok(())
    }

    async fn increment_stream_count(&self, song_id: &str) -> CatalogResult<()> {
        self.stream_calls.fetch_add(1, Ordering::SeqCst);
        self.simulate_network().await?;

        let mut songs = self.songs.write().await;
        let song = songs
            .get_mut(song_id)
            .ok_or_else(|| CatalogError::Remote(format!("HTTP 404 Not Found: {}", song_id)))?;
        song.stream_count += 1;
        Ok(())
    }

    async fn resolve_title(&self, song_id: &str) -> CatalogResult<String> {
        self.resolve_calls.fetch_add(1, Ordering::SeqCst);
        self.simulate_network().await?;

        self.songs
            .read()
            .await
            .get(song_id)
            .map(|s| s.name.clone())
            .ok_or_else(|| CatalogError::NotFound(song_id.to_string()))
    }
}
