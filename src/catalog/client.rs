//! HTTP catalog client
//!
//! Implements `CatalogClient` against the song service's REST API:
//! - `PUT /updateSongFavouritesCount` with `{"songId", "shouldDecrement"}`
//! - `PUT /incrementStreamCount/{songId}`
//! - `GET /getSongTitleById/{songId}` returning `{"data": "<title>"}`
//!
//! Every request carries the configured timeout; an unreachable or slow
//! catalog surfaces as [`CatalogError::Remote`], never as a hang.

use super::traits::{CatalogClient, CatalogError, CatalogResult, FavouriteDelta};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// HTTP client for the song catalog service.
///
/// Cheaply cloneable (shares the reqwest connection pool internally).
#[derive(Clone)]
pub struct HttpCatalogClient {
    client: reqwest::Client,
    base_url: String,
}

/// Body of `PUT /updateSongFavouritesCount`.
///
/// The song service binds the body as a string map, so the flag is sent
/// as `"true"` / `"false"`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FavouritesUpdate<'a> {
    song_id: &'a str,
    should_decrement: String,
}

/// Response envelope shared by the song service endpoints
#[derive(Debug, Deserialize)]
struct CatalogResponse {
    data: Option<serde_json::Value>,
    message: Option<String>,
}

impl HttpCatalogClient {
    /// Create a client for the catalog at `base_url` (e.g. `http://localhost:3001`)
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build catalog HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn song_url(&self, endpoint: &str, song_id: &str) -> String {
        self.url(&format!("/{}/{}", endpoint, urlencoding::encode(song_id)))
    }
}

fn transport_error(err: reqwest::Error) -> CatalogError {
    if err.is_timeout() {
        CatalogError::Remote(format!("timed out: {}", err))
    } else if err.is_connect() {
        CatalogError::Remote(format!("unreachable: {}", err))
    } else {
        CatalogError::Remote(err.to_string())
    }
}

/// Turn a non-2xx response into `CatalogError::Remote`, keeping the service's message
async fn expect_success(response: reqwest::Response) -> CatalogResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response
        .json::<CatalogResponse>()
        .await
        .ok()
        .and_then(|body| body.message)
        .unwrap_or_default();
    Err(CatalogError::Remote(format!("HTTP {} {}", status, message).trim_end().to_string()))
}

#[async_trait]
impl CatalogClient for HttpCatalogClient {
    async fn adjust_favourites(&self, song_id: &str, delta: FavouriteDelta) -> CatalogResult<()> {
        tracing::debug!(song_id, delta = delta.as_i64(), "Updating catalog favourites count");

        let body = FavouritesUpdate {
            song_id,
            should_decrement: delta.is_decrement().to_string(),
        };
        let response = self
            .client
            .put(self.url("/updateSongFavouritesCount"))
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        expect_success(response).await?;
        Ok(())
    }

    async fn increment_stream_count(&self, song_id: &str) -> CatalogResult<()> {
        tracing::debug!(song_id, "Incrementing catalog stream count");

        let response = self
            .client
            .put(self.song_url("incrementStreamCount", song_id))
            .send()
            .await
            .map_err(transport_error)?;

        expect_success(response).await?;
        Ok(())
    }

    async fn resolve_title(&self, song_id: &str) -> CatalogResult<String> {
        let response = self
            .client
            .get(self.song_url("getSongTitleById", song_id))
            .send()
            .await
            .map_err(transport_error)?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(CatalogError::NotFound(song_id.to_string()));
        }

        let body: CatalogResponse = expect_success(response)
            .await?
            .json()
            .await
            .map_err(|e| CatalogError::Remote(format!("invalid title response: {}", e)))?;

        match body.data {
            Some(serde_json::Value::String(title)) => Ok(title),
            _ => Err(CatalogError::Remote(format!(
                "title response for {} carried no title",
                song_id
            ))),
        }
    }
}
