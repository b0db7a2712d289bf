//! API request handlers

use crate::neo4j::GraphStore;
use crate::orchestrator::{ConsistencyOrchestrator, FriendFavourites, OrchestratorError, QueryStatus};
use axum::{
    extract::{Path, State},
    http::{StatusCode, Uri},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Shared server state
pub struct ServerState {
    pub orchestrator: Arc<ConsistencyOrchestrator>,
    /// Store handle used for health checks
    pub graph: Arc<dyn GraphStore>,
}

/// Shared orchestrator state
pub type OrchestratorState = Arc<ServerState>;

// ============================================================================
// Response envelope
// ============================================================================

/// Status tag of a response envelope.
///
/// Mirrors [`QueryStatus`] and adds the request-validation rejection that
/// never reaches the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResponseStatus {
    Ok,
    NotFound,
    Conflict,
    RemoteFailure,
    Internal,
    BadRequest,
}

impl From<QueryStatus> for ResponseStatus {
    fn from(status: QueryStatus) -> Self {
        match status {
            QueryStatus::Ok => ResponseStatus::Ok,
            QueryStatus::NotFound => ResponseStatus::NotFound,
            QueryStatus::Conflict => ResponseStatus::Conflict,
            QueryStatus::RemoteFailure => ResponseStatus::RemoteFailure,
            QueryStatus::Internal => ResponseStatus::Internal,
        }
    }
}

impl ResponseStatus {
    pub fn http_status(self) -> StatusCode {
        match self {
            ResponseStatus::Ok => StatusCode::OK,
            ResponseStatus::NotFound => StatusCode::NOT_FOUND,
            ResponseStatus::Conflict => StatusCode::CONFLICT,
            ResponseStatus::RemoteFailure => StatusCode::BAD_GATEWAY,
            ResponseStatus::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            ResponseStatus::BadRequest => StatusCode::BAD_REQUEST,
        }
    }
}

/// JSON body shared by every profile endpoint
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub path: String,
    pub status: ResponseStatus,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    fn ok(uri: &Uri, message: &str, data: Option<T>) -> Self {
        Self {
            path: uri.path().to_string(),
            status: ResponseStatus::Ok,
            message: message.to_string(),
            data,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> axum::response::Response {
        (self.status.http_status(), Json(self)).into_response()
    }
}

/// Application error type
#[derive(Debug)]
pub struct AppError {
    path: String,
    status: ResponseStatus,
    message: String,
}

impl AppError {
    pub fn bad_request(uri: &Uri, message: impl Into<String>) -> Self {
        Self {
            path: uri.path().to_string(),
            status: ResponseStatus::BadRequest,
            message: message.into(),
        }
    }

    pub fn from_orchestrator(uri: &Uri, err: OrchestratorError) -> Self {
        if let OrchestratorError::Internal(ref e) = err {
            tracing::error!(path = uri.path(), "Request failed: {:#}", e);
        }
        Self {
            path: uri.path().to_string(),
            status: err.status().into(),
            message: err.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        ApiResponse::<()> {
            path: self.path,
            status: self.status,
            message: self.message,
            data: None,
        }
        .into_response()
    }
}

const MISSING_PARAMETERS: &str = "Missing required parameters in request body";

fn required(uri: &Uri, value: Option<String>) -> Result<String, AppError> {
    value
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::bad_request(uri, MISSING_PARAMETERS))
}

// ============================================================================
// Health check
// ============================================================================

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub neo4j: String,
}

/// Health check handler, verifies connectivity to Neo4j.
///
/// Returns 200 + `"ok"` when the graph answers, 503 + `"unhealthy"` otherwise.
pub async fn health(State(state): State<OrchestratorState>) -> (StatusCode, Json<HealthResponse>) {
    let neo4j_ok = state.graph.health_check().await.unwrap_or(false);

    let (http_status, status, neo4j) = if neo4j_ok {
        (StatusCode::OK, "ok", "connected")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "unhealthy", "disconnected")
    };

    (
        http_status,
        Json(HealthResponse {
            status: status.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            neo4j: neo4j.to_string(),
        }),
    )
}

// ============================================================================
// Profiles and follows
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProfileRequest {
    pub user_name: Option<String>,
    pub full_name: Option<String>,
    pub password: Option<String>,
}

/// Public view of a created profile
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub user_name: String,
    pub full_name: String,
}

pub async fn create_profile(
    State(state): State<OrchestratorState>,
    uri: Uri,
    Json(req): Json<CreateProfileRequest>,
) -> Result<ApiResponse<ProfileResponse>, AppError> {
    let user_name = required(&uri, req.user_name)?;
    let full_name = required(&uri, req.full_name)?;
    let password = required(&uri, req.password)?;

    let profile = state
        .orchestrator
        .create_profile(&user_name, &full_name, &password)
        .await
        .map_err(|e| AppError::from_orchestrator(&uri, e))?;

    Ok(ApiResponse::ok(
        &uri,
        "Profile created successfully",
        Some(ProfileResponse {
            user_name: profile.user_name,
            full_name: profile.full_name,
        }),
    ))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendRequest {
    pub user_name: Option<String>,
    pub friend_user_name: Option<String>,
}

pub async fn follow_friend(
    State(state): State<OrchestratorState>,
    uri: Uri,
    Json(req): Json<FriendRequest>,
) -> Result<ApiResponse<()>, AppError> {
    let user_name = required(&uri, req.user_name)?;
    let friend_user_name = required(&uri, req.friend_user_name)?;

    state
        .orchestrator
        .follow_friend(&user_name, &friend_user_name)
        .await
        .map_err(|e| AppError::from_orchestrator(&uri, e))?;

    Ok(ApiResponse::ok(&uri, "Friend followed successfully", None))
}

pub async fn unfollow_friend(
    State(state): State<OrchestratorState>,
    uri: Uri,
    Json(req): Json<FriendRequest>,
) -> Result<ApiResponse<()>, AppError> {
    let user_name = required(&uri, req.user_name)?;
    let friend_user_name = required(&uri, req.friend_user_name)?;

    state
        .orchestrator
        .unfollow_friend(&user_name, &friend_user_name)
        .await
        .map_err(|e| AppError::from_orchestrator(&uri, e))?;

    Ok(ApiResponse::ok(&uri, "Friend unfollowed successfully", None))
}

// ============================================================================
// Songs
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SongRequest {
    pub user_name: Option<String>,
    pub song_id: Option<String>,
}

impl SongRequest {
    fn into_parts(self, uri: &Uri) -> Result<(String, String), AppError> {
        Ok((required(uri, self.user_name)?, required(uri, self.song_id)?))
    }
}

pub async fn like_song(
    State(state): State<OrchestratorState>,
    uri: Uri,
    Json(req): Json<SongRequest>,
) -> Result<ApiResponse<()>, AppError> {
    let (user_name, song_id) = req.into_parts(&uri)?;

    state
        .orchestrator
        .like_song(&user_name, &song_id)
        .await
        .map_err(|e| AppError::from_orchestrator(&uri, e))?;

    Ok(ApiResponse::ok(&uri, "Song liked successfully", None))
}

pub async fn unlike_song(
    State(state): State<OrchestratorState>,
    uri: Uri,
    Json(req): Json<SongRequest>,
) -> Result<ApiResponse<()>, AppError> {
    let (user_name, song_id) = req.into_parts(&uri)?;

    state
        .orchestrator
        .unlike_song(&user_name, &song_id)
        .await
        .map_err(|e| AppError::from_orchestrator(&uri, e))?;

    Ok(ApiResponse::ok(&uri, "Song unliked successfully", None))
}

pub async fn update_last_listened_song(
    State(state): State<OrchestratorState>,
    uri: Uri,
    Json(req): Json<SongRequest>,
) -> Result<ApiResponse<()>, AppError> {
    let (user_name, song_id) = req.into_parts(&uri)?;

    state
        .orchestrator
        .record_last_listened(&user_name, &song_id)
        .await
        .map_err(|e| AppError::from_orchestrator(&uri, e))?;

    Ok(ApiResponse::ok(
        &uri,
        "Last listened song updated successfully",
        None,
    ))
}

pub async fn get_all_friend_favourite_song_titles(
    State(state): State<OrchestratorState>,
    uri: Uri,
    Path(user_name): Path<String>,
) -> Result<ApiResponse<FriendFavourites>, AppError> {
    let favourites = state
        .orchestrator
        .list_friend_favourites(&user_name)
        .await
        .map_err(|e| AppError::from_orchestrator(&uri, e))?;

    Ok(ApiResponse::ok(
        &uri,
        "Friend favourite song titles retrieved",
        Some(favourites),
    ))
}

pub async fn get_most_recent_song(
    State(state): State<OrchestratorState>,
    uri: Uri,
    Path(user_name): Path<String>,
) -> Result<ApiResponse<String>, AppError> {
    let title = state
        .orchestrator
        .most_recent_song(&user_name)
        .await
        .map_err(|e| AppError::from_orchestrator(&uri, e))?;

    Ok(ApiResponse::ok(&uri, "Most recent song retrieved", Some(title)))
}
