//! API route definitions

use super::handlers::{self, OrchestratorState};
use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Create the API router
pub fn create_router(state: OrchestratorState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check
        .route("/health", get(handlers::health))
        // ====================================================================
        // Profiles
        // ====================================================================
        .route("/profile", post(handlers::create_profile))
        .route("/followFriend", put(handlers::follow_friend))
        .route("/unfollowFriend", put(handlers::unfollow_friend))
        // ====================================================================
        // Songs (graph + catalog)
        // ====================================================================
        .route("/likeSong", put(handlers::like_song))
        .route("/unlikeSong", put(handlers::unlike_song))
        .route(
            "/updateLastListenedSong",
            put(handlers::update_last_listened_song),
        )
        .route(
            "/getAllFriendFavouriteSongTitles/{user_name}",
            get(handlers::get_all_friend_favourite_song_titles),
        )
        .route(
            "/getMostRecentSong/{user_name}",
            get(handlers::get_most_recent_song),
        )
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
