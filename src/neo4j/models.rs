//! Neo4j graph models for profiles, favourites playlists and song references

use serde::{Deserialize, Serialize};

/// Suffix appended to a user name to form the name of their favourites playlist
pub const FAVOURITES_SUFFIX: &str = "-favorites";

/// Name of the favourites playlist owned by `user_name`
pub fn favourites_playlist_name(user_name: &str) -> String {
    format!("{}{}", user_name, FAVOURITES_SUFFIX)
}

// ============================================================================
// Profile Node
// ============================================================================

/// A user identity in the social graph.
///
/// Created once at signup together with its favourites playlist; this service
/// never deletes profiles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileNode {
    pub user_name: String,
    pub full_name: String,
    /// bcrypt hash, stored under the `password` property
    #[serde(skip_serializing)]
    pub password_hash: String,
}

impl ProfileNode {
    pub fn new(user_name: String, full_name: String, password_hash: String) -> Self {
        Self {
            user_name,
            full_name,
            password_hash,
        }
    }

    /// Name of this profile's favourites playlist
    pub fn playlist_name(&self) -> String {
        favourites_playlist_name(&self.user_name)
    }
}

// ============================================================================
// Traversal results
// ============================================================================

/// One followed profile and the song ids in its favourites playlist,
/// in the order the traversal yielded them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FriendSongs {
    pub friend_user_name: String,
    pub song_ids: Vec<String>,
}
