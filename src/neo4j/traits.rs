//! GraphStore trait definition
//!
//! Defines the abstract interface for the social graph. Flows that must be
//! atomic run against a [`GraphTxn`] obtained from [`GraphStore::begin`];
//! the few operations that deliberately run outside any caller transaction
//! (orphan cleanup, health checks) live on [`GraphStore`] itself.
//!
//! Both traits are implemented by `Neo4jClient` and, in tests, by the
//! in-memory `MockGraphStore`.

use crate::neo4j::models::*;
use anyhow::Result;
use async_trait::async_trait;

/// Process-wide handle to the graph database.
///
/// Shared as `Arc<dyn GraphStore>`; each orchestrator operation acquires its
/// own transaction with [`begin`](Self::begin).
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Open a new transaction scoped to a single operation
    async fn begin(&self) -> Result<Box<dyn GraphTxn>>;

    /// Detach-delete the song reference `song_id` in its own auto-committed
    /// transaction.
    ///
    /// Returns `true` if a node was removed, `false` if it was already gone.
    async fn delete_song_ref(&self, song_id: &str) -> Result<bool>;

    /// Check connectivity to the backing store
    async fn health_check(&self) -> Result<bool>;
}

/// One graph transaction.
///
/// Reads observe the transaction's own writes. Nothing is visible to other
/// transactions until [`commit`](Self::commit); dropping the transaction or
/// calling [`rollback`](Self::rollback) discards every write.
#[async_trait]
pub trait GraphTxn: Send {
    // ========================================================================
    // Profiles
    // ========================================================================

    /// Whether a profile with this user name exists
    async fn profile_exists(&mut self, user_name: &str) -> Result<bool>;

    /// Create a profile, its favourites playlist and the `created` edge
    async fn create_profile(&mut self, profile: &ProfileNode) -> Result<()>;

    // ========================================================================
    // FOLLOWS
    // ========================================================================

    /// Whether `user_name` follows `friend_user_name`
    async fn is_following(&mut self, user_name: &str, friend_user_name: &str) -> Result<bool>;

    /// Merge a `FOLLOWS` edge (no-op if it already exists)
    async fn follow(&mut self, user_name: &str, friend_user_name: &str) -> Result<()>;

    /// Delete the `FOLLOWS` edge if present
    async fn unfollow(&mut self, user_name: &str, friend_user_name: &str) -> Result<()>;

    // ========================================================================
    // Favourites (includes)
    // ========================================================================

    /// Whether the user's favourites playlist includes `song_id`
    async fn is_song_liked(&mut self, user_name: &str, song_id: &str) -> Result<bool>;

    /// Merge the song reference and an `includes` edge from the user's playlist
    async fn add_favourite(&mut self, user_name: &str, song_id: &str) -> Result<()>;

    /// Delete the `includes` edge between the user's playlist and `song_id`
    async fn remove_favourite(&mut self, user_name: &str, song_id: &str) -> Result<()>;

    /// Traverse `FOLLOWS -> created -> includes`, grouped by friend
    async fn friend_favourites(&mut self, user_name: &str) -> Result<Vec<FriendSongs>>;

    // ========================================================================
    // LAST_LISTENED_TO
    // ========================================================================

    /// Song id the user last listened to, if any
    async fn last_listened(&mut self, user_name: &str) -> Result<Option<String>>;

    /// Replace the user's `LAST_LISTENED_TO` edge so that it points at `song_id`
    async fn replace_last_listened(&mut self, user_name: &str, song_id: &str) -> Result<()>;

    // ========================================================================
    // Settlement
    // ========================================================================

    /// Make every write in this transaction durable
    async fn commit(self: Box<Self>) -> Result<()>;

    /// Discard every write in this transaction
    async fn rollback(self: Box<Self>) -> Result<()>;
}
