//! Cross-store consistency flows
//!
//! Every operation that touches both the graph and the catalog follows the
//! same shape: open one graph transaction, validate the graph-side
//! precondition, perform the catalog call, and only then write the graph and
//! commit. A catalog failure leaves the graph untouched. Reads close their
//! transaction before fanning out to the catalog and hand stale song ids to
//! the [`OrphanReconciler`] instead of failing.

use super::error::{OrchestratorError, Result};
use super::reconciler::OrphanReconciler;
use crate::catalog::{CatalogClient, CatalogError, FavouriteDelta};
use crate::neo4j::{GraphStore, GraphTxn, ProfileNode};
use anyhow::Context;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Friend user name -> titles of the songs that friend has favourited
pub type FriendFavourites = BTreeMap<String, Vec<String>>;

/// Coordinates the graph store and the song catalog for profile operations.
pub struct ConsistencyOrchestrator {
    graph: Arc<dyn GraphStore>,
    catalog: Arc<dyn CatalogClient>,
    reconciler: OrphanReconciler,
    password_cost: u32,
}

impl ConsistencyOrchestrator {
    pub fn new(graph: Arc<dyn GraphStore>, catalog: Arc<dyn CatalogClient>) -> Self {
        let reconciler = OrphanReconciler::new(graph.clone());
        Self {
            graph,
            catalog,
            reconciler,
            password_cost: bcrypt::DEFAULT_COST,
        }
    }

    /// Override the bcrypt cost used by [`create_profile`](Self::create_profile)
    pub fn with_password_cost(mut self, cost: u32) -> Self {
        self.password_cost = cost;
        self
    }

    pub fn reconciler(&self) -> &OrphanReconciler {
        &self.reconciler
    }

    // ========================================================================
    // Favourites
    // ========================================================================

    /// Add `song_id` to the user's favourites and bump the catalog counter.
    pub async fn like_song(&self, user_name: &str, song_id: &str) -> Result<()> {
        let mut txn = self.graph.begin().await?;
        let outcome = self.like_song_in(txn.as_mut(), user_name, song_id).await;
        settle(txn, outcome, Some(song_id)).await?;

        info!(user_name, song_id, flow = "like_song", "Song liked");
        Ok(())
    }

    async fn like_song_in(
        &self,
        txn: &mut dyn GraphTxn,
        user_name: &str,
        song_id: &str,
    ) -> Result<()> {
        require_profile(txn, user_name).await?;
        if txn.is_song_liked(user_name, song_id).await? {
            return Err(OrchestratorError::Conflict(
                "User already likes the song".to_string(),
            ));
        }

        self.catalog
            .adjust_favourites(song_id, FavouriteDelta::Increment)
            .await
            .map_err(|e| remote_failure("Failed to increment song favourites count", e))?;

        txn.add_favourite(user_name, song_id).await?;
        Ok(())
    }

    /// Remove `song_id` from the user's favourites and lower the catalog counter.
    pub async fn unlike_song(&self, user_name: &str, song_id: &str) -> Result<()> {
        let mut txn = self.graph.begin().await?;
        let outcome = self.unlike_song_in(txn.as_mut(), user_name, song_id).await;
        settle(txn, outcome, Some(song_id)).await?;

        info!(user_name, song_id, flow = "unlike_song", "Song unliked");
        Ok(())
    }

    async fn unlike_song_in(
        &self,
        txn: &mut dyn GraphTxn,
        user_name: &str,
        song_id: &str,
    ) -> Result<()> {
        require_profile(txn, user_name).await?;
        if !txn.is_song_liked(user_name, song_id).await? {
            return Err(OrchestratorError::Conflict(
                "User does not like the song".to_string(),
            ));
        }

        self.catalog
            .adjust_favourites(song_id, FavouriteDelta::Decrement)
            .await
            .map_err(|e| remote_failure("Failed to decrement song favourites count", e))?;

        txn.remove_favourite(user_name, song_id).await?;
        Ok(())
    }

    /// Titles of every song the user's friends have favourited, grouped by friend.
    ///
    /// Songs the catalog no longer knows are skipped and scheduled for
    /// removal. Each distinct song id is resolved at most once per call.
    pub async fn list_friend_favourites(&self, user_name: &str) -> Result<FriendFavourites> {
        let mut txn = self.graph.begin().await?;
        let traversal = txn
            .friend_favourites(user_name)
            .await
            .map_err(OrchestratorError::from);
        let friends = release(txn, traversal).await?;

        let mut resolved: HashMap<String, Option<String>> = HashMap::new();
        let mut favourites = FriendFavourites::new();

        for friend in friends {
            let mut titles = Vec::with_capacity(friend.song_ids.len());
            for song_id in &friend.song_ids {
                let title = match resolved.get(song_id) {
                    Some(cached) => cached.clone(),
                    None => {
                        let title = self.resolve_or_reconcile(song_id).await?;
                        resolved.insert(song_id.clone(), title.clone());
                        title
                    }
                };
                if let Some(title) = title {
                    titles.push(title);
                }
            }
            if !titles.is_empty() {
                favourites.insert(friend.friend_user_name, titles);
            }
        }

        if favourites.is_empty() {
            return Err(OrchestratorError::NotFound(
                "No songs liked by friends".to_string(),
            ));
        }

        debug!(
            user_name,
            friends = favourites.len(),
            flow = "list_friend_favourites",
            "Listed friend favourites"
        );
        Ok(favourites)
    }

    // ========================================================================
    // Listening history
    // ========================================================================

    /// Make `song_id` the user's most recent song and bump its stream count.
    pub async fn record_last_listened(&self, user_name: &str, song_id: &str) -> Result<()> {
        let mut txn = self.graph.begin().await?;
        let outcome = self
            .record_last_listened_in(txn.as_mut(), user_name, song_id)
            .await;
        settle(txn, outcome, Some(song_id)).await?;

        info!(user_name, song_id, flow = "record_last_listened", "Last listened song updated");
        Ok(())
    }

    async fn record_last_listened_in(
        &self,
        txn: &mut dyn GraphTxn,
        user_name: &str,
        song_id: &str,
    ) -> Result<()> {
        require_profile(txn, user_name).await?;

        self.catalog
            .increment_stream_count(song_id)
            .await
            .map_err(|e| remote_failure("Failed to increment stream count", e))?;

        txn.replace_last_listened(user_name, song_id).await?;
        Ok(())
    }

    /// Title of the song the user listened to last.
    pub async fn most_recent_song(&self, user_name: &str) -> Result<String> {
        let mut txn = self.graph.begin().await?;
        let lookup = last_listened_in(txn.as_mut(), user_name).await;
        let song_id = release(txn, lookup).await?;

        match self.resolve_or_reconcile(&song_id).await? {
            Some(title) => Ok(title),
            None => Err(OrchestratorError::NotFound(format!(
                "Song title not found for song ID: {}",
                song_id
            ))),
        }
    }

    /// Resolve a title; `None` means the catalog dropped the song and a cleanup was scheduled.
    async fn resolve_or_reconcile(&self, song_id: &str) -> Result<Option<String>> {
        match self.catalog.resolve_title(song_id).await {
            Ok(title) => Ok(Some(title)),
            Err(CatalogError::NotFound(_)) => {
                info!(song_id, "Song missing from catalog, scheduling reference cleanup");
                self.reconciler.schedule(song_id);
                Ok(None)
            }
            Err(e) => Err(remote_failure("Failed to resolve song title", e)),
        }
    }

    // ========================================================================
    // Profiles and follows
    // ========================================================================

    /// Create a profile together with its favourites playlist.
    pub async fn create_profile(
        &self,
        user_name: &str,
        full_name: &str,
        password: &str,
    ) -> Result<ProfileNode> {
        let password_hash = self.hash_password(password).await?;
        let profile = ProfileNode::new(
            user_name.to_string(),
            full_name.to_string(),
            password_hash,
        );

        let mut txn = self.graph.begin().await?;
        let outcome = create_profile_in(txn.as_mut(), &profile).await;
        settle(txn, outcome, None).await?;

        info!(user_name, flow = "create_profile", "Profile created");
        Ok(profile)
    }

    async fn hash_password(&self, password: &str) -> Result<String> {
        let password = password.to_string();
        let cost = self.password_cost;
        let hash = tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await
            .context("Password hashing task panicked")?
            .context("Failed to hash password")?;
        Ok(hash)
    }

    pub async fn follow_friend(&self, user_name: &str, friend_user_name: &str) -> Result<()> {
        let mut txn = self.graph.begin().await?;
        let outcome = follow_friend_in(txn.as_mut(), user_name, friend_user_name).await;
        settle(txn, outcome, None).await?;

        info!(user_name, friend_user_name, flow = "follow_friend", "Friend followed");
        Ok(())
    }

    pub async fn unfollow_friend(&self, user_name: &str, friend_user_name: &str) -> Result<()> {
        let mut txn = self.graph.begin().await?;
        let outcome = unfollow_friend_in(txn.as_mut(), user_name, friend_user_name).await;
        settle(txn, outcome, None).await?;

        info!(user_name, friend_user_name, flow = "unfollow_friend", "Friend unfollowed");
        Ok(())
    }
}

async fn require_profile(txn: &mut dyn GraphTxn, user_name: &str) -> Result<()> {
    if txn.profile_exists(user_name).await? {
        Ok(())
    } else {
        Err(OrchestratorError::NotFound("User not found".to_string()))
    }
}

async fn last_listened_in(txn: &mut dyn GraphTxn, user_name: &str) -> Result<String> {
    require_profile(txn, user_name).await?;
    txn.last_listened(user_name)
        .await?
        .ok_or_else(|| OrchestratorError::NotFound("No recent song found for user".to_string()))
}

async fn create_profile_in(txn: &mut dyn GraphTxn, profile: &ProfileNode) -> Result<()> {
    if txn.profile_exists(&profile.user_name).await? {
        return Err(OrchestratorError::Conflict(
            "Username already exists".to_string(),
        ));
    }
    txn.create_profile(profile).await?;
    Ok(())
}

async fn follow_friend_in(
    txn: &mut dyn GraphTxn,
    user_name: &str,
    friend_user_name: &str,
) -> Result<()> {
    require_profile(txn, user_name).await?;
    if !txn.profile_exists(friend_user_name).await? {
        return Err(OrchestratorError::NotFound("Friend not found".to_string()));
    }
    txn.follow(user_name, friend_user_name).await?;
    Ok(())
}

async fn unfollow_friend_in(
    txn: &mut dyn GraphTxn,
    user_name: &str,
    friend_user_name: &str,
) -> Result<()> {
    if !txn.is_following(user_name, friend_user_name).await? {
        return Err(OrchestratorError::NotFound(
            "User is not following the friend".to_string(),
        ));
    }
    txn.unfollow(user_name, friend_user_name).await?;
    Ok(())
}

fn remote_failure(action: &str, err: CatalogError) -> OrchestratorError {
    OrchestratorError::RemoteFailure(format!("{}: {}", action, err))
}

/// Commit on success, roll back otherwise.
///
/// `catalog_song` names the song whose catalog counter was already changed
/// when the graph write is about to be committed.
async fn settle<T>(
    txn: Box<dyn GraphTxn>,
    outcome: Result<T>,
    catalog_song: Option<&str>,
) -> Result<T> {
    let value = match outcome {
        Ok(value) => value,
        Err(err) => return release(txn, Err(err)).await,
    };

    match txn.commit().await {
        Ok(()) => Ok(value),
        Err(e) => {
            match catalog_song {
                Some(song_id) => error!(
                    song_id,
                    "Graph commit failed after the catalog counter was updated, counter and graph now disagree: {:#}",
                    e
                ),
                None => warn!("Graph commit failed: {:#}", e),
            }
            Err(OrchestratorError::Internal(e))
        }
    }
}

/// Roll back a transaction that must not write, passing `outcome` through.
async fn release<T>(txn: Box<dyn GraphTxn>, outcome: Result<T>) -> Result<T> {
    if let Err(e) = txn.rollback().await {
        warn!("Failed to roll back graph transaction: {:#}", e);
    }
    outcome
}
