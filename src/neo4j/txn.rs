//! Explicit Neo4j transaction implementing [`GraphTxn`]
//!
//! Labels and relationship types match the data already written by the
//! profile service: `profile`, `playlist`, `song`, `created`, `includes`,
//! `FOLLOWS` and `LAST_LISTENED_TO`.

use super::models::*;
use super::traits::GraphTxn;
use anyhow::{Context, Result};
use async_trait::async_trait;
use neo4rs::{query, Query, Row, Txn};

/// A Neo4j transaction owned by a single orchestrator operation
pub struct Neo4jTxn {
    txn: Txn,
}

impl Neo4jTxn {
    pub(crate) fn new(txn: Txn) -> Self {
        Self { txn }
    }

    /// Run a query inside the transaction and collect every row
    async fn fetch(&mut self, q: Query) -> Result<Vec<Row>> {
        let mut stream = self.txn.execute(q).await?;
        let mut rows = Vec::new();
        while let Some(row) = stream.next(self.txn.handle()).await? {
            rows.push(row);
        }
        Ok(rows)
    }

    /// Run a `RETURN count(..) AS n` query and report whether `n > 0`
    async fn exists(&mut self, q: Query) -> Result<bool> {
        let rows = self.fetch(q).await?;
        let n: i64 = match rows.first() {
            Some(row) => row.get("n")?,
            None => 0,
        };
        Ok(n > 0)
    }
}

#[async_trait]
impl GraphTxn for Neo4jTxn {
    async fn profile_exists(&mut self, user_name: &str) -> Result<bool> {
        let q = query(
            r#"
            MATCH (p:profile {userName: $userName})
            RETURN count(p) AS n
            "#,
        )
        .param("userName", user_name.to_string());

        self.exists(q).await
    }

    async fn create_profile(&mut self, profile: &ProfileNode) -> Result<()> {
        let q = query(
            r#"
            CREATE (p:profile {userName: $userName, fullName: $fullName, password: $password})
            CREATE (pl:playlist {plName: $plName})
            CREATE (p)-[:created]->(pl)
            "#,
        )
        .param("userName", profile.user_name.clone())
        .param("fullName", profile.full_name.clone())
        .param("password", profile.password_hash.clone())
        .param("plName", profile.playlist_name());

        self.txn
            .run(q)
            .await
            .with_context(|| format!("Failed to create profile {}", profile.user_name))?;
        Ok(())
    }

    async fn is_following(&mut self, user_name: &str, friend_user_name: &str) -> Result<bool> {
        let q = query(
            r#"
            MATCH (u:profile {userName: $userName})-[r:FOLLOWS]->(f:profile {userName: $friendUserName})
            RETURN count(r) AS n
            "#,
        )
        .param("userName", user_name.to_string())
        .param("friendUserName", friend_user_name.to_string());

        self.exists(q).await
    }

    async fn follow(&mut self, user_name: &str, friend_user_name: &str) -> Result<()> {
        let q = query(
            r#"
            MATCH (u:profile {userName: $userName}), (f:profile {userName: $friendUserName})
            MERGE (u)-[:FOLLOWS]->(f)
            "#,
        )
        .param("userName", user_name.to_string())
        .param("friendUserName", friend_user_name.to_string());

        self.txn.run(q).await?;
        Ok(())
    }

    async fn unfollow(&mut self, user_name: &str, friend_user_name: &str) -> Result<()> {
        let q = query(
            r#"
            MATCH (u:profile {userName: $userName})-[r:FOLLOWS]->(f:profile {userName: $friendUserName})
            DELETE r
            "#,
        )
        .param("userName", user_name.to_string())
        .param("friendUserName", friend_user_name.to_string());

        self.txn.run(q).await?;
        Ok(())
    }

    async fn is_song_liked(&mut self, user_name: &str, song_id: &str) -> Result<bool> {
        let q = query(
            r#"
            MATCH (u:profile {userName: $userName})-[:created]->(pl:playlist {plName: $plName})
                  -[:includes]->(s:song {songId: $songId})
            RETURN count(s) AS n
            "#,
        )
        .param("userName", user_name.to_string())
        .param("plName", favourites_playlist_name(user_name))
        .param("songId", song_id.to_string());

        self.exists(q).await
    }

    async fn add_favourite(&mut self, user_name: &str, song_id: &str) -> Result<()> {
        let q = query(
            r#"
            MATCH (u:profile {userName: $userName})-[:created]->(pl:playlist {plName: $plName})
            MERGE (s:song {songId: $songId})
            MERGE (pl)-[:includes]->(s)
            "#,
        )
        .param("userName", user_name.to_string())
        .param("plName", favourites_playlist_name(user_name))
        .param("songId", song_id.to_string());

        self.txn.run(q).await?;
        Ok(())
    }

    async fn remove_favourite(&mut self, user_name: &str, song_id: &str) -> Result<()> {
        let q = query(
            r#"
            MATCH (pl:playlist {plName: $plName})-[r:includes]->(s:song {songId: $songId})
            DELETE r
            "#,
        )
        .param("plName", favourites_playlist_name(user_name))
        .param("songId", song_id.to_string());

        self.txn.run(q).await?;
        Ok(())
    }

    async fn friend_favourites(&mut self, user_name: &str) -> Result<Vec<FriendSongs>> {
        let q = query(
            r#"
            MATCH (u:profile {userName: $userName})-[:FOLLOWS]->(f:profile)
                  -[:created]->(pl:playlist)-[:includes]->(s:song)
            RETURN f.userName AS friendUserName, collect(s.songId) AS songIds
            "#,
        )
        .param("userName", user_name.to_string());

        let rows = self.fetch(q).await?;
        let mut friends = Vec::with_capacity(rows.len());
        for row in rows {
            friends.push(FriendSongs {
                friend_user_name: row.get("friendUserName")?,
                song_ids: row.get("songIds")?,
            });
        }
        Ok(friends)
    }

    async fn last_listened(&mut self, user_name: &str) -> Result<Option<String>> {
        let q = query(
            r#"
            MATCH (u:profile {userName: $userName})-[:LAST_LISTENED_TO]->(s:song)
            RETURN s.songId AS songId
            LIMIT 1
            "#,
        )
        .param("userName", user_name.to_string());

        let rows = self.fetch(q).await?;
        match rows.first() {
            Some(row) => Ok(Some(row.get("songId")?)),
            None => Ok(None),
        }
    }

    async fn replace_last_listened(&mut self, user_name: &str, song_id: &str) -> Result<()> {
        // One row per profile even when legacy data carries several edges
        let q = query(
            r#"
            MATCH (u:profile {userName: $userName})
            OPTIONAL MATCH (u)-[r:LAST_LISTENED_TO]->(:song)
            DELETE r
            WITH DISTINCT u
            MERGE (s:song {songId: $songId})
            MERGE (u)-[:LAST_LISTENED_TO]->(s)
            "#,
        )
        .param("userName", user_name.to_string())
        .param("songId", song_id.to_string());

        self.txn.run(q).await?;
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        self.txn
            .commit()
            .await
            .context("Failed to commit Neo4j transaction")
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        self.txn
            .rollback()
            .await
            .context("Failed to roll back Neo4j transaction")
    }
}
