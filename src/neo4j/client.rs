//! Neo4j client for interacting with the social graph

use super::txn::Neo4jTxn;
use anyhow::{Context, Result};
use neo4rs::{query, Graph, Query};
use std::sync::Arc;

/// Client for Neo4j operations
///
/// Owns the driver's connection pool. Constructed once at startup and shared
/// behind `Arc<dyn GraphStore>`.
pub struct Neo4jClient {
    graph: Arc<Graph>,
}

impl Neo4jClient {
    /// Create a new Neo4j client
    pub async fn new(uri: &str, user: &str, password: &str) -> Result<Self> {
        let graph = Graph::new(uri, user, password)
            .await
            .context("Failed to connect to Neo4j")?;

        let client = Self {
            graph: Arc::new(graph),
        };

        // Initialize schema
        client.init_schema().await?;

        Ok(client)
    }

    /// Initialize the graph schema with uniqueness constraints
    async fn init_schema(&self) -> Result<()> {
        let constraints = vec![
            "CREATE CONSTRAINT profile_user_name IF NOT EXISTS FOR (p:profile) REQUIRE p.userName IS UNIQUE",
            "CREATE CONSTRAINT playlist_name IF NOT EXISTS FOR (pl:playlist) REQUIRE pl.plName IS UNIQUE",
            "CREATE CONSTRAINT song_id IF NOT EXISTS FOR (s:song) REQUIRE s.songId IS UNIQUE",
        ];

        for constraint in constraints {
            if let Err(e) = self.graph.run(query(constraint)).await {
                tracing::warn!("Constraint may already exist: {}", e);
            }
        }

        Ok(())
    }

    /// Execute a parameterized Cypher query outside any caller transaction
    pub(crate) async fn execute_with_params(&self, q: Query) -> Result<Vec<neo4rs::Row>> {
        let mut result = self.graph.execute(q).await?;
        let mut rows = Vec::new();
        while let Some(row) = result.next().await? {
            rows.push(row);
        }
        Ok(rows)
    }

    /// Start an explicit transaction
    pub async fn begin_txn(&self) -> Result<Neo4jTxn> {
        let txn = self
            .graph
            .start_txn()
            .await
            .context("Failed to start Neo4j transaction")?;
        Ok(Neo4jTxn::new(txn))
    }

    /// Detach-delete a song reference node (auto-commit)
    pub async fn delete_song_ref(&self, song_id: &str) -> Result<bool> {
        let q = query(
            r#"
            MATCH (s:song {songId: $songId})
            WITH s, s.songId AS removedId
            DETACH DELETE s
            RETURN count(removedId) AS removed
            "#,
        )
        .param("songId", song_id.to_string());

        let rows = self.execute_with_params(q).await?;
        let removed: i64 = match rows.first() {
            Some(row) => row.get("removed")?,
            None => 0,
        };
        Ok(removed > 0)
    }

    /// Ping the database
    pub async fn health_check(&self) -> Result<bool> {
        match self.execute_with_params(query("RETURN 1 AS ping")).await {
            Ok(_) => Ok(true),
            Err(_) => Ok(false),
        }
    }
}
