//! `GraphStore` implementation for `Neo4jClient`.
//!
//! Every method simply delegates to the corresponding inherent method on `Neo4jClient`.

use async_trait::async_trait;

use super::client::Neo4jClient;
use super::traits::{GraphStore, GraphTxn};

#[async_trait]
impl GraphStore for Neo4jClient {
    async fn begin(&self) -> anyhow::Result<Box<dyn GraphTxn>> {
        Ok(Box::new(self.begin_txn().await?))
    }

    async fn delete_song_ref(&self, song_id: &str) -> anyhow::Result<bool> {
        self.delete_song_ref(song_id).await
    }

    async fn health_check(&self) -> anyhow::Result<bool> {
        self.health_check().await
    }
}
