//! Orphan reconciliation
//!
//! When the catalog no longer knows a song the graph still references, the
//! song's reference node is detach-deleted. The delete runs as a detached
//! task in its own auto-committed transaction: it never blocks, fails, or
//! delays the read that discovered the orphan. Failures are logged and
//! dropped; the next read that meets the same orphan schedules it again.

use crate::neo4j::GraphStore;
use std::sync::Arc;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, warn};

/// Schedules and tracks best-effort orphan deletions
#[derive(Clone)]
pub struct OrphanReconciler {
    graph: Arc<dyn GraphStore>,
    tracker: TaskTracker,
}

impl OrphanReconciler {
    pub fn new(graph: Arc<dyn GraphStore>) -> Self {
        Self {
            graph,
            tracker: TaskTracker::new(),
        }
    }

    /// Spawn the deletion of `song_id`'s reference node.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn schedule(&self, song_id: &str) {
        let graph = self.graph.clone();
        let song_id = song_id.to_string();

        self.tracker.spawn(async move {
            match graph.delete_song_ref(&song_id).await {
                Ok(true) => info!(song_id = %song_id, "Removed orphaned song reference"),
                Ok(false) => debug!(song_id = %song_id, "Orphaned song reference already removed"),
                Err(e) => warn!(
                    song_id = %song_id,
                    "Failed to remove orphaned song reference: {:#}",
                    e
                ),
            }
        });
    }

    /// Number of cleanup tasks still running
    pub fn pending(&self) -> usize {
        self.tracker.len()
    }

    /// Wait for every scheduled cleanup to finish.
    ///
    /// Used at shutdown and by tests; new cleanups may be scheduled again
    /// once this returns.
    pub async fn drain(&self) {
        self.tracker.close();
        self.tracker.wait().await;
        self.tracker.reopen();
    }
}
