//! Orchestration of the graph store and the song catalog

pub mod consistency;
pub mod error;
pub mod reconciler;

pub use consistency::{ConsistencyOrchestrator, FriendFavourites};
pub use error::{OrchestratorError, QueryStatus, Result};
pub use reconciler::OrphanReconciler;
