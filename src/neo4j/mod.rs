//! Neo4j client and models for the social graph

pub mod client;
mod impl_graph_store;
pub mod models;
pub mod traits;
pub mod txn;

pub use client::Neo4jClient;
pub use models::*;
pub use traits::{GraphStore, GraphTxn};
pub use txn::Neo4jTxn;
