//! Test helper factories and mock state builders
//!
//! Wires the in-memory graph and catalog mocks into an orchestrator, an
//! `AppState`, or the API server state, keeping concrete handles so tests
//! can seed, inject faults, and inspect both stores afterwards.
#![allow(dead_code)]

use crate::api::handlers::{OrchestratorState, ServerState};
use crate::catalog::mock::MockCatalogClient;
use crate::neo4j::mock::MockGraphStore;
use crate::orchestrator::ConsistencyOrchestrator;
use crate::{AppState, Config};
use std::sync::Arc;
use std::time::Duration;

/// bcrypt's minimum cost, keeps password hashing fast in tests
pub const TEST_PASSWORD_COST: u32 = 4;

/// An orchestrator together with the concrete mocks behind it
pub struct MockHarness {
    pub orchestrator: Arc<ConsistencyOrchestrator>,
    pub graph: Arc<MockGraphStore>,
    pub catalog: Arc<MockCatalogClient>,
}

impl MockHarness {
    /// API server state sharing this harness's orchestrator
    pub fn server_state(&self) -> OrchestratorState {
        Arc::new(ServerState {
            orchestrator: self.orchestrator.clone(),
            graph: self.graph.clone(),
        })
    }
}

/// Build an orchestrator over pre-seeded mocks
pub fn mock_harness(graph: MockGraphStore, catalog: MockCatalogClient) -> MockHarness {
    let graph = Arc::new(graph);
    let catalog = Arc::new(catalog);
    let orchestrator = ConsistencyOrchestrator::new(graph.clone(), catalog.clone())
        .with_password_cost(TEST_PASSWORD_COST);

    MockHarness {
        orchestrator: Arc::new(orchestrator),
        graph,
        catalog,
    }
}

/// Config pointing at unreachable mock endpoints
pub fn mock_config() -> Config {
    Config {
        neo4j_uri: "bolt://mock:7687".to_string(),
        neo4j_user: "neo4j".to_string(),
        neo4j_password: "mock".to_string(),
        catalog_url: "http://mock:3001".to_string(),
        catalog_timeout: Duration::from_millis(500),
        server_port: 0,
        password_cost: TEST_PASSWORD_COST,
    }
}

/// Create a mock AppState with empty in-memory backends
pub fn mock_app_state() -> AppState {
    mock_app_state_with(MockGraphStore::new(), MockCatalogClient::new())
}

/// Create a mock AppState with pre-seeded backends
pub fn mock_app_state_with(graph: MockGraphStore, catalog: MockCatalogClient) -> AppState {
    AppState {
        graph: Arc::new(graph),
        catalog: Arc::new(catalog),
        config: Arc::new(mock_config()),
    }
}
