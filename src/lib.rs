//! Profile Service
//!
//! Keeps a user social graph and an external song catalog consistent:
//! - Neo4j graph of profiles, favourites playlists, follows and listening history
//! - HTTP song catalog owning song metadata and favourites / stream counters
//! - Consistency orchestrator ordering remote calls before graph commits
//! - Best-effort reconciliation of song references the catalog has dropped

pub mod api;
pub mod catalog;
pub mod neo4j;
pub mod orchestrator;

#[cfg(test)]
pub(crate) mod test_helpers;

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

// ============================================================================
// YAML config structs (deserialization targets)
// ============================================================================

/// Top-level YAML configuration file structure
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct YamlConfig {
    pub server: ServerYamlConfig,
    pub neo4j: Neo4jYamlConfig,
    pub catalog: CatalogYamlConfig,
    pub security: SecurityYamlConfig,
}

/// Server configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerYamlConfig {
    pub port: u16,
}

impl Default for ServerYamlConfig {
    fn default() -> Self {
        Self { port: 3002 }
    }
}

/// Neo4j configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Neo4jYamlConfig {
    pub uri: String,
    pub user: String,
    pub password: String,
}

impl Default for Neo4jYamlConfig {
    fn default() -> Self {
        Self {
            uri: "bolt://localhost:7687".into(),
            user: "neo4j".into(),
            password: "12345678".into(),
        }
    }
}

/// Song catalog configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CatalogYamlConfig {
    pub url: String,
    /// Per-request timeout; every catalog call is bounded by it
    pub timeout_ms: u64,
}

impl Default for CatalogYamlConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:3001".into(),
            timeout_ms: 5000,
        }
    }
}

/// Password hashing section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SecurityYamlConfig {
    pub password_cost: u32,
}

impl Default for SecurityYamlConfig {
    fn default() -> Self {
        Self {
            password_cost: bcrypt::DEFAULT_COST,
        }
    }
}

// ============================================================================
// Resolved configuration
// ============================================================================

/// Application configuration.
///
/// Priority: environment variables > YAML file > defaults.
#[derive(Debug, Clone)]
pub struct Config {
    pub neo4j_uri: String,
    pub neo4j_user: String,
    pub neo4j_password: String,
    pub catalog_url: String,
    pub catalog_timeout: Duration,
    pub server_port: u16,
    pub password_cost: u32,
}

fn env_parsed<T: std::str::FromStr>(var: &str) -> Option<T> {
    std::env::var(var).ok().and_then(|s| s.parse().ok())
}

impl Config {
    /// Load configuration from `config.yaml` (if present) and environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_yaml_and_env(None)
    }

    /// Load configuration from a specific YAML file and environment variables
    pub fn from_yaml_and_env(yaml_path: Option<&Path>) -> Result<Self> {
        let yaml = Self::load_yaml(yaml_path);

        let password_cost =
            env_parsed("PASSWORD_COST").unwrap_or(yaml.security.password_cost);
        if !(4..=31).contains(&password_cost) {
            anyhow::bail!("password_cost must be between 4 and 31, got {}", password_cost);
        }

        Ok(Self {
            neo4j_uri: std::env::var("NEO4J_URI").unwrap_or(yaml.neo4j.uri),
            neo4j_user: std::env::var("NEO4J_USER").unwrap_or(yaml.neo4j.user),
            neo4j_password: std::env::var("NEO4J_PASSWORD").unwrap_or(yaml.neo4j.password),
            catalog_url: std::env::var("CATALOG_URL").unwrap_or(yaml.catalog.url),
            catalog_timeout: Duration::from_millis(
                env_parsed("CATALOG_TIMEOUT_MS").unwrap_or(yaml.catalog.timeout_ms),
            ),
            server_port: env_parsed("SERVER_PORT").unwrap_or(yaml.server.port),
            password_cost,
        })
    }

    /// Read and parse the YAML config file, falling back to defaults
    fn load_yaml(yaml_path: Option<&Path>) -> YamlConfig {
        let default_path = Path::new("config.yaml");
        let path = yaml_path.unwrap_or(default_path);

        match std::fs::read_to_string(path) {
            Ok(contents) => match serde_yaml::from_str(&contents) {
                Ok(config) => {
                    tracing::info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse {}: {}. Using defaults.", path.display(), e);
                    YamlConfig::default()
                }
            },
            Err(_) => {
                tracing::debug!(
                    "No config file at {}, using env vars / defaults",
                    path.display()
                );
                YamlConfig::default()
            }
        }
    }
}

// ============================================================================
// Application state
// ============================================================================

/// Store handles shared by the server
#[derive(Clone)]
pub struct AppState {
    pub graph: Arc<dyn neo4j::GraphStore>,
    pub catalog: Arc<dyn catalog::CatalogClient>,
    pub config: Arc<Config>,
}

impl AppState {
    /// Connect to Neo4j and build the catalog client
    pub async fn new(config: Config) -> Result<Self> {
        let graph = Arc::new(
            neo4j::client::Neo4jClient::new(
                &config.neo4j_uri,
                &config.neo4j_user,
                &config.neo4j_password,
            )
            .await?,
        );

        let catalog = Arc::new(catalog::client::HttpCatalogClient::new(
            &config.catalog_url,
            config.catalog_timeout,
        )?);

        Ok(Self {
            graph,
            catalog,
            config: Arc::new(config),
        })
    }

    /// Build the orchestrator over this state's stores
    pub fn orchestrator(&self) -> orchestrator::ConsistencyOrchestrator {
        orchestrator::ConsistencyOrchestrator::new(self.graph.clone(), self.catalog.clone())
            .with_password_cost(self.config.password_cost)
    }
}

// ============================================================================
// Server
// ============================================================================

/// Serve the HTTP API until Ctrl-C / SIGTERM, then drain pending orphan cleanups
pub async fn start_server(config: Config) -> Result<()> {
    let port = config.server_port;
    let state = AppState::new(config).await?;
    tracing::info!("Connected to Neo4j");

    let orchestrator = Arc::new(state.orchestrator());
    let server_state = Arc::new(api::handlers::ServerState {
        orchestrator: orchestrator.clone(),
        graph: state.graph.clone(),
    });
    let app = api::create_router(server_state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    tracing::info!("Profile service listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    let pending = orchestrator.reconciler().pending();
    if pending > 0 {
        tracing::info!(pending, "Waiting for orphan cleanups to finish");
    }
    orchestrator.reconciler().drain().await;

    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down"),
        _ = terminate => tracing::info!("Received terminate signal, shutting down"),
    }
}
