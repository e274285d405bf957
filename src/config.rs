//! Configuration management for the fraud detection app and graph loader

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default location of the configuration file
pub const DEFAULT_CONFIG_PATH: &str = "config/config.toml";

/// How relationships are written during a graph load
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum RelationshipMode {
    /// Always create a new edge per source row (duplicate rows give duplicate edges)
    #[default]
    Create,
    /// Reuse an existing edge between the same node pair
    Merge,
}

/// Main application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub artifacts: ArtifactsConfig,
    pub graph: GraphConfig,
    pub logging: LoggingConfig,
}

/// HTTP server configuration for the inference UI
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address
    pub host: String,
    /// Bind port
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8501,
        }
    }
}

/// Model artifact bundle location
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ArtifactsConfig {
    /// Path to the serialized artifact bundle
    pub path: PathBuf,
}

impl Default for ArtifactsConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("models/fraud_detection_artifacts.json"),
        }
    }
}

/// Graph database loader configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// Bolt connection string
    pub uri: String,
    /// Username (empty for unauthenticated Memgraph)
    pub user: String,
    /// Password (empty for unauthenticated Memgraph)
    pub password: String,
    /// Source CSV with Name, Phone Number and Email columns
    pub data_path: PathBuf,
    /// Maximum number of rows taken from the CSV
    pub limit: usize,
    /// Edge write semantics
    pub relationship_mode: RelationshipMode,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            uri: "bolt://localhost:7687".to_string(),
            user: String::new(),
            password: String::new(),
            data_path: PathBuf::from("data/synthetic_bank_data.csv"),
            limit: 5000,
            relationship_mode: RelationshipMode::Create,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log format (json, pretty)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default file location
    pub fn load() -> Result<Self> {
        Self::load_from_path(DEFAULT_CONFIG_PATH)
    }

    /// Load configuration from a specific path.
    ///
    /// The file is optional: built-in defaults apply for anything it leaves
    /// out, and `FRAUD_APP__SECTION__KEY` environment variables override both.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from(path.as_ref()).required(false))
            .add_source(Environment::with_prefix("FRAUD_APP").separator("__"))
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Socket address string for the UI server
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
