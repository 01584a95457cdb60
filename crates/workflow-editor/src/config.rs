//! Editor configuration storage
//!
//! Stored as `config.json` in the application data directory.

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::fs;
use workflow_gateway::{GatewayConfig, HttpGateway, SharedGateway};
use workflow_graph::history::DEFAULT_HISTORY_DEPTH;
use workflow_graph::GraphPolicy;

const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorConfig {
    /// Backend connection
    #[serde(default)]
    pub gateway: GatewayConfig,
    /// Edge shapes the canvas accepts
    #[serde(default)]
    pub graph: GraphPolicy,
    /// Number of undo steps kept per session
    #[serde(default = "default_history_depth")]
    pub history_depth: usize,
}

fn default_history_depth() -> usize {
    DEFAULT_HISTORY_DEPTH
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            gateway: GatewayConfig::default(),
            graph: GraphPolicy::default(),
            history_depth: default_history_depth(),
        }
    }
}

impl EditorConfig {
    /// Load configuration from disk, falling back to defaults if absent
    pub async fn load(app_data_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = app_data_dir.join(CONFIG_FILE);

        if !fs::try_exists(&config_path).await? {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&config_path).await?;
        serde_json::from_str(&contents).map_err(ConfigError::Parse)
    }

    /// Save configuration to disk
    pub async fn save(&self, app_data_dir: &Path) -> Result<(), ConfigError> {
        fs::create_dir_all(app_data_dir).await?;

        let config_path = app_data_dir.join(CONFIG_FILE);
        let contents = serde_json::to_string_pretty(self).map_err(ConfigError::Serialize)?;
        fs::write(&config_path, contents).await?;

        log::info!("Configuration saved to {:?}", config_path);
        Ok(())
    }

    /// Apply environment overrides to the gateway settings
    pub fn with_env_overrides(mut self) -> Self {
        self.gateway = self.gateway.with_env_overrides();
        self
    }

    /// Build the REST gateway described by this configuration
    pub fn http_gateway(&self) -> workflow_gateway::Result<SharedGateway> {
        Ok(Arc::new(HttpGateway::new(&self.gateway)?))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(serde_json::Error),
    #[error("Failed to serialize config: {0}")]
    Serialize(serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = EditorConfig::load(dir.path()).await.unwrap();
        assert_eq!(config, EditorConfig::default());
        assert_eq!(config.history_depth, DEFAULT_HISTORY_DEPTH);
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("app");

        let mut config = EditorConfig::default();
        config.gateway.base_url = "https://flows.example.com/api".to_string();
        config.graph.allow_cycles = false;
        config.history_depth = 20;
        config.save(&nested).await.unwrap();

        let loaded = EditorConfig::load(&nested).await.unwrap();
        assert_eq!(loaded, config);
    }

    #[tokio::test]
    async fn test_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(
            dir.path().join("config.json"),
            r#"{"graph": {"allow_parallel_edges": false}}"#,
        )
        .await
        .unwrap();

        let config = EditorConfig::load(dir.path()).await.unwrap();
        assert!(!config.graph.allow_parallel_edges);
        assert!(config.graph.allow_cycles);
        assert_eq!(config.gateway, GatewayConfig::default());
    }

    #[test]
    fn test_env_override_reaches_gateway() {
        std::env::set_var(workflow_gateway::config::API_URL_ENV, "http://10.0.0.5:3000/api");
        let config = EditorConfig::default().with_env_overrides();
        std::env::remove_var(workflow_gateway::config::API_URL_ENV);

        assert_eq!(config.gateway.base_url, "http://10.0.0.5:3000/api");
        assert_eq!(config.history_depth, DEFAULT_HISTORY_DEPTH);
    }

    #[test]
    fn test_http_gateway() {
        assert!(EditorConfig::default().http_gateway().is_ok());

        let mut config = EditorConfig::default();
        config.gateway.base_url = String::new();
        assert!(matches!(
            config.http_gateway(),
            Err(workflow_gateway::GatewayError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join("config.json"), "{not json")
            .await
            .unwrap();

        assert!(matches!(
            EditorConfig::load(dir.path()).await,
            Err(ConfigError::Parse(_))
        ));
    }
}
