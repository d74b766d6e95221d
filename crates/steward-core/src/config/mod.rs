pub mod model;

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::approval::ApprovalMode;
use crate::error::{Error, Result};

pub use model::ModelId;

/// Top-level configuration, loaded from TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub cluster: ClusterConfig,
    pub approval: ApprovalConfig,
    pub timeouts: TimeoutConfig,
    pub provider: ProviderConfig,
    pub storage: StorageConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cluster: ClusterConfig::default(),
            approval: ApprovalConfig::default(),
            timeouts: TimeoutConfig::default(),
            provider: ProviderConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    pub default_namespace: String,
    pub kubeconfig_path: Option<String>,
    pub scaling_ceiling: i32,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            default_namespace: "default".to_string(),
            kubeconfig_path: None,
            scaling_ceiling: 20,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApprovalConfig {
    pub default_mode: ApprovalMode,
}

impl Default for ApprovalConfig {
    fn default() -> Self {
        Self {
            default_mode: ApprovalMode::Normal,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    pub default_tool_sec: u64,
    pub shell_tool_sec: u64,
    pub turn_cap_sec: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            default_tool_sec: 60,
            shell_tool_sec: 120,
            turn_cap_sec: 300,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub anthropic_base_url: String,
    pub anthropic_api_key_env: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            anthropic_base_url: "https://api.anthropic.com".to_string(),
            anthropic_api_key_env: "ANTHROPIC_API_KEY".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub sqlite_path: Option<String>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { sqlite_path: None }
    }
}

impl Config {
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        toml::from_str(raw).map_err(|e| Error::Config(e.to_string()))
    }

    pub async fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = tokio::fs::read_to_string(path).await?;
        Self::from_toml_str(&raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec_timeouts() {
        let config = Config::default();
        assert_eq!(config.timeouts.default_tool_sec, 60);
        assert_eq!(config.timeouts.shell_tool_sec, 120);
        assert_eq!(config.timeouts.turn_cap_sec, 300);
    }

    #[test]
    fn parses_partial_toml_with_defaults() {
        let config = Config::from_toml_str(
            r#"
            [cluster]
            default_namespace = "prod"
            "#,
        )
        .unwrap();
        assert_eq!(config.cluster.default_namespace, "prod");
        assert_eq!(config.approval.default_mode, ApprovalMode::Normal);
    }
}
