use crate::data::{AgentConfig, DEFAULT_TITLE};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "config.json";
pub const STATUS_FILE_NAME: &str = "status.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfficeConfig {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default)]
    pub agents: Vec<AgentConfig>,
}

fn default_title() -> String {
    DEFAULT_TITLE.to_string()
}

impl Default for OfficeConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            agents: Vec::new(),
        }
    }
}

/// Directory holding config.json and status.json (respects $OFFICE_STATUS_DIR)
pub fn base_dir() -> PathBuf {
    std::env::var("OFFICE_STATUS_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
}

pub fn default_config_path() -> PathBuf {
    base_dir().join(CONFIG_FILE_NAME)
}

pub fn default_status_path() -> PathBuf {
    base_dir().join(STATUS_FILE_NAME)
}

pub fn load(path: &Path) -> Result<OfficeConfig> {
    if !path.exists() {
        anyhow::bail!("Config file not found at {}", path.display());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config from {}", path.display()))?;

    let config: OfficeConfig = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse config from {}", path.display()))?;

    Ok(config)
}
