//! Integration configuration.
//!
//! The Confluence and AI providers are configured through JSON files under
//! `~/.statusdeck/`. Both files wrap their settings in a named top-level key
//! so the files stay recognizable when copied around:
//!
//! ```json
//! { "confluence": { "baseUrl": "...", "username": "...",
//!                   "apiToken": "...", "targetPageId": "..." } }
//! { "ai": { "baseUrl": "...", "apiKey": "...", "model": "..." } }
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration missing or unreadable: {0}")]
    Missing(String),

    #[error("Configuration invalid: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfluenceConfig {
    pub base_url: String,
    pub username: String,
    pub api_token: String,
    pub target_page_id: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
}

#[derive(Debug, Deserialize)]
struct ConfluenceFile {
    confluence: ConfluenceConfig,
}

#[derive(Debug, Deserialize)]
struct AiFile {
    ai: AiConfig,
}

fn config_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_default().join(".statusdeck")
}

pub fn confluence_config_path() -> PathBuf {
    config_dir().join("confluence.json")
}

pub fn ai_config_path() -> PathBuf {
    config_dir().join("ai.json")
}

pub fn load_confluence_config(path: &Path) -> Result<ConfluenceConfig, ConfigError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::Missing(format!("{}: {}", path.display(), e)))?;
    let parsed: ConfluenceFile = serde_json::from_str(&content)
        .map_err(|e| ConfigError::Invalid(format!("{}: {}", path.display(), e)))?;
    Ok(parsed.confluence)
}

pub fn load_ai_config(path: &Path) -> Result<AiConfig, ConfigError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::Missing(format!("{}: {}", path.display(), e)))?;
    let parsed: AiFile = serde_json::from_str(&content)
        .map_err(|e| ConfigError::Invalid(format!("{}: {}", path.display(), e)))?;
    Ok(parsed.ai)
}
