//! Application configuration management

use std::path::PathBuf;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use super::curriculum::Board;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Folder holding the chapter index and content table
    pub data_dir: Option<PathBuf>,
    /// Recently used data folders
    pub recent_data_dirs: Vec<PathBuf>,
    /// AI drafting settings
    pub generation: GenerationConfig,
    /// Admin access settings
    pub admin: AdminConfig,
    /// Browser defaults
    pub browse: BrowseConfig,
    /// UI settings
    pub ui: UiConfig,
}

/// Text generation service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Model name passed to the service
    pub model: String,
    /// Base URL of the REST API
    pub endpoint: String,
    /// Environment variable holding the API key
    pub api_key_env: String,
    /// Inline API key, used when the environment variable is unset or blank
    pub api_key: Option<String>,
    /// Connect/read/write timeout in seconds
    pub timeout_secs: u64,
}

/// Admin access settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Nickname that unlocks the admin dashboard
    pub nickname: String,
}

/// Defaults for the board/subject browser and the admin selectors
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowseConfig {
    pub board: Board,
    pub class: String,
}

/// UI settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Theme (light/dark)
    pub theme: String,
    /// Admin chapter list width
    pub sidebar_width: f32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            recent_data_dirs: Vec::new(),
            generation: GenerationConfig::default(),
            admin: AdminConfig::default(),
            browse: BrowseConfig::default(),
            ui: UiConfig::default(),
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.5-flash".to_string(),
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            api_key_env: "API_KEY".to_string(),
            api_key: None,
            timeout_secs: 120,
        }
    }
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            nickname: "tojodeepmaker111".to_string(),
        }
    }
}

impl Default for BrowseConfig {
    fn default() -> Self {
        Self {
            board: Board::Cbse,
            class: "10".to_string(),
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            theme: "dark".to_string(),
            sidebar_width: 280.0,
        }
    }
}

impl GenerationConfig {
    /// API key from the environment, then from the config file. Blank values count as unset.
    pub fn resolve_api_key(&self) -> Option<String> {
        let present = |key: &String| !key.trim().is_empty();
        std::env::var(&self.api_key_env)
            .ok()
            .filter(present)
            .or_else(|| self.api_key.clone().filter(present))
    }
}

impl AppConfig {
    fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("com", "topperguide", "TopperGuide")
    }

    /// Get the config file path
    fn config_path() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Load configuration from disk
    pub fn load() -> Result<Self> {
        let path = Self::config_path()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config: {}", path.display()))?;
        Ok(config)
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, content)?;

        tracing::info!("Saved config to: {}", path.display());
        Ok(())
    }

    /// Folder the store should live in
    pub fn resolved_data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(|| {
            Self::project_dirs()
                .map(|dirs| dirs.data_dir().to_path_buf())
                .unwrap_or_else(|| PathBuf::from("topper-guide-data"))
        })
    }

    /// Switch to a data folder and remember it
    pub fn set_data_dir(&mut self, path: PathBuf) {
        self.recent_data_dirs.retain(|p| p != &path);
        self.recent_data_dirs.insert(0, path.clone());
        self.recent_data_dirs.truncate(10);
        self.data_dir = Some(path);
    }
}
