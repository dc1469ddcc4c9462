//! Configuration for the recipe store.

use crate::error::{RecipeError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default configuration file name.
pub const CONFIG_FILE: &str = "recipes.toml";

/// Comprehensive configuration for the recipe store.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// Storage layout and backend selection.
    #[serde(default)]
    pub store: StoreConfig,

    /// GitHub backend configuration.
    #[serde(default)]
    pub github: GithubConfig,

    /// Image transform configuration.
    #[serde(default)]
    pub image: ImageConfig,
}

impl Config {
    /// Load configuration from a file.
    ///
    /// A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path)
                .map_err(|e| RecipeError::ConfigError(format!("failed to read config: {}", e)))?;
            let config: Config = toml::from_str(&content)
                .map_err(|e| RecipeError::ConfigError(format!("failed to parse config: {}", e)))?;
            config.validate()?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Save configuration to a file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| RecipeError::ConfigError(format!("failed to serialize config: {}", e)))?;
        fs::write(path, content)
            .map_err(|e| RecipeError::ConfigError(format!("failed to write config: {}", e)))?;
        Ok(())
    }

    /// Checks value ranges that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.store.records_root.trim_matches('/').is_empty() {
            return Err(RecipeError::ConfigError(
                "store.records_root must not be empty".to_string(),
            ));
        }
        if self.store.images_dir.trim_matches('/').is_empty()
            || self.store.images_dir.contains('/')
        {
            return Err(RecipeError::ConfigError(
                "store.images_dir must be a single path segment".to_string(),
            ));
        }
        if self.image.max_edge == 0 {
            return Err(RecipeError::ConfigError(
                "image.max_edge must be positive".to_string(),
            ));
        }
        if !(1..=100).contains(&self.image.quality) {
            return Err(RecipeError::ConfigError(format!(
                "image.quality must be within 1..=100, got {}",
                self.image.quality
            )));
        }
        Ok(())
    }
}

/// Which store implementation to talk to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// GitHub REST contents API.
    #[default]
    Github,
    /// A local directory (e.g. a Git working copy).
    Local,
}

/// Storage layout and backend selection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StoreConfig {
    /// Backend to use (default: github).
    pub backend: Backend,

    /// Subtree holding category directories (default: "docs").
    pub records_root: String,

    /// Reserved directory under the records root for images (default: "images").
    pub images_dir: String,

    /// Directory used by the local backend (default: ".").
    pub local_path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: Backend::Github,
            records_root: "docs".to_string(),
            images_dir: "images".to_string(),
            local_path: PathBuf::from("."),
        }
    }
}

/// GitHub backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GithubConfig {
    /// Repository in `owner/name` form.
    pub repo: Option<String>,

    /// Branch to read and commit to (default: "main").
    pub branch: String,

    /// API base URL (default: "https://api.github.com").
    pub api_url: String,

    /// Environment variable holding the access token (default: "GITHUB_TOKEN").
    pub token_env: String,

    /// Request timeout in seconds (default: 30).
    pub timeout_secs: u64,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            repo: None,
            branch: "main".to_string(),
            api_url: "https://api.github.com".to_string(),
            token_env: "GITHUB_TOKEN".to_string(),
            timeout_secs: 30,
        }
    }
}

impl GithubConfig {
    /// Returns the request timeout as a Duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Image transform configuration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ImageConfig {
    /// Longest edge in pixels after downscaling (default: 1200).
    pub max_edge: u32,

    /// JPEG quality factor (default: 80).
    pub quality: u8,

    /// Name images by local wall-clock time instead of UTC (default: false).
    pub local_time: bool,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            max_edge: 1200,
            quality: 80,
            local_time: false,
        }
    }
}
