//! Configuration Management
//!
//! Handles persistent configuration storage for hrec.

use crate::heroku::client::DEFAULT_API_URL;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default state file, relative to the working directory
pub const DEFAULT_STATE_PATH: &str = "hrec.state.json";

/// User configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    /// Platform API endpoint
    #[serde(default)]
    pub api_url: Option<String>,
    /// Account identity; add-on creation is serialized per account
    #[serde(default)]
    pub account: Option<String>,
    /// Where managed resource state is kept
    #[serde(default)]
    pub state_path: Option<PathBuf>,
}

impl Config {
    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("hrec").join("config.json"))
    }

    /// Load configuration from disk
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    /// Load configuration from a specific file, defaulting when unreadable
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("Ignoring malformed config {:?}: {}", path, e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path().context("No config directory available")?;
        self.save_to(&path)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }

    /// Save configuration to a specific file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content).with_context(|| format!("Failed to write {:?}", path))?;

        Ok(())
    }

    /// Get effective API URL (env > config > default)
    pub fn effective_api_url(&self) -> String {
        env_var("HEROKU_API_URL")
            .or_else(|| self.api_url.clone())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
    }

    /// Get effective account identity (env > config > the API URL in use)
    pub fn effective_account(&self, api_url: &str) -> String {
        resolve_account(env_var("HEROKU_ACCOUNT"), self.account.as_deref(), api_url)
    }

    /// Overwrite the settings that were given, keeping the rest
    pub fn apply_overrides(
        &mut self,
        api_url: Option<&str>,
        account: Option<&str>,
        state_path: Option<&Path>,
    ) {
        if let Some(api_url) = api_url {
            self.api_url = Some(api_url.to_string());
        }
        if let Some(account) = account {
            self.account = Some(account.to_string());
        }
        if let Some(state_path) = state_path {
            self.state_path = Some(state_path.to_path_buf());
        }
    }

    /// Get effective state file path (config > default)
    pub fn effective_state_path(&self) -> PathBuf {
        self.state_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_PATH))
    }
}

/// API key for the Platform API, taken from the environment
pub fn api_key() -> Result<String> {
    env_var("HEROKU_API_KEY").context("HEROKU_API_KEY is not set")
}

fn resolve_account(env: Option<String>, configured: Option<&str>, api_url: &str) -> String {
    env.or_else(|| configured.map(String::from))
        .unwrap_or_else(|| api_url.to_string())
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}
