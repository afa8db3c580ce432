//! Configuration file support for playlist-import.
//!
//! This module provides functionality for loading and saving connection
//! settings from a TOML configuration file.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::PathBuf;

/// User configuration settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the podcast backend
    #[serde(default = "default_server_url")]
    pub server_url: String,

    /// Podcast that receives created episodes
    #[serde(default)]
    pub podcast_id: Option<u64>,

    /// Raw `Cookie` header value of a logged-in session
    #[serde(default)]
    pub session_cookie: Option<String>,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

fn default_server_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_request_timeout_secs() -> u64 {
    60
}

fn default_user_agent() -> String {
    format!("playlist-import/{}", env!("CARGO_PKG_VERSION"))
}

impl Config {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self {
            server_url: default_server_url(),
            podcast_id: None,
            session_cookie: None,
            request_timeout_secs: default_request_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }

    /// Get the path to the config file.
    ///
    /// Returns ~/.config/playlist-import/config.toml on Linux,
    /// or a platform-appropriate location on other systems.
    pub fn get_config_path() -> std::result::Result<PathBuf, io::Error> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| {
                io::Error::new(io::ErrorKind::NotFound, "Could not find config directory")
            })?
            .join("playlist-import");

        Ok(config_dir.join("config.toml"))
    }

    /// Load config from disk.
    ///
    /// Returns default config if the file doesn't exist.
    pub fn load() -> Result<Self> {
        let path = Self::get_config_path()?;

        if !path.exists() {
            return Ok(Self::new());
        }

        let content = fs::read_to_string(&path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save config to disk.
    pub fn save(&self) -> Result<()> {
        let path = Self::get_config_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    /// Create a default config file if one doesn't exist.
    ///
    /// Returns the path to the config file.
    pub fn create_default_if_missing() -> Result<PathBuf> {
        let path = Self::get_config_path()?;

        if !path.exists() {
            Self::new().save()?;
        }

        Ok(path)
    }
}
