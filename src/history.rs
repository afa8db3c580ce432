//! Recently imported playlists.
//!
//! Only the playlist URL and a few display fields are remembered, so a
//! playlist can be reopened from the sidebar. Per-entry creation progress is
//! never persisted.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

/// One successfully fetched playlist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistRecord {
    pub playlist_url: String,
    pub title: Option<String>,
    /// Entry count at the time of the last fetch.
    pub entry_count: usize,
    /// Unix timestamp of the last fetch.
    pub timestamp: u64,
}

impl PlaylistRecord {
    pub fn to_display(&self) -> String {
        let name = self.title.as_deref().unwrap_or(&self.playlist_url);
        format!("{} [{}]", name, self.entry_count)
    }
}

/// Recent playlists keyed by URL.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RecentPlaylists {
    pub records: HashMap<String, PlaylistRecord>,
}

/// Directory for application data (history and log file).
pub fn data_dir() -> std::result::Result<PathBuf, io::Error> {
    Ok(dirs::data_local_dir()
        .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "Could not find data directory"))?
        .join("playlist-import"))
}

impl RecentPlaylists {
    pub fn new() -> Self {
        Self {
            records: HashMap::new(),
        }
    }

    /// Returns ~/.local/share/playlist-import/history.json on Linux,
    /// or a platform-appropriate location on other systems.
    pub fn get_history_path() -> std::result::Result<PathBuf, io::Error> {
        Ok(data_dir()?.join("history.json"))
    }

    /// Load from disk. Returns an empty history if the file doesn't exist.
    pub fn load() -> Result<Self> {
        let path = Self::get_history_path()?;

        if !path.exists() {
            return Ok(Self::new());
        }

        let content = fs::read_to_string(&path)?;
        let history: RecentPlaylists = serde_json::from_str(&content)?;
        Ok(history)
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::get_history_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    /// Update or add the record for a fetched playlist.
    pub fn update(&mut self, playlist_url: &str, title: Option<&str>, entry_count: usize) {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();

        let record = PlaylistRecord {
            playlist_url: playlist_url.to_string(),
            title: title.map(str::to_string),
            entry_count,
            timestamp,
        };

        self.records.insert(playlist_url.to_string(), record);
    }

    /// Most recently fetched playlists first.
    pub fn get_recent(&self, limit: usize) -> Vec<&PlaylistRecord> {
        let mut records: Vec<&PlaylistRecord> = self.records.values().collect();
        records.sort_by(|a, b| {
            b.timestamp
                .cmp(&a.timestamp)
                .then_with(|| a.playlist_url.cmp(&b.playlist_url))
        });
        records.truncate(limit);
        records
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
