//! Type definitions for playlist-import.
//!
//! Playlist entries as returned by the metadata provider, and the
//! per-entry creation tasks driven by the batch creator.

use crate::error::CreationError;
use serde::{Deserialize, Deserializer};
use std::fmt;

/// Opaque identifier of a playlist entry, unique within one fetch.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId(String);

impl EntryId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntryId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

// Providers send ids either as strings or as bare numbers.
impl<'de> Deserialize<'de> for EntryId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Number(serde_json::Number),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(s) => EntryId(s),
            RawId::Number(n) => EntryId(n.to_string()),
        })
    }
}

/// One remote video of a playlist.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct PlaylistEntry {
    pub id: EntryId,

    /// Source locator, sent verbatim to the backend.
    pub url: String,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,

    /// Display-only; empty strings are normalized to `None` by the fetcher.
    #[serde(default, alias = "thumbnailUrl")]
    pub thumbnail_url: Option<String>,

    #[serde(default)]
    pub description: Option<String>,
}

// `"title": null` reads like a missing title.
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl PlaylistEntry {
    /// Format the entry for display in the list.
    ///
    /// # Examples
    ///
    /// ```
    /// use playlist_import::types::{EntryId, PlaylistEntry};
    ///
    /// let entry = PlaylistEntry {
    ///     id: EntryId::new("dQw4w9WgXcQ"),
    ///     url: "https://www.youtube.com/watch?v=dQw4w9WgXcQ".to_string(),
    ///     title: "Never Gonna Give You Up".to_string(),
    ///     thumbnail_url: None,
    ///     description: None,
    /// };
    /// assert_eq!(entry.to_display(), "Never Gonna Give You Up");
    ///
    /// let untitled = PlaylistEntry { title: String::new(), ..entry };
    /// assert_eq!(untitled.to_display(), "https://www.youtube.com/watch?v=dQw4w9WgXcQ");
    /// ```
    pub fn to_display(&self) -> String {
        if self.title.trim().is_empty() {
            self.url.clone()
        } else {
            self.title.clone()
        }
    }
}

/// Result of a successful playlist fetch.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct Playlist {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    pub entries: Vec<PlaylistEntry>,
}

/// Identifier of one batch invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BatchId(pub u64);

impl fmt::Display for BatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Lifecycle of a creation task. The error detail exists only when failed.
#[derive(Debug, Clone, PartialEq)]
pub enum CreationStatus {
    Pending,
    Succeeded,
    Failed(CreationError),
}

/// One creation request for one selected entry in one batch invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct CreationTask {
    pub batch: BatchId,
    pub entry_id: EntryId,
    pub url: String,
    pub status: CreationStatus,
}

impl CreationTask {
    pub fn new(batch: BatchId, entry_id: EntryId, url: String) -> Self {
        Self {
            batch,
            entry_id,
            url,
            status: CreationStatus::Pending,
        }
    }

    /// Move the task to its terminal state. Consumes the pending task so a
    /// task can only be resolved once.
    pub fn resolve(self, outcome: Result<(), CreationError>) -> Self {
        debug_assert_eq!(
            self.status,
            CreationStatus::Pending,
            "task for {} resolved twice",
            self.entry_id
        );
        let status = match outcome {
            Ok(()) => CreationStatus::Succeeded,
            Err(e) => CreationStatus::Failed(e),
        };
        Self { status, ..self }
    }

    pub fn error_detail(&self) -> Option<&CreationError> {
        match &self.status {
            CreationStatus::Failed(e) => Some(e),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_id_from_number_and_string() {
        let ids: Vec<EntryId> = serde_json::from_str(r#"[1, "abc", 42]"#).unwrap();
        assert_eq!(ids, vec![EntryId::new("1"), EntryId::new("abc"), EntryId::new("42")]);
    }

    #[test]
    fn test_playlist_entry_minimal_fields() {
        let entry: PlaylistEntry =
            serde_json::from_str(r#"{"id": "v1", "url": "https://example.com/v1"}"#).unwrap();
        assert_eq!(entry.id.as_str(), "v1");
        assert_eq!(entry.title, "");
        assert!(entry.thumbnail_url.is_none());
    }

    #[test]
    fn test_playlist_without_entries_is_rejected() {
        let parsed: Result<Playlist, _> = serde_json::from_str(r#"{"title": "x"}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_task_resolve_success() {
        let task = CreationTask::new(BatchId(1), EntryId::new("1"), "u1".to_string());
        assert_eq!(task.status, CreationStatus::Pending);

        let done = task.resolve(Ok(()));
        assert_eq!(done.status, CreationStatus::Succeeded);
        assert!(done.error_detail().is_none());
    }

    #[test]
    fn test_task_resolve_failure_keeps_detail() {
        let task = CreationTask::new(BatchId(2), EntryId::new("7"), "u7".to_string());
        let done = task.resolve(Err(CreationError::Network("refused".to_string())));
        assert_eq!(
            done.error_detail(),
            Some(&CreationError::Network("refused".to_string()))
        );
        assert_eq!(done.entry_id, EntryId::new("7"));
        assert_eq!(done.batch, BatchId(2));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "resolved twice")]
    fn test_task_cannot_be_resolved_twice() {
        let task = CreationTask::new(BatchId(3), EntryId::new("1"), "u1".to_string());
        let done = task.resolve(Ok(()));
        let _ = done.resolve(Err(CreationError::Network("late".to_string())));
    }
}
