//! Playlist fetching.
//!
//! Every fetch is stamped with a [`FetchTicket`] before it starts. Fetches
//! are never cancelled, so two of them may be in flight at once; the entry
//! store uses the ticket to ignore a slow, older response that arrives after
//! a newer one has already been rendered.

use crate::api::PlaylistProvider;
use crate::error::FetchError;
use crate::events::{AppEvent, EventSender};
use crate::types::Playlist;
use log::{debug, warn};
use std::collections::HashSet;
use std::sync::Arc;

/// Sequence number of one fetch, increasing per fetcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FetchTicket(pub u64);

/// Issues playlist fetches against a provider.
pub struct PlaylistFetcher {
    provider: Arc<dyn PlaylistProvider>,
    next_seq: u64,
}

impl PlaylistFetcher {
    pub fn new(provider: Arc<dyn PlaylistProvider>) -> Self {
        Self {
            provider,
            next_seq: 1,
        }
    }

    /// Hand out the ticket for the next fetch.
    pub fn begin(&mut self) -> FetchTicket {
        let ticket = FetchTicket(self.next_seq);
        self.next_seq += 1;
        ticket
    }

    /// Fetch a playlist and wait for the result.
    pub async fn fetch(&self, playlist_url: &str) -> Result<Playlist, FetchError> {
        fetch_with(self.provider.as_ref(), playlist_url).await
    }

    /// Start a fetch in the background. The outcome is delivered as
    /// [`AppEvent::PlaylistFetched`] carrying the returned ticket.
    pub fn spawn(&mut self, playlist_url: &str, events: EventSender) -> FetchTicket {
        let ticket = self.begin();
        let provider = Arc::clone(&self.provider);
        let playlist_url = playlist_url.to_string();

        debug!("Starting playlist fetch {:?} for {}", ticket, playlist_url);

        tokio::spawn(async move {
            let result = fetch_with(provider.as_ref(), &playlist_url).await;
            // The receiver is gone only when the app is shutting down.
            let _ = events.send(AppEvent::PlaylistFetched {
                ticket,
                playlist_url,
                result,
            });
        });

        ticket
    }
}

async fn fetch_with(
    provider: &dyn PlaylistProvider,
    playlist_url: &str,
) -> Result<Playlist, FetchError> {
    let playlist_url = playlist_url.trim();
    if playlist_url.is_empty() {
        return Err(FetchError::EmptyUrl);
    }

    match provider.fetch_playlist(playlist_url).await {
        Ok(playlist) => {
            let playlist = normalize(playlist);
            debug!(
                "Fetched {} entries for {}",
                playlist.entries.len(),
                playlist_url
            );
            Ok(playlist)
        }
        Err(e) => {
            warn!("Playlist fetch for {} failed: {}", playlist_url, e);
            Err(e)
        }
    }
}

/// Enforce the entry invariants: ids unique (first occurrence wins) and
/// empty thumbnail URLs treated as absent. Order is left untouched.
pub fn normalize(mut playlist: Playlist) -> Playlist {
    let mut seen = HashSet::new();
    playlist.entries.retain(|entry| {
        let fresh = seen.insert(entry.id.clone());
        if !fresh {
            warn!("Dropping duplicate playlist entry {}", entry.id);
        }
        fresh
    });

    for entry in &mut playlist.entries {
        if entry.thumbnail_url.as_deref().is_some_and(|t| t.trim().is_empty()) {
            entry.thumbnail_url = None;
        }
    }

    playlist
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{EntryId, PlaylistEntry};
    use async_trait::async_trait;
    use std::sync::Mutex;

    fn entry(id: &str, url: &str) -> PlaylistEntry {
        PlaylistEntry {
            id: EntryId::new(id),
            url: url.to_string(),
            title: format!("Video {}", id),
            thumbnail_url: Some(String::new()),
            description: None,
        }
    }

    struct RecordingProvider {
        calls: Mutex<Vec<String>>,
        result: Result<Playlist, FetchError>,
    }

    #[async_trait]
    impl PlaylistProvider for RecordingProvider {
        async fn fetch_playlist(&self, playlist_url: &str) -> Result<Playlist, FetchError> {
            self.calls.lock().unwrap().push(playlist_url.to_string());
            self.result.clone()
        }
    }

    fn provider(result: Result<Playlist, FetchError>) -> Arc<RecordingProvider> {
        Arc::new(RecordingProvider {
            calls: Mutex::new(Vec::new()),
            result,
        })
    }

    #[test]
    fn test_tickets_increase() {
        let mut fetcher = PlaylistFetcher::new(provider(Ok(Playlist::default())));
        let first = fetcher.begin();
        let second = fetcher.begin();
        assert!(second > first);
    }

    #[test]
    fn test_normalize_drops_duplicates_keeps_order() {
        let playlist = Playlist {
            entries: vec![entry("b", "u1"), entry("a", "u2"), entry("b", "u3")],
            ..Playlist::default()
        };

        let normalized = normalize(playlist);
        let urls: Vec<&str> = normalized.entries.iter().map(|e| e.url.as_str()).collect();
        assert_eq!(urls, vec!["u1", "u2"]);
        assert!(normalized.entries.iter().all(|e| e.thumbnail_url.is_none()));
    }

    #[tokio::test]
    async fn test_fetch_sends_one_request() {
        let provider = provider(Ok(Playlist {
            entries: vec![entry("1", "u1")],
            ..Playlist::default()
        }));
        let fetcher = PlaylistFetcher::new(provider.clone());

        let playlist = fetcher.fetch("  https://youtube.com/playlist?list=PL1 ").await.unwrap();
        assert_eq!(playlist.entries.len(), 1);
        assert_eq!(
            *provider.calls.lock().unwrap(),
            vec!["https://youtube.com/playlist?list=PL1".to_string()]
        );
    }

    #[tokio::test]
    async fn test_empty_url_is_rejected_without_request() {
        let provider = provider(Ok(Playlist::default()));
        let fetcher = PlaylistFetcher::new(provider.clone());

        assert_eq!(fetcher.fetch("   ").await, Err(FetchError::EmptyUrl));
        assert!(provider.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_spawn_reports_through_channel() {
        let failure = FetchError::Status {
            status: 400,
            payload: "bad playlist".to_string(),
        };
        let mut fetcher = PlaylistFetcher::new(provider(Err(failure.clone())));
        let (tx, mut rx) = crate::events::channel();

        let ticket = fetcher.spawn("https://youtube.com/watch?v=x", tx);

        match rx.recv().await {
            Some(AppEvent::PlaylistFetched {
                ticket: got,
                playlist_url,
                result,
            }) => {
                assert_eq!(got, ticket);
                assert_eq!(playlist_url, "https://youtube.com/watch?v=x");
                assert_eq!(result, Err(failure));
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }
}
