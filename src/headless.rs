//! One-shot import without the terminal UI.
//!
//! Drives the same store, selection and creator as the TUI: fetch once,
//! check entries by position, create, and report every entry as soon as its
//! request finishes.

use crate::api::{EpisodeBackend, PlaylistProvider};
use crate::batch::BatchEpisodeCreator;
use crate::entries::{EntryStore, ViewState};
use crate::error::{FetchError, Result};
use crate::events::{self, AppEvent};
use crate::playlist::PlaylistFetcher;
use crate::selection::{apply_positions, current_selection};
use log::{debug, info};
use std::io::Write;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub enum ImportOutcome {
    /// The playlist could not be loaded; nothing was created.
    FetchFailed(FetchError),
    Finished(ImportSummary),
}

impl ImportOutcome {
    /// True when the playlist loaded and no entry failed.
    pub fn is_success(&self) -> bool {
        matches!(self, ImportOutcome::Finished(summary) if summary.failed == 0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub title: Option<String>,
    pub entry_count: usize,
    pub created: usize,
    pub failed: usize,
}

/// Fetch `playlist_url`, check the entries at `positions` and create them.
///
/// Writes `created <id>` or `failed <id>: <detail>` to `out` per entry, in
/// completion order. Invalid positions are an error before any request is
/// sent to the backend.
pub async fn import_playlist(
    provider: Arc<dyn PlaylistProvider>,
    backend: Arc<dyn EpisodeBackend>,
    podcast_id: u64,
    playlist_url: &str,
    positions: &str,
    out: &mut dyn Write,
) -> Result<ImportOutcome> {
    let mut fetcher = PlaylistFetcher::new(provider);
    let ticket = fetcher.begin();
    let result = fetcher.fetch(playlist_url).await;

    let mut store = EntryStore::new();
    store.render(ticket, result);

    if let ViewState::Failed(e) = store.state() {
        return Ok(ImportOutcome::FetchFailed(e.clone()));
    }

    let mut summary = ImportSummary {
        title: store.playlist_title().map(str::to_string),
        entry_count: store.len(),
        ..ImportSummary::default()
    };

    if store.is_empty() {
        writeln!(out, "No videos found.")?;
        return Ok(ImportOutcome::Finished(summary));
    }

    apply_positions(&mut store, positions)?;
    let selection = current_selection(&store);

    let (tx, mut rx) = events::channel();
    let mut creator = BatchEpisodeCreator::new(backend);
    let invocation = creator.create_all(podcast_id, &selection, &tx);
    // Every spawned task holds its own sender; the loop ends with the last one.
    drop(tx);
    store.mark_pending(selection.iter().map(|s| &s.entry_id));

    debug!(
        "Batch {} dispatched {} request(s)",
        invocation.id, invocation.dispatched
    );

    while let Some(event) = rx.recv().await {
        let AppEvent::CreationFinished(task) = event else {
            continue;
        };
        store.apply_outcome(&task);

        match task.error_detail() {
            None => {
                summary.created += 1;
                writeln!(out, "created {}", task.entry_id)?;
            }
            Some(e) => {
                summary.failed += 1;
                writeln!(out, "failed {}: {}", task.entry_id, e)?;
            }
        }
    }

    info!(
        "Import finished: {} created, {} failed",
        summary.created, summary.failed
    );

    Ok(ImportOutcome::Finished(summary))
}
