//! In-memory store of the rendered playlist.
//!
//! The store is the single source of truth for what the entry list shows:
//! entries in fetch order, whether each one is checked, and its creation
//! status. The TUI only projects it. All mutation happens on the UI loop.

use crate::error::FetchError;
use crate::playlist::FetchTicket;
use crate::types::{CreationStatus, CreationTask, EntryId, Playlist, PlaylistEntry};
use log::debug;
use std::collections::HashMap;

/// What the entry list currently shows.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewState {
    /// Nothing fetched yet.
    Idle,
    /// A fetch returned at least one entry.
    Loaded,
    /// A fetch succeeded with zero entries.
    Empty,
    /// The last applied fetch failed.
    Failed(FetchError),
}

/// Creation indicator of one entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryStatus {
    Idle,
    /// A creation request is in flight.
    Pending,
    /// An episode was created. Terminal.
    Created,
}

#[derive(Debug, Clone)]
pub struct EntryRow {
    pub entry: PlaylistEntry,
    pub checked: bool,
    pub status: EntryStatus,
}

impl EntryRow {
    /// Whether the row may be checked for a new batch.
    pub fn selectable(&self) -> bool {
        self.status == EntryStatus::Idle
    }
}

#[derive(Debug)]
pub struct EntryStore {
    state: ViewState,
    order: Vec<EntryId>,
    rows: HashMap<EntryId, EntryRow>,
    playlist_title: Option<String>,
    applied: Option<FetchTicket>,
    /// In-flight and created entries, kept across renders so reloading a
    /// playlist cannot make them selectable again.
    statuses: HashMap<EntryId, EntryStatus>,
}

impl Default for EntryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl EntryStore {
    pub fn new() -> Self {
        Self {
            state: ViewState::Idle,
            order: Vec::new(),
            rows: HashMap::new(),
            playlist_title: None,
            applied: None,
            statuses: HashMap::new(),
        }
    }

    /// Apply a fetch result, replacing everything rendered before.
    ///
    /// Returns `false` and leaves the store untouched when the ticket is older
    /// than the last applied one.
    pub fn render(&mut self, ticket: FetchTicket, result: Result<Playlist, FetchError>) -> bool {
        if self.applied.is_some_and(|applied| ticket <= applied) {
            debug!(
                "Discarding stale fetch {:?} (already showing {:?})",
                ticket, self.applied
            );
            return false;
        }
        self.applied = Some(ticket);

        self.order.clear();
        self.rows.clear();
        self.playlist_title = None;

        match result {
            Ok(playlist) => {
                self.playlist_title = playlist.title;
                for entry in playlist.entries {
                    let id = entry.id.clone();
                    if self.rows.contains_key(&id) {
                        continue;
                    }
                    let status = self
                        .statuses
                        .get(&id)
                        .copied()
                        .unwrap_or(EntryStatus::Idle);
                    self.order.push(id.clone());
                    self.rows.insert(
                        id,
                        EntryRow {
                            entry,
                            checked: false,
                            status,
                        },
                    );
                }
                self.state = if self.order.is_empty() {
                    ViewState::Empty
                } else {
                    ViewState::Loaded
                };
            }
            Err(e) => self.state = ViewState::Failed(e),
        }

        true
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn playlist_title(&self) -> Option<&str> {
        self.playlist_title.as_deref()
    }

    /// Whether the batch-creation trigger is enabled.
    pub fn batch_enabled(&self) -> bool {
        self.state == ViewState::Loaded
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Rows in rendering (fetch) order.
    pub fn rows(&self) -> impl Iterator<Item = &EntryRow> {
        self.order.iter().filter_map(|id| self.rows.get(id))
    }

    pub fn row_at(&self, index: usize) -> Option<&EntryRow> {
        self.order.get(index).and_then(|id| self.rows.get(id))
    }

    pub fn get(&self, id: &EntryId) -> Option<&EntryRow> {
        self.rows.get(id)
    }

    /// Check or uncheck an entry. Entries that are pending or already
    /// created cannot be checked. Returns the resulting checked state.
    pub fn set_checked(&mut self, id: &EntryId, checked: bool) -> bool {
        match self.rows.get_mut(id) {
            Some(row) if row.selectable() => {
                row.checked = checked;
                row.checked
            }
            Some(row) => {
                row.checked = false;
                false
            }
            None => false,
        }
    }

    /// Flip the checked state of the entry at a rendering position.
    pub fn toggle_at(&mut self, index: usize) -> bool {
        let Some(id) = self.order.get(index).cloned() else {
            return false;
        };
        let checked = self.rows.get(&id).is_some_and(|row| row.checked);
        self.set_checked(&id, !checked)
    }

    /// Check every selectable entry, or uncheck all if all are checked.
    pub fn toggle_all(&mut self) {
        let all_checked = self
            .rows
            .values()
            .filter(|row| row.selectable())
            .all(|row| row.checked);
        for row in self.rows.values_mut() {
            row.checked = !all_checked && row.selectable();
        }
    }

    /// Mark dispatched entries as in flight and uncheck them.
    pub fn mark_pending<'a>(&mut self, ids: impl IntoIterator<Item = &'a EntryId>) {
        for id in ids {
            // A created entry stays created.
            let status = *self
                .statuses
                .entry(id.clone())
                .or_insert(EntryStatus::Pending);
            if let Some(row) = self.rows.get_mut(id) {
                row.status = status;
                row.checked = false;
            }
        }
    }

    /// Mark one entry as created. Marking twice is harmless.
    pub fn mark_created(&mut self, id: &EntryId) -> bool {
        self.statuses.insert(id.clone(), EntryStatus::Created);
        match self.rows.get_mut(id) {
            Some(row) => {
                row.status = EntryStatus::Created;
                row.checked = false;
                true
            }
            None => false,
        }
    }

    /// Route a finished creation task to its entry by id.
    ///
    /// A failure only releases the in-flight marker; it never touches a
    /// created entry or any other entry. Tasks for entries that are no longer
    /// rendered update no row but are remembered for the next render.
    /// Returns whether a rendered entry was updated.
    pub fn apply_outcome(&mut self, task: &CreationTask) -> bool {
        match &task.status {
            CreationStatus::Succeeded => self.mark_created(&task.entry_id),
            CreationStatus::Failed(_) => {
                if self.statuses.get(&task.entry_id) == Some(&EntryStatus::Pending) {
                    self.statuses.remove(&task.entry_id);
                }
                match self.rows.get_mut(&task.entry_id) {
                    Some(row) if row.status == EntryStatus::Pending => {
                        row.status = EntryStatus::Idle;
                        true
                    }
                    _ => false,
                }
            }
            CreationStatus::Pending => false,
        }
    }

    pub fn pending_count(&self) -> usize {
        self.rows
            .values()
            .filter(|row| row.status == EntryStatus::Pending)
            .count()
    }

    pub fn created_count(&self) -> usize {
        self.rows
            .values()
            .filter(|row| row.status == EntryStatus::Created)
            .count()
    }
}
