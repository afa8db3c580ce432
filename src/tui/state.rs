//! Application state management and input handling.

use crate::entries::{EntryStore, ViewState};
use crate::error::FetchError;
use crate::history::PlaylistRecord;
use crate::playlist::FetchTicket;
use crate::selection::{SelectedEntry, current_selection};
use crate::types::{CreationStatus, CreationTask, Playlist};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::widgets::ListState;

use super::types::{Action, Focus, Screen};

/// Application state for the TUI.
pub struct App {
    /// Current screen being displayed
    pub screen: Screen,
    /// Current focus (sidebar or main)
    pub focus: Focus,
    /// Whether the app should quit
    pub should_quit: bool,
    /// Playlist URL being typed
    pub url_input: String,
    /// Whether the URL bar is focused
    pub url_focused: bool,
    /// Rendered playlist entries with their check and creation state
    pub store: EntryStore,
    /// Cursor in the entry list
    pub entry_list_state: ListState,
    /// Recently imported playlists for the sidebar
    pub recent: Vec<PlaylistRecord>,
    pub recent_list_state: ListState,
    /// Podcast receiving new episodes; creation is disabled without one
    pub podcast_id: Option<u64>,
    /// Backend URL shown in the header
    pub server_url: String,
    /// URL of the most recently requested playlist
    pub last_playlist_url: Option<String>,
    /// Ticket of the newest fetch still in flight
    pub loading: Option<FetchTicket>,
    pub loading_message: String,
    /// Status message to display in the footer
    pub status_message: Option<String>,
    /// Error message to display
    pub error_message: Option<String>,
    /// Whether help modal is shown
    pub show_help: bool,
}

impl App {
    /// Create a new App with default state.
    pub fn new(podcast_id: Option<u64>, server_url: String) -> Self {
        Self {
            screen: Screen::Startup,
            focus: Focus::Main,
            should_quit: false,
            url_input: String::new(),
            url_focused: true,
            store: EntryStore::new(),
            entry_list_state: ListState::default(),
            recent: Vec::new(),
            recent_list_state: ListState::default(),
            podcast_id,
            server_url,
            last_playlist_url: None,
            loading: None,
            loading_message: String::new(),
            status_message: None,
            error_message: None,
            show_help: false,
        }
    }

    /// Set the recent playlists shown in the sidebar.
    pub fn set_recent(&mut self, records: Vec<PlaylistRecord>) {
        let has_records = !records.is_empty();
        self.recent = records;
        if has_records && self.recent_list_state.selected().is_none() {
            self.recent_list_state.select(Some(0));
        }
    }

    /// Record that a fetch was started. The entry list stays interactive.
    pub fn begin_fetch(&mut self, ticket: FetchTicket, playlist_url: &str) {
        self.loading = Some(ticket);
        self.loading_message = format!("Loading {}...", playlist_url);
        self.last_playlist_url = Some(playlist_url.to_string());
    }

    /// Apply a finished fetch. Returns whether it replaced the entry list.
    pub fn on_playlist_fetched(
        &mut self,
        ticket: FetchTicket,
        result: Result<Playlist, FetchError>,
    ) -> bool {
        if self.loading == Some(ticket) {
            self.loading = None;
            self.loading_message.clear();
        }

        if !self.store.render(ticket, result) {
            return false;
        }

        self.screen = Screen::Entries;
        self.focus = Focus::Main;
        self.entry_list_state
            .select(if self.store.is_empty() { None } else { Some(0) });
        true
    }

    /// Route a finished creation task to its entry.
    pub fn on_creation_finished(&mut self, task: &CreationTask) {
        self.store.apply_outcome(task);

        let pending = self.store.pending_count();
        let created = self.store.created_count();
        let last = match &task.status {
            CreationStatus::Failed(_) => format!("failed: {}", task.entry_id),
            _ => format!("created: {}", task.entry_id),
        };
        self.set_status(&format!(
            "{} created, {} in progress ({})",
            created, pending, last
        ));
    }

    /// Snapshot the selection for a new batch, or explain why there is none.
    pub fn batch_request(&mut self) -> Option<(u64, Vec<SelectedEntry>)> {
        if !self.store.batch_enabled() {
            return None;
        }
        let Some(podcast_id) = self.podcast_id else {
            self.set_error("No podcast configured. Start with --podcast <ID>.");
            return None;
        };

        let selection = current_selection(&self.store);
        if selection.is_empty() {
            self.set_status("Nothing selected. Press Space to check entries.");
            return None;
        }
        Some((podcast_id, selection))
    }

    /// Mark a dispatched selection as in flight.
    pub fn batch_started(&mut self, selection: &[SelectedEntry]) {
        self.store
            .mark_pending(selection.iter().map(|s| &s.entry_id));
        self.set_status(&format!("Creating {} episode(s)...", selection.len()));
    }

    /// Set an error message.
    pub fn set_error(&mut self, message: &str) {
        self.error_message = Some(message.to_string());
    }

    /// Clear error message.
    pub fn clear_error(&mut self) {
        self.error_message = None;
    }

    pub fn set_status(&mut self, message: &str) {
        self.status_message = Some(message.to_string());
    }

    /// Handle keyboard input and return an action.
    pub fn handle_input(&mut self, key: KeyEvent) -> Action {
        // Global quit with Ctrl+C or Ctrl+Q
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('c') | KeyCode::Char('q') => {
                    self.should_quit = true;
                    return Action::Quit;
                }
                _ => {}
            }
        }

        if self.show_help {
            if matches!(
                key.code,
                KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')
            ) {
                self.show_help = false;
            }
            return Action::None;
        }

        if self.url_focused {
            return self.handle_url_input(key);
        }

        match key.code {
            KeyCode::Char('?') => {
                self.show_help = true;
                return Action::None;
            }
            KeyCode::Char('/') => {
                self.url_focused = true;
                return Action::None;
            }
            KeyCode::Tab => {
                self.focus = match self.focus {
                    Focus::Sidebar => Focus::Main,
                    Focus::Main => Focus::Sidebar,
                };
                if self.focus == Focus::Sidebar
                    && self.recent_list_state.selected().is_none()
                    && !self.recent.is_empty()
                {
                    self.recent_list_state.select(Some(0));
                }
                return Action::None;
            }
            KeyCode::Char('q') => {
                self.should_quit = true;
                return Action::Quit;
            }
            _ => {}
        }

        if self.focus == Focus::Sidebar {
            return self.handle_sidebar_input(key);
        }

        match self.screen {
            Screen::Startup => Action::None,
            Screen::Entries => self.handle_entry_list_input(key),
        }
    }

    fn handle_url_input(&mut self, key: KeyEvent) -> Action {
        match key.code {
            KeyCode::Enter => {
                let url = self.url_input.trim().to_string();
                if url.is_empty() {
                    return Action::None;
                }
                self.url_input.clear();
                self.url_focused = false;
                self.focus = Focus::Main;
                Action::FetchPlaylist(url)
            }
            KeyCode::Char(c) => {
                self.url_input.push(c);
                Action::None
            }
            KeyCode::Backspace => {
                self.url_input.pop();
                Action::None
            }
            KeyCode::Esc => {
                self.url_input.clear();
                self.url_focused = false;
                Action::None
            }
            _ => Action::None,
        }
    }

    fn handle_sidebar_input(&mut self, key: KeyEvent) -> Action {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                let i = self.recent_list_state.selected().unwrap_or(0);
                if i > 0 {
                    self.recent_list_state.select(Some(i - 1));
                }
                Action::None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                let i = self.recent_list_state.selected().unwrap_or(0);
                if i < self.recent.len().saturating_sub(1) {
                    self.recent_list_state.select(Some(i + 1));
                }
                Action::None
            }
            KeyCode::Enter => match self.recent_list_state.selected() {
                Some(i) if i < self.recent.len() => {
                    self.focus = Focus::Main;
                    Action::OpenRecent(i)
                }
                _ => Action::None,
            },
            _ => Action::None,
        }
    }

    fn handle_entry_list_input(&mut self, key: KeyEvent) -> Action {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                let i = self.entry_list_state.selected().unwrap_or(0);
                if i > 0 {
                    self.entry_list_state.select(Some(i - 1));
                }
                Action::None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                let i = self.entry_list_state.selected().unwrap_or(0);
                if i < self.store.len().saturating_sub(1) {
                    self.entry_list_state.select(Some(i + 1));
                }
                Action::None
            }
            KeyCode::Char(' ') => {
                if let Some(i) = self.entry_list_state.selected() {
                    if self.store.row_at(i).is_some_and(|r| !r.selectable()) {
                        self.set_status("Entry is already created or in progress");
                    } else {
                        self.store.toggle_at(i);
                    }
                }
                Action::None
            }
            KeyCode::Char('a') => {
                self.store.toggle_all();
                Action::None
            }
            KeyCode::Char('c') => {
                if self.store.batch_enabled() {
                    Action::CreateSelected
                } else {
                    Action::None
                }
            }
            KeyCode::Char('r') => match &self.last_playlist_url {
                Some(url) => Action::FetchPlaylist(url.clone()),
                None => Action::None,
            },
            _ => Action::None,
        }
    }

    /// Number of checked entries, for the list title.
    pub fn checked_count(&self) -> usize {
        self.store.rows().filter(|r| r.checked).count()
    }

    /// Whether the list shows an error rather than entries.
    pub fn fetch_failed(&self) -> bool {
        matches!(self.store.state(), ViewState::Failed(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BatchId, EntryId, PlaylistEntry};
    use crossterm::event::KeyEventKind;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: crossterm::event::KeyEventState::NONE,
        }
    }

    fn playlist(ids: &[&str]) -> Playlist {
        Playlist {
            entries: ids
                .iter()
                .map(|id| PlaylistEntry {
                    id: EntryId::new(*id),
                    url: format!("u{}", id),
                    title: format!("Video {}", id),
                    thumbnail_url: None,
                    description: None,
                })
                .collect(),
            ..Playlist::default()
        }
    }

    fn type_url(app: &mut App, url: &str) -> Action {
        for c in url.chars() {
            app.handle_input(key(KeyCode::Char(c)));
        }
        app.handle_input(key(KeyCode::Enter))
    }

    #[test]
    fn test_enter_in_url_bar_requests_fetch() {
        let mut app = App::new(Some(1), "http://localhost:8000".to_string());
        assert!(app.url_focused);

        let action = type_url(&mut app, "https://yt/list=1");
        assert_eq!(action, Action::FetchPlaylist("https://yt/list=1".to_string()));
        assert!(!app.url_focused);
    }

    #[test]
    fn test_empty_url_does_not_fetch() {
        let mut app = App::new(Some(1), String::new());
        assert_eq!(type_url(&mut app, "   "), Action::None);
    }

    #[test]
    fn test_create_trigger_disabled_without_entries() {
        let mut app = App::new(Some(1), String::new());
        app.url_focused = false;
        app.on_playlist_fetched(FetchTicket(1), Ok(playlist(&[])));

        assert_eq!(app.handle_input(key(KeyCode::Char('c'))), Action::None);
        assert!(app.batch_request().is_none());
    }

    #[test]
    fn test_toggle_then_create() {
        let mut app = App::new(Some(5), String::new());
        app.url_focused = false;
        app.on_playlist_fetched(FetchTicket(1), Ok(playlist(&["1", "2"])));

        app.handle_input(key(KeyCode::Char(' ')));
        assert_eq!(app.checked_count(), 1);
        assert_eq!(
            app.handle_input(key(KeyCode::Char('c'))),
            Action::CreateSelected
        );

        let (podcast_id, selection) = app.batch_request().unwrap();
        assert_eq!(podcast_id, 5);
        assert_eq!(selection.len(), 1);
        assert_eq!(selection[0].url, "u1");

        app.batch_started(&selection);
        assert_eq!(app.checked_count(), 0);
        assert_eq!(app.store.pending_count(), 1);
    }

    #[test]
    fn test_batch_request_requires_podcast() {
        let mut app = App::new(None, String::new());
        app.on_playlist_fetched(FetchTicket(1), Ok(playlist(&["1"])));
        app.store.toggle_at(0);

        assert!(app.batch_request().is_none());
        assert!(app.error_message.is_some());
    }

    #[test]
    fn test_stale_fetch_keeps_newer_list_and_loading_state() {
        let mut app = App::new(Some(1), String::new());
        app.begin_fetch(FetchTicket(1), "old");
        app.begin_fetch(FetchTicket(2), "new");

        assert!(app.on_playlist_fetched(FetchTicket(2), Ok(playlist(&["n"]))));
        assert!(app.loading.is_none());
        assert!(!app.on_playlist_fetched(FetchTicket(1), Ok(playlist(&["o"]))));
        assert_eq!(app.store.row_at(0).unwrap().entry.id, EntryId::new("n"));
    }

    #[test]
    fn test_failed_fetch_shows_error_state() {
        let mut app = App::new(Some(1), String::new());
        app.on_playlist_fetched(
            FetchTicket(1),
            Err(FetchError::Status {
                status: 400,
                payload: "bad".to_string(),
            }),
        );
        assert!(app.fetch_failed());
        assert_eq!(app.screen, Screen::Entries);
        assert!(app.entry_list_state.selected().is_none());
    }

    #[test]
    fn test_creation_outcome_updates_status_line() {
        let mut app = App::new(Some(1), String::new());
        app.on_playlist_fetched(FetchTicket(1), Ok(playlist(&["1", "2"])));
        app.store.toggle_at(0);
        app.store.toggle_at(1);
        let (_, selection) = app.batch_request().unwrap();
        app.batch_started(&selection);

        let task = CreationTask::new(BatchId(1), EntryId::new("2"), "u2".to_string())
            .resolve(Ok(()));
        app.on_creation_finished(&task);

        assert_eq!(
            app.status_message.as_deref(),
            Some("1 created, 1 in progress (created: 2)")
        );
    }

    #[test]
    fn test_refresh_refetches_last_url() {
        let mut app = App::new(Some(1), String::new());
        app.url_focused = false;
        app.begin_fetch(FetchTicket(1), "https://yt/list=1");
        app.on_playlist_fetched(FetchTicket(1), Ok(playlist(&["1"])));

        assert_eq!(
            app.handle_input(key(KeyCode::Char('r'))),
            Action::FetchPlaylist("https://yt/list=1".to_string())
        );
    }

    #[test]
    fn test_reload_during_batch_does_not_resend_in_flight_entries() {
        let mut app = App::new(Some(1), String::new());
        app.url_focused = false;
        app.begin_fetch(FetchTicket(1), "https://yt/list=1");
        app.on_playlist_fetched(FetchTicket(1), Ok(playlist(&["1", "2"])));
        app.handle_input(key(KeyCode::Char(' ')));
        let (_, selection) = app.batch_request().unwrap();
        app.batch_started(&selection);

        assert_eq!(
            app.handle_input(key(KeyCode::Char('r'))),
            Action::FetchPlaylist("https://yt/list=1".to_string())
        );
        app.begin_fetch(FetchTicket(2), "https://yt/list=1");
        assert!(app.on_playlist_fetched(FetchTicket(2), Ok(playlist(&["1", "2"]))));

        app.handle_input(key(KeyCode::Char(' ')));
        assert_eq!(app.checked_count(), 0);
        assert!(app.batch_request().is_none());
    }
}
