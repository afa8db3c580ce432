//! TUI type definitions for screens, focus, and actions.

/// The current screen/view of the application.
#[derive(Debug, Clone, PartialEq)]
pub enum Screen {
    /// Nothing fetched yet - welcome text
    Startup,
    /// Entry list of the current playlist (or its empty/error state)
    Entries,
}

/// Focus state for split-panel views.
#[derive(Debug, Clone, PartialEq)]
pub enum Focus {
    Sidebar,
    Main,
}

/// Actions that need the event loop (network or persistence).
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// No action, continue running
    None,
    /// Quit the application
    Quit,
    /// Fetch the playlist at this URL
    FetchPlaylist(String),
    /// Re-fetch a playlist from the recent list by index
    OpenRecent(usize),
    /// Create episodes for the checked entries
    CreateSelected,
}
