//! Terminal User Interface for playlist-import using ratatui.
//!
//! The UI shows one playlist at a time: a URL bar, the list of videos with
//! their check boxes and creation markers, and recent playlists on the left.

mod render;
mod state;
mod types;

pub use render::draw;
pub use state::App;
pub use types::{Action, Focus, Screen};

use crossterm::event::{self, Event};
use std::io;
use std::time::Duration;

/// Poll for keyboard events with a timeout.
pub fn poll_event(timeout: Duration) -> io::Result<Option<Event>> {
    if event::poll(timeout)? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}
