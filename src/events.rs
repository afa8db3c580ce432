//! Messages sent from background network tasks to the UI loop.

use crate::error::FetchError;
use crate::playlist::FetchTicket;
use crate::types::{CreationTask, Playlist};
use tokio::sync::mpsc;

#[derive(Debug)]
pub enum AppEvent {
    /// A playlist fetch finished, successfully or not.
    PlaylistFetched {
        ticket: FetchTicket,
        playlist_url: String,
        result: Result<Playlist, FetchError>,
    },
    /// One creation task reached its terminal state.
    CreationFinished(CreationTask),
}

pub type EventSender = mpsc::UnboundedSender<AppEvent>;
pub type EventReceiver = mpsc::UnboundedReceiver<AppEvent>;

/// Create the channel shared by the UI loop and its background tasks.
pub fn channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}
