//! Import the videos of a YouTube playlist as podcast episodes.
//!
//! playlist-import fetches a playlist's metadata from a podcast backend,
//! shows its videos in a terminal UI, lets the user check the ones they want
//! and then asks the backend to create one episode per checked video. The
//! creation requests run concurrently and independently: one failing video
//! never affects the others.
//!
//! # Features
//!
//! - Fetch a playlist by URL; the newest fetch always wins
//! - Check videos one by one or all at once
//! - Per-video creation status (in progress, created)
//! - Recently imported playlists
//! - Headless mode for scripts
//!
//! # Usage
//!
//! ```bash
//! # Interactive
//! cargo run -- --podcast 3
//!
//! # Create episodes for videos 1 and 3 to 5 without the UI
//! cargo run -- --podcast 3 --playlist "https://www.youtube.com/playlist?list=..." --select 1,3-5
//! ```

pub mod api;
pub mod batch;
pub mod config;
pub mod entries;
pub mod error;
pub mod events;
pub mod headless;
pub mod history;
pub mod playlist;
pub mod selection;
pub mod tui;
pub mod types;
