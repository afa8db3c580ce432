//! Main entry point for the playlist-import CLI application.

use clap::Parser;
use crossterm::{
    event::{Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use log::{debug, info, warn};
use playlist_import::api::{ApiClient, FormOutcome, episodes_path};
use playlist_import::batch::BatchEpisodeCreator;
use playlist_import::config::Config;
use playlist_import::error::{AppError, FormError, ValidationError};
use playlist_import::events::{self, AppEvent, EventReceiver, EventSender};
use playlist_import::headless::{ImportOutcome, import_playlist};
use playlist_import::history::{self, PlaylistRecord, RecentPlaylists};
use playlist_import::playlist::PlaylistFetcher;
use playlist_import::tui::{Action, App, draw, poll_event};
use ratatui::prelude::*;
use std::fs::{self, OpenOptions};
use std::io::{self, stdout};
use std::sync::Arc;
use std::time::Duration;

const RECENT_LIMIT: usize = 10;

/// Command-line arguments for the playlist-import application.
#[derive(Parser, Debug)]
#[command(
    name = "playlist-import",
    version,
    about = "Import YouTube playlists as podcast episodes",
    long_about = "Fetch a YouTube playlist through the podcast backend, pick videos in a TUI \
                  and create one episode per video."
)]
struct Args {
    /// Backend base URL (overrides config)
    #[arg(short, long)]
    server: Option<String>,

    /// Podcast that receives the created episodes (overrides config)
    #[arg(short, long)]
    podcast: Option<u64>,

    /// Session cookie sent with every request (overrides config)
    #[arg(short, long)]
    cookie: Option<String>,

    /// Log verbosity level: 0=error, 1=warn, 2=info, 3=debug, 4=trace
    #[arg(short, long, default_value_t = 1)]
    log: u8,

    /// Import this playlist without the TUI (requires --select)
    #[arg(long, requires = "select")]
    playlist: Option<String>,

    /// Videos to import in headless mode: "all" or positions like 1,3-5
    #[arg(long, requires = "playlist")]
    select: Option<String>,

    /// Create a single episode from a YouTube link and exit
    #[arg(long, conflicts_with = "playlist")]
    add: Option<String>,
}

impl Args {
    fn headless(&self) -> bool {
        self.playlist.is_some() || self.add.is_some()
    }
}

/// Initialize logging. While the TUI owns the terminal, logs go to a file.
fn init_logging(level: u8, headless: bool) {
    let log_level = match level {
        0 => log::LevelFilter::Error,
        1 => log::LevelFilter::Warn,
        2 => log::LevelFilter::Info,
        3 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    let mut builder = env_logger::Builder::new();
    builder
        .filter_level(log_level)
        .format_timestamp(None)
        .format_target(false);

    if !headless {
        let target: Box<dyn io::Write + Send> = match open_log_file() {
            Ok(file) => Box::new(file),
            Err(_) => Box::new(io::sink()),
        };
        builder.target(env_logger::Target::Pipe(target));
    }

    builder.init();
    debug!("Log level set to {:?}", log_level);
}

fn open_log_file() -> io::Result<fs::File> {
    let dir = history::data_dir()?;
    fs::create_dir_all(&dir)?;
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join("playlist-import.log"))
}

/// Initialize the terminal for TUI rendering.
fn init_terminal() -> io::Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    execute!(stdout(), EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout());
    Terminal::new(backend)
}

/// Restore the terminal to its original state.
fn restore_terminal() -> io::Result<()> {
    disable_raw_mode()?;
    execute!(stdout(), LeaveAlternateScreen)?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    init_logging(args.log, args.headless());

    if let Err(e) = Config::create_default_if_missing() {
        debug!("Could not write default config: {}", e);
    }

    let mut config = Config::load().unwrap_or_else(|e| {
        warn!("Failed to load config: {}. Using defaults.", e);
        Config::new()
    });

    // Merge config with CLI args
    if let Some(server) = &args.server {
        config.server_url = server.clone();
    }
    if args.podcast.is_some() {
        config.podcast_id = args.podcast;
    }
    if args.cookie.is_some() {
        config.session_cookie = args.cookie.clone();
    }

    info!("Using backend {}", config.server_url);
    let client = Arc::new(ApiClient::new(&config).map_err(AppError::from)?);

    if let Some(link) = &args.add {
        let podcast_id = require_podcast(config.podcast_id)?;
        if !add_episode(&client, podcast_id, link).await {
            std::process::exit(1);
        }
        return Ok(());
    }

    if let (Some(playlist_url), Some(select)) = (&args.playlist, &args.select) {
        let podcast_id = require_podcast(config.podcast_id)?;
        let mut out = stdout();
        let outcome = import_playlist(
            client.clone(),
            client.clone(),
            podcast_id,
            playlist_url,
            select,
            &mut out,
        )
        .await?;

        if let ImportOutcome::Finished(summary) = &outcome {
            let mut recent = RecentPlaylists::load().unwrap_or_default();
            recent.update(playlist_url, summary.title.as_deref(), summary.entry_count);
            if let Err(e) = recent.save() {
                warn!("Failed to save recent playlists: {}", e);
            }
        }
        if let ImportOutcome::FetchFailed(e) = &outcome {
            eprintln!("Error: could not load playlist: {}", e);
        }
        if !outcome.is_success() {
            std::process::exit(1);
        }
        return Ok(());
    }

    let mut recent = RecentPlaylists::load().unwrap_or_default();

    let mut terminal = init_terminal()?;

    let mut app = App::new(config.podcast_id, config.server_url.clone());
    app.set_recent(recent_records(&recent));
    if config.podcast_id.is_none() {
        app.set_status("No podcast configured; episode creation is disabled.");
    }

    let (tx, mut rx) = events::channel();
    let mut session = Session {
        fetcher: PlaylistFetcher::new(client.clone()),
        creator: BatchEpisodeCreator::new(client),
        recent: &mut recent,
        tx,
    };

    let result = run_app(&mut terminal, &mut app, &mut session, &mut rx).await;

    restore_terminal()?;

    result
}

fn require_podcast(podcast_id: Option<u64>) -> Result<u64, AppError> {
    podcast_id.ok_or_else(|| {
        AppError::InvalidInput(
            "no podcast configured; pass --podcast <ID> or set podcast_id in the config".into(),
        )
    })
}

/// Submit the episode form once. Returns whether the episode was created.
async fn add_episode(client: &ApiClient, podcast_id: u64, link: &str) -> bool {
    match client
        .submit_form(&episodes_path(podcast_id), &[("youtube_link", link)])
        .await
    {
        Ok(FormOutcome::Redirect(url)) | Ok(FormOutcome::Accepted { final_url: url }) => {
            println!("created {} ({})", link, url);
            true
        }
        Err(FormError::Validation(ValidationError::Fields(fields))) => {
            for (field, message) in &fields {
                eprintln!("{}: {}", field, message);
            }
            false
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            false
        }
    }
}

fn recent_records(recent: &RecentPlaylists) -> Vec<PlaylistRecord> {
    recent
        .get_recent(RECENT_LIMIT)
        .into_iter()
        .cloned()
        .collect()
}

/// Network handles and persistence owned by the event loop.
struct Session<'a> {
    fetcher: PlaylistFetcher,
    creator: BatchEpisodeCreator,
    recent: &'a mut RecentPlaylists,
    tx: EventSender,
}

impl Session<'_> {
    fn start_fetch(&mut self, app: &mut App, playlist_url: &str) {
        let ticket = self.fetcher.spawn(playlist_url, self.tx.clone());
        app.begin_fetch(ticket, playlist_url);
    }

    fn handle_event(&mut self, app: &mut App, event: AppEvent) {
        match event {
            AppEvent::PlaylistFetched {
                ticket,
                playlist_url,
                result,
            } => {
                let loaded = result.is_ok();
                if app.on_playlist_fetched(ticket, result) && loaded {
                    self.recent
                        .update(&playlist_url, app.store.playlist_title(), app.store.len());
                    if let Err(e) = self.recent.save() {
                        warn!("Failed to save recent playlists: {}", e);
                    }
                    app.set_recent(recent_records(&*self.recent));
                }
            }
            AppEvent::CreationFinished(task) => app.on_creation_finished(&task),
        }
    }
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    session: &mut Session<'_>,
    rx: &mut EventReceiver,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        // Apply finished background work before drawing
        while let Ok(event) = rx.try_recv() {
            session.handle_event(app, event);
        }

        terminal.draw(|f| draw(f, app))?;

        let Some(Event::Key(key)) = poll_event(Duration::from_millis(100))? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        // Any key dismisses the error popup
        if app.error_message.is_some() {
            app.clear_error();
            continue;
        }

        match app.handle_input(key) {
            Action::Quit => break,
            Action::FetchPlaylist(url) => session.start_fetch(app, &url),
            Action::OpenRecent(i) => {
                if let Some(record) = app.recent.get(i) {
                    let url = record.playlist_url.clone();
                    session.start_fetch(app, &url);
                }
            }
            Action::CreateSelected => {
                if let Some((podcast_id, selection)) = app.batch_request() {
                    session
                        .creator
                        .create_all(podcast_id, &selection, &session.tx);
                    app.batch_started(&selection);
                }
            }
            Action::None => {}
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
