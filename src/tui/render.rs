//! UI rendering functions for the TUI.

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
};

use super::state::App;
use super::types::{Focus, Screen};
use crate::entries::{EntryRow, EntryStatus, ViewState};
use crate::error::FetchError;

/// Draw the UI.
pub fn draw(frame: &mut Frame, app: &mut App) {
    let size = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Length(3), // URL bar
            Constraint::Min(0),    // Content (sidebar + main)
            Constraint::Length(3), // Footer
        ])
        .split(size);

    draw_header(frame, app, chunks[0]);
    draw_url_bar(frame, app, chunks[1]);

    let content_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(30), // Sidebar (fixed width)
            Constraint::Min(0),     // Main content
        ])
        .split(chunks[2]);

    draw_sidebar(frame, app, content_chunks[0]);

    match app.screen {
        Screen::Startup => draw_startup_main(frame, app, content_chunks[1]),
        Screen::Entries => draw_entries_main(frame, app, content_chunks[1]),
    }

    draw_footer(frame, app, chunks[3]);

    if let Some(error) = &app.error_message {
        draw_error_popup(frame, error);
    }

    if app.show_help {
        draw_help_modal(frame);
    }
}

fn draw_header(frame: &mut Frame, app: &App, area: Rect) {
    let podcast = match app.podcast_id {
        Some(id) => Span::styled(format!("[podcast {}]", id), Style::default().fg(Color::Green)),
        None => Span::styled("[no podcast]", Style::default().fg(Color::Red)),
    };

    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            "playlist-import",
            Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(
            format!("[{}]", app.server_url),
            Style::default().fg(Color::Cyan),
        ),
        Span::raw("  "),
        podcast,
        if app.loading.is_some() {
            Span::styled(
                format!("  {}", app.loading_message),
                Style::default().fg(Color::Yellow),
            )
        } else {
            Span::raw("")
        },
    ]))
    .block(Block::default().borders(Borders::ALL));

    frame.render_widget(header, area);
}

fn draw_url_bar(frame: &mut Frame, app: &App, area: Rect) {
    let border_style = if app.url_focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let url_text = if app.url_input.is_empty() && !app.url_focused {
        "Press '/' to enter a playlist URL..."
    } else {
        &app.url_input
    };

    let input = Paragraph::new(url_text)
        .style(if app.url_focused {
            Style::default().fg(Color::White)
        } else {
            Style::default().fg(Color::DarkGray)
        })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Playlist URL")
                .border_style(border_style),
        );

    frame.render_widget(input, area);

    if app.url_focused {
        frame.set_cursor_position((url_cursor_x(area, &app.url_input), area.y + 1));
    }
}

/// Cursor column after the typed URL, kept inside the bar's borders.
fn url_cursor_x(area: Rect, input: &str) -> u16 {
    let typed = u16::try_from(input.chars().count()).unwrap_or(u16::MAX);
    let offset = typed.min(area.width.saturating_sub(2));
    area.x.saturating_add(offset).saturating_add(1)
}

fn draw_sidebar(frame: &mut Frame, app: &mut App, area: Rect) {
    let border_style = if app.focus == Focus::Sidebar {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    if app.recent.is_empty() {
        let empty = Paragraph::new("No recent playlists")
            .style(Style::default().fg(Color::DarkGray))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Recent")
                    .border_style(border_style),
            );
        frame.render_widget(empty, area);
    } else {
        let items: Vec<ListItem> = app
            .recent
            .iter()
            .map(|record| ListItem::new(truncate(&record.to_display(), 24)))
            .collect();

        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Recent")
                    .border_style(border_style),
            )
            .highlight_style(
                Style::default()
                    .bg(Color::DarkGray)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("> ");

        frame.render_stateful_widget(list, area, &mut app.recent_list_state);
    }
}

fn draw_startup_main(frame: &mut Frame, _app: &App, area: Rect) {
    let welcome = Paragraph::new(
        "Welcome to playlist-import!\n\n\
        - Type a YouTube playlist URL and press Enter\n\
        - Or pick a playlist from Recent on the left\n\
        - Check videos with Space and press c to create episodes\n\n\
        Keyboard shortcuts:\n\
        - j/k or arrows: Navigate\n\
        - Tab: Switch panel\n\
        - ?: Help\n\
        - q: Quit",
    )
    .block(Block::default().borders(Borders::ALL).title("Welcome"))
    .wrap(Wrap { trim: true });

    frame.render_widget(welcome, area);
}

fn draw_entries_main(frame: &mut Frame, app: &mut App, area: Rect) {
    match app.store.state() {
        ViewState::Failed(error) => {
            draw_fetch_error(frame, error, area);
            return;
        }
        ViewState::Empty => {
            let empty = Paragraph::new("No videos found.")
                .style(Style::default().fg(Color::DarkGray))
                .block(Block::default().borders(Borders::ALL).title("Videos"));
            frame.render_widget(empty, area);
            return;
        }
        ViewState::Idle | ViewState::Loaded => {}
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
        .split(area);

    let items: Vec<ListItem> = app.store.rows().map(entry_item).collect();

    let title = format!(
        "{} ({} checked, {} pending, {} created)",
        app.store.playlist_title().unwrap_or("Videos"),
        app.checked_count(),
        app.store.pending_count(),
        app.store.created_count()
    );

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, chunks[0], &mut app.entry_list_state);

    let details = app
        .entry_list_state
        .selected()
        .and_then(|i| app.store.row_at(i))
        .map(entry_details)
        .unwrap_or_default();

    let details_widget = Paragraph::new(details)
        .block(Block::default().borders(Borders::ALL).title("Details"))
        .wrap(Wrap { trim: true });

    frame.render_widget(details_widget, chunks[1]);
}

fn entry_item(row: &EntryRow) -> ListItem<'static> {
    let checkbox = if row.checked { "[x] " } else { "[ ] " };
    let (marker, style) = match row.status {
        EntryStatus::Idle => ("  ", Style::default()),
        EntryStatus::Pending => ("… ", Style::default().fg(Color::Yellow)),
        EntryStatus::Created => ("✓ ", Style::default().fg(Color::Green)),
    };

    ListItem::new(Line::from(vec![
        Span::raw(checkbox),
        Span::styled(marker, style),
        Span::styled(row.entry.to_display(), style),
    ]))
}

fn entry_details(row: &EntryRow) -> String {
    let status = match row.status {
        EntryStatus::Idle => "not created",
        EntryStatus::Pending => "creating...",
        EntryStatus::Created => "episode created",
    };
    let mut details = format!(
        "Id: {}\nURL: {}\nStatus: {}",
        row.entry.id, row.entry.url, status
    );
    if let Some(thumbnail) = &row.entry.thumbnail_url {
        details.push_str(&format!("\nThumbnail: {}", thumbnail));
    }
    if let Some(description) = &row.entry.description {
        details.push_str(&format!("\n\n{}", description));
    }
    details
}

fn draw_fetch_error(frame: &mut Frame, error: &FetchError, area: Rect) {
    let message = match error {
        FetchError::Status { status, payload } => {
            format!("Could not load playlist ({}).\n\n{}", status, payload)
        }
        other => format!("Could not load playlist.\n\n{}", other),
    };

    let widget = Paragraph::new(format!("{}\n\nPress r to retry.", message))
        .style(Style::default().fg(Color::Red))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Error")
                .border_style(Style::default().fg(Color::Red)),
        )
        .wrap(Wrap { trim: true });

    frame.render_widget(widget, area);
}

fn draw_footer(frame: &mut Frame, app: &App, area: Rect) {
    let help_text = if app.url_focused {
        "[Enter] fetch  [Esc] cancel  [?] help"
    } else if app.focus == Focus::Sidebar {
        "[/] url  [Tab] switch  [↑↓] navigate  [Enter] open  [?] help  [q] quit"
    } else {
        match app.screen {
            Screen::Startup => "[/] url  [Tab] switch  [?] help  [q] quit",
            Screen::Entries if app.store.batch_enabled() => {
                "[/] url  [↑↓] navigate  [Space] check  [a] all  [c] create  [r] reload  [?] help  [q] quit"
            }
            Screen::Entries => "[/] url  [Tab] switch  [r] reload  [?] help  [q] quit",
        }
    };

    let line = match &app.status_message {
        Some(status) => Line::from(vec![
            Span::styled(status.clone(), Style::default().fg(Color::Yellow)),
            Span::raw("  "),
            Span::styled(help_text, Style::default().fg(Color::DarkGray)),
        ]),
        None => Line::from(Span::styled(help_text, Style::default().fg(Color::DarkGray))),
    };

    let footer = Paragraph::new(line).block(Block::default().borders(Borders::ALL));

    frame.render_widget(footer, area);
}

fn draw_error_popup(frame: &mut Frame, error: &str) {
    let area = centered_rect(60, 20, frame.area());
    frame.render_widget(Clear, area);

    let popup = Paragraph::new(error)
        .style(Style::default().fg(Color::Red))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Error")
                .border_style(Style::default().fg(Color::Red)),
        )
        .wrap(Wrap { trim: true });

    frame.render_widget(popup, area);
}

fn draw_help_modal(frame: &mut Frame) {
    let area = centered_rect(70, 80, frame.area());
    frame.render_widget(Clear, area);

    let help_text = Paragraph::new(HELP_TEXT)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Help")
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .wrap(Wrap { trim: false });

    frame.render_widget(help_text, area);
}

const HELP_TEXT: &str = "\
Global Commands
───────────────
  ?           Show/hide this help
  Ctrl+C      Force quit
  Ctrl+Q      Force quit
  /           Focus URL bar
  Tab         Switch panel focus
  q           Quit

URL Bar
───────
  Enter       Fetch playlist
  Esc         Cancel
  Backspace   Delete character

Videos
──────
  j / ↓       Move down
  k / ↑       Move up
  Space       Check/uncheck video
  a           Check/uncheck all
  c           Create episodes for checked videos
  r           Reload playlist

Sidebar (Recent)
────────────────
  Enter       Reload playlist from history

Press ? to close";

fn truncate(text: &str, max: usize) -> String {
    // Count chars to avoid slicing through UTF-8 sequences
    if text.chars().count() > max {
        format!("{}...", text.chars().take(max - 3).collect::<String>())
    } else {
        text.to_string()
    }
}

/// Helper function to create a centered rect.
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
