//! View module - UI rendering
//!
//! This module handles all UI rendering for the application using ratatui.
//! It is organized into submodules by component type:
//!
//! - `utils`: Shared utility functions (formatting, scrollable lists)
//! - `login`: Login screen
//! - `layout`: Dashboard top bar and playlist sidebar
//! - `content`: Search results and the playlist page
//! - `progress`: Player bar
//! - `overlays`: Alert dialog

mod utils;
mod login;
mod layout;
mod content;
mod progress;
mod overlays;

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::Color,
};

use crate::model::{ContentState, PlaybackInfo, Screen, UiState};

pub use utils::format_duration;

/// Everything a frame needs, snapshotted from the model
pub struct Snapshot {
    pub screen: Screen,
    pub playback: PlaybackInfo,
    pub ui_state: UiState,
    pub content_state: ContentState,
    pub accent: Color,
}

pub struct AppView;

impl AppView {
    pub fn render(frame: &mut Frame, snapshot: &Snapshot) {
        match &snapshot.screen {
            Screen::Login => login::render_login(frame, &snapshot.ui_state, snapshot.accent),
            Screen::Dashboard | Screen::Playlist { .. } => Self::render_main(frame, snapshot),
        }

        if let Some(message) = &snapshot.ui_state.alert {
            overlays::render_alert(frame, message);
        }
    }

    fn render_main(frame: &mut Frame, snapshot: &Snapshot) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Search bar + greeting
                Constraint::Min(0),    // Sidebar + content
                Constraint::Length(4), // Player bar
            ])
            .split(frame.area());

        let Snapshot { ui_state, content_state, playback, accent, .. } = snapshot;

        layout::render_top_bar(frame, chunks[0], ui_state, content_state, *accent);

        let main_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(30), // Playlists
                Constraint::Percentage(70), // Results or playlist page
            ])
            .split(chunks[1]);

        layout::render_sidebar(frame, main_chunks[0], ui_state, content_state, *accent);
        Self::render_content(frame, main_chunks[1], snapshot);

        progress::render_player_bar(frame, chunks[2], playback, *accent);
    }

    fn render_content(frame: &mut Frame, area: Rect, snapshot: &Snapshot) {
        let playing_uri = snapshot.playback.track.as_ref().map(|t| t.uri.as_str());
        match &snapshot.screen {
            Screen::Playlist { .. } => content::render_playlist_page(
                frame,
                area,
                &snapshot.ui_state,
                snapshot.content_state.playlist_page.as_ref(),
                playing_uri,
                snapshot.accent,
            ),
            _ => content::render_search_results(
                frame,
                area,
                &snapshot.ui_state,
                &snapshot.content_state,
                playing_uri,
                snapshot.accent,
            ),
        }
    }
}
