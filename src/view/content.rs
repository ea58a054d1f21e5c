//! Track lists: search results and the playlist page

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, ListItem, Padding, Paragraph},
};

use crate::model::{ContentState, DashboardFocus, PlaylistPage, Track, UiState};
use super::utils::{format_duration, render_scrollable_list, track_label, truncate_string};

fn track_items<'a>(
    tracks: &'a [Track],
    selected: usize,
    focused: bool,
    playing_uri: Option<&str>,
    width: usize,
    accent: Color,
) -> Vec<ListItem<'a>> {
    tracks
        .iter()
        .enumerate()
        .map(|(i, track)| {
            let is_playing = playing_uri == Some(track.uri.as_str());
            let style = if i == selected && focused {
                Style::default().fg(accent).add_modifier(Modifier::BOLD)
            } else if is_playing {
                Style::default().fg(accent)
            } else {
                Style::default().fg(Color::White)
            };
            let duration = format_duration(track.duration_ms);
            let label = truncate_string(&track_label(track), width.saturating_sub(duration.len() + 2));
            ListItem::new(format!("{label:<w$}  {duration}", w = width.saturating_sub(duration.len() + 2)))
                .style(style)
        })
        .collect()
}

pub fn render_search_results(
    frame: &mut Frame,
    area: Rect,
    ui_state: &UiState,
    content_state: &ContentState,
    playing_uri: Option<&str>,
    accent: Color,
) {
    let focused = ui_state.focus == DashboardFocus::Results;
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Search Results ")
        .padding(Padding::horizontal(1))
        .border_style(if focused { Style::default().fg(accent) } else { Style::default() });

    if content_state.search_results.is_empty() {
        let hint = Paragraph::new("Press / to search for songs")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(hint, area);
        return;
    }

    let width = area.width.saturating_sub(4) as usize;
    let items = track_items(
        &content_state.search_results,
        ui_state.result_selected,
        focused,
        playing_uri,
        width,
        accent,
    );
    render_scrollable_list(frame, area, items, ui_state.result_selected, block);
}

pub fn render_playlist_page(
    frame: &mut Frame,
    area: Rect,
    ui_state: &UiState,
    page: Option<&PlaylistPage>,
    playing_uri: Option<&str>,
    accent: Color,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Playlist Songs ")
        .title_bottom(" Esc: back to library ")
        .padding(Padding::horizontal(1))
        .border_style(Style::default().fg(accent));

    let Some(page) = page.filter(|p| !p.loading) else {
        let loading = Paragraph::new("Loading...").block(block);
        frame.render_widget(loading, area);
        return;
    };

    if page.tracks.is_empty() {
        let empty = Paragraph::new("No songs in this playlist")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let width = area.width.saturating_sub(4) as usize;
    let items = track_items(&page.tracks, ui_state.track_selected, true, playing_uri, width, accent);
    render_scrollable_list(frame, area, items, ui_state.track_selected, block);
}
