//! Dashboard layout pieces (top bar, playlist sidebar)

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, ListItem, Padding, Paragraph},
};

use crate::model::{ContentState, DashboardFocus, UiState};
use super::utils::render_scrollable_list;

pub fn greeting(content_state: &ContentState) -> String {
    match &content_state.profile {
        Some(profile) => format!("Welcome, {}!", profile.greeting_name()),
        None => "Loading...".to_string(),
    }
}

pub fn render_top_bar(
    frame: &mut Frame,
    area: Rect,
    ui_state: &UiState,
    content_state: &ContentState,
    accent: Color,
) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(0),     // Search input
            Constraint::Length(32), // Greeting
        ])
        .split(area);

    let focused = ui_state.focus == DashboardFocus::Search;
    let search_text = if ui_state.search_query.is_empty() {
        "Type to search..."
    } else {
        &ui_state.search_query
    };

    let search = Paragraph::new(search_text)
        .style(if focused { Style::default().fg(accent) } else { Style::default().fg(Color::White) })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Search ")
                .padding(Padding::horizontal(1))
                .border_style(if focused { Style::default().fg(accent) } else { Style::default() }),
        );
    frame.render_widget(search, chunks[0]);

    let welcome = Paragraph::new(greeting(content_state))
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::ALL).padding(Padding::horizontal(1)));
    frame.render_widget(welcome, chunks[1]);
}

pub fn render_sidebar(
    frame: &mut Frame,
    area: Rect,
    ui_state: &UiState,
    content_state: &ContentState,
    accent: Color,
) {
    let focused = ui_state.focus == DashboardFocus::Playlists;

    let items: Vec<ListItem> = content_state
        .playlists
        .iter()
        .enumerate()
        .map(|(i, playlist)| {
            let style = if i == ui_state.playlist_selected && focused {
                Style::default().fg(accent).add_modifier(Modifier::BOLD)
            } else if i == ui_state.playlist_selected {
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };
            ListItem::new(playlist.name.clone()).style(style)
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Your Playlists ")
        .padding(Padding::horizontal(1))
        .border_style(if focused { Style::default().fg(accent) } else { Style::default() });

    render_scrollable_list(frame, area, items, ui_state.playlist_selected, block);
}
