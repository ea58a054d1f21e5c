//! Login screen: authorization link and the redirect URL input

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Padding, Paragraph, Wrap},
};

use crate::model::UiState;
use super::utils::centered_rect;

pub fn render_login(frame: &mut Frame, ui_state: &UiState, accent: Color) {
    let area = centered_rect(frame.area(), 80, 18);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Welcome
            Constraint::Min(6),    // Instructions + URL
            Constraint::Length(3), // Redirect input
            Constraint::Length(1), // Status
        ])
        .split(area);

    let welcome = Paragraph::new(Line::from(vec![
        Span::styled("Welcome to ", Style::default().fg(Color::White)),
        Span::styled("MedMusic", Style::default().fg(accent).add_modifier(Modifier::BOLD)),
    ]))
    .centered()
    .block(Block::default().borders(Borders::ALL));
    frame.render_widget(welcome, chunks[0]);

    let instructions = Paragraph::new(vec![
        Line::from("Press Ctrl+O to log in with Spotify in your browser."),
        Line::from("After approving, paste the address you were redirected to below and press Enter."),
        Line::from(""),
        Line::from(Span::styled(ui_state.auth_url.as_str(), Style::default().fg(Color::DarkGray))),
    ])
    .wrap(Wrap { trim: true })
    .block(Block::default().padding(Padding::horizontal(1)));
    frame.render_widget(instructions, chunks[1]);

    render_redirect_input(frame, chunks[2], ui_state, accent);

    if let Some(error) = &ui_state.login_error {
        let status = Paragraph::new(error.as_str()).style(Style::default().fg(Color::Red));
        frame.render_widget(status, chunks[3]);
    }
}

fn render_redirect_input(frame: &mut Frame, area: Rect, ui_state: &UiState, accent: Color) {
    let (text, style) = if ui_state.login_input.is_empty() {
        ("http://localhost:5173/#access_token=...", Style::default().fg(Color::DarkGray))
    } else {
        (ui_state.login_input.as_str(), Style::default().fg(Color::White))
    };

    let input = Paragraph::new(text).style(style).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Redirect URL ")
            .padding(Padding::horizontal(1))
            .border_style(Style::default().fg(accent)),
    );
    frame.render_widget(input, area);
}
