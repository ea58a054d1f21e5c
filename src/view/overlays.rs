//! Alert dialog overlay

use ratatui::{
    Frame,
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use super::utils::centered_rect;

pub fn render_alert(frame: &mut Frame, message: &str) {
    let area = frame.area();

    let popup_width = 52.min(area.width.saturating_sub(4));
    let inner_width = popup_width.saturating_sub(4).max(1) as usize;

    // Wrapped message lines plus the two borders
    let line_count = message.chars().count().div_ceil(inner_width).max(1) as u16;
    let popup_area = centered_rect(area, popup_width, line_count + 2);

    frame.render_widget(Clear, popup_area);

    let alert = Paragraph::new(message.to_string())
        .style(Style::default().fg(Color::Yellow))
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Yellow))
                .title(" Alert (Enter to dismiss) ")
                .title_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
                .style(Style::default().bg(Color::Black)),
        );

    frame.render_widget(alert, popup_area);
}
