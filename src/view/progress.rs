//! Player bar rendering

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::Line,
    widgets::{Block, Borders, Gauge, Paragraph},
};

use crate::model::PlaybackInfo;
use super::utils::format_duration;

pub fn status_text(playback: &PlaybackInfo) -> String {
    match &playback.track {
        Some(track) => format!(
            " {} {} | {} ",
            playback.icon.glyph(),
            track.name,
            track.artist_names()
        ),
        None => format!(" {} ", playback.phase.label()),
    }
}

pub fn render_player_bar(frame: &mut Frame, area: Rect, playback: &PlaybackInfo, accent: Color) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Gauge
            Constraint::Length(1), // Genres + summary
        ])
        .split(area);

    let time_str = format!(
        "{} / {}",
        format_duration(playback.progress_ms),
        format_duration(playback.duration_ms)
    );

    let progress_ratio = if playback.duration_ms > 0 {
        (playback.progress_ms as f64 / playback.duration_ms as f64).clamp(0.0, 1.0)
    } else {
        0.0
    };

    let device_info = if playback.device_name.is_empty() {
        format!(" {} ", playback.phase.label())
    } else {
        format!(" {} | {} ", playback.device_name, playback.phase.label())
    };

    let gauge = Gauge::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(status_text(playback))
                .title_bottom(Line::from(device_info).right_aligned()),
        )
        .gauge_style(Style::default().fg(accent))
        .ratio(progress_ratio)
        .label(time_str);
    frame.render_widget(gauge, chunks[0]);

    let mut insight = playback.genres.join(", ");
    if let Some(summary) = &playback.summary {
        if !insight.is_empty() {
            insight.push_str(" | ");
        }
        insight.push_str(summary);
    }
    let insight = Paragraph::new(format!(" {}", insight)).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(insight, chunks[1]);
}
