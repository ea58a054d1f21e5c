//! Utility functions for rendering UI components

use ratatui::{
    Frame,
    layout::Rect,
    style::Style,
    widgets::{Block, List, ListItem, ListState},
};

use crate::model::Track;

pub fn render_scrollable_list(
    frame: &mut Frame,
    area: Rect,
    items: Vec<ListItem>,
    selected_index: usize,
    block: Block,
) {
    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default()); // Highlight handled by item styles

    let mut list_state = ListState::default();
    list_state.select(Some(selected_index));

    frame.render_stateful_widget(list, area, &mut list_state);
}

pub fn format_duration(ms: u32) -> String {
    let total_seconds = ms / 1000;
    let minutes = total_seconds / 60;
    let seconds = total_seconds % 60;
    format!("{}:{:02}", minutes, seconds)
}

pub fn truncate_string(s: &str, max_width: usize) -> String {
    if s.chars().count() > max_width {
        let truncated: String = s.chars().take(max_width.saturating_sub(3)).collect();
        format!("{}...", truncated)
    } else {
        s.to_string()
    }
}

/// "name - artist, artist"
pub fn track_label(track: &Track) -> String {
    format!("{} - {}", track.name, track.artist_names())
}

/// A `width` x `height` rectangle centered in `area`, clamped to fit.
pub fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ArtistRef;

    #[test]
    fn durations_pad_seconds() {
        assert_eq!(format_duration(0), "0:00");
        assert_eq!(format_duration(65_000), "1:05");
        assert_eq!(format_duration(3_599_999), "59:59");
    }

    #[test]
    fn long_strings_are_truncated() {
        assert_eq!(truncate_string("short", 10), "short");
        assert_eq!(truncate_string("a very long title", 10), "a very ...");
    }

    #[test]
    fn track_label_lists_artists() {
        let track = Track {
            name: "Get Lucky".into(),
            artists: vec![
                ArtistRef { id: "1".into(), name: "Daft Punk".into() },
                ArtistRef { id: "2".into(), name: "Pharrell Williams".into() },
            ],
            ..Track::default()
        };
        assert_eq!(track_label(&track), "Get Lucky - Daft Punk, Pharrell Williams");
    }

    #[test]
    fn centered_rect_fits_inside() {
        let area = Rect::new(0, 0, 20, 10);
        assert_eq!(centered_rect(area, 10, 4), Rect::new(5, 3, 10, 4));
        assert_eq!(centered_rect(area, 50, 50), area);
    }
}
