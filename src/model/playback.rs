//! Playback-related types and state management

use std::time::Instant;

use super::types::Track;

/// Last state reported by the playback engine.
///
/// Replaced as a whole on every notification; fields are never merged.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PlaybackState {
    pub is_playing: bool,
    pub position_ms: u32,
    pub duration_ms: u32,
    pub current_track: Option<Track>,
}

impl PlaybackState {
    pub fn track_uri(&self) -> Option<&str> {
        self.current_track.as_ref().map(|t| t.uri.as_str())
    }
}

/// Playback engine lifecycle
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum PlayerPhase {
    #[default]
    Uninitialized,
    Connecting,
    Ready,
    PlayingTrack,
    PausedTrack,
}

impl PlayerPhase {
    pub fn label(self) -> &'static str {
        match self {
            Self::Uninitialized => "Player offline",
            Self::Connecting => "Connecting player...",
            Self::Ready => "Player ready",
            Self::PlayingTrack => "Playing",
            Self::PausedTrack => "Paused",
        }
    }
}

/// The play/pause control shown in the player bar
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackIcon {
    Playing,
    Paused,
}

impl PlaybackIcon {
    pub fn from_state(state: &PlaybackState) -> Self {
        if state.is_playing { Self::Playing } else { Self::Paused }
    }

    pub fn glyph(self) -> &'static str {
        match self {
            Self::Playing => "▶",
            Self::Paused => "⏸",
        }
    }
}

/// A reported state plus the instant it arrived, for smooth progress display
#[derive(Clone, Debug)]
pub struct ReportedPlayback {
    pub state: PlaybackState,
    pub reported_at: Instant,
}

impl Default for ReportedPlayback {
    fn default() -> Self {
        Self {
            state: PlaybackState::default(),
            reported_at: Instant::now(),
        }
    }
}

impl ReportedPlayback {
    pub fn replace(&mut self, state: PlaybackState) {
        self.state = state;
        self.reported_at = Instant::now();
    }

    /// Position extrapolated from the last report while playing.
    pub fn current_position_ms(&self) -> u32 {
        let state = &self.state;
        if state.is_playing && state.duration_ms > 0 {
            let elapsed = self.reported_at.elapsed().as_millis() as u32;
            state.position_ms.saturating_add(elapsed).min(state.duration_ms)
        } else {
            state.position_ms.min(state.duration_ms)
        }
    }
}

/// Complete playback information for rendering the player bar
#[derive(Clone, Debug)]
pub struct PlaybackInfo {
    pub track: Option<Track>,
    pub progress_ms: u32,
    pub duration_ms: u32,
    pub icon: PlaybackIcon,
    pub phase: PlayerPhase,
    pub device_name: String,
    pub genres: Vec<String>,
    pub summary: Option<String>,
}
