//! Model module - Application state and data types
//!
//! - `types`: Data model projections and UI state
//! - `playback`: Reported playback state and player phase
//! - `content`: Fetched content with sequenced response application
//! - `requests`: Per-slot request ids
//! - `app_model`: Main application model with state management methods

mod types;
mod playback;
mod content;
mod requests;
mod app_model;

pub use types::{
    ArtistRef, DashboardFocus, Playlist, Route, Screen, Track, TrackInsight, UiState, UserProfile,
};

pub use playback::{PlaybackIcon, PlaybackInfo, PlaybackState, PlayerPhase, ReportedPlayback};

pub use content::{ContentState, PlaylistPage};

pub use requests::{RequestId, RequestSlot, RequestSlots};

pub use app_model::AppModel;
