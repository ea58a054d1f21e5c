//! Core type definitions for the application

/// An artist credited on a track
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ArtistRef {
    pub id: String,
    pub name: String,
}

/// A playable track, as projected from the Web API
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Track {
    pub id: String,
    pub name: String,
    pub uri: String,
    pub album_cover_url: String,
    pub artists: Vec<ArtistRef>,
    pub preview_url: Option<String>,
    pub duration_ms: u32,
}

impl Track {
    /// Artist names joined for display, e.g. "Daft Punk, Pharrell Williams"
    pub fn artist_names(&self) -> String {
        self.artists
            .iter()
            .map(|a| a.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// The first credited artist with a usable id, used for genre lookups
    pub fn primary_artist_id(&self) -> Option<&str> {
        self.artists
            .first()
            .map(|a| a.id.as_str())
            .filter(|id| !id.is_empty())
    }
}

/// A user's playlist
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Playlist {
    pub id: String,
    pub name: String,
    pub cover_image_url: Option<String>,
}

impl Playlist {
    pub fn uri(&self) -> String {
        format!("spotify:playlist:{}", self.id)
    }
}

/// The logged-in user's profile
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UserProfile {
    pub id: String,
    pub display_name: Option<String>,
}

impl UserProfile {
    pub fn greeting_name(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or(&self.id)
    }
}

/// Which screen is shown once a token is present
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Route {
    Dashboard,
    Playlist { id: String },
}

/// What the top-level view renders
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Screen {
    Login,
    Dashboard,
    Playlist { id: String },
}

/// Focusable sections of the dashboard
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum DashboardFocus {
    #[default]
    Search,
    Playlists,
    Results,
}

impl DashboardFocus {
    pub fn next(self) -> Self {
        match self {
            Self::Search => Self::Playlists,
            Self::Playlists => Self::Results,
            Self::Results => Self::Search,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Self::Search => Self::Results,
            Self::Playlists => Self::Search,
            Self::Results => Self::Playlists,
        }
    }
}

/// Cosmetic data about the current track's primary artist
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TrackInsight {
    pub track_uri: String,
    pub genres: Vec<String>,
    pub summary: Option<String>,
}

/// Interaction state of the screens
#[derive(Clone, Debug)]
pub struct UiState {
    pub route: Route,
    pub focus: DashboardFocus,
    pub auth_url: String,
    pub login_input: String,
    pub login_error: Option<String>,
    pub search_query: String,
    pub playlist_selected: usize,
    pub result_selected: usize,
    pub track_selected: usize,
    pub alert: Option<String>,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            route: Route::Dashboard,
            focus: DashboardFocus::default(),
            auth_url: String::new(),
            login_input: String::new(),
            login_error: None,
            search_query: String::new(),
            playlist_selected: 0,
            result_selected: 0,
            track_selected: 0,
            alert: None,
        }
    }
}
