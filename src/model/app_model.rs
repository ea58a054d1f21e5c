//! Main application model with state management

use std::sync::Arc;
use tokio::sync::{Mutex, watch};
use ratatui::style::Color;

use super::content::{ContentState, PlaylistPage};
use super::playback::{PlaybackIcon, PlaybackInfo, PlaybackState, PlayerPhase};
use super::requests::{RequestId, RequestSlot};
use super::types::{
    DashboardFocus, Playlist, Route, Screen, Track, TrackInsight, UiState, UserProfile,
};
use crate::playback::{PlaybackMachine, ProviderEvent};
use crate::session::{Location, SessionStore};
use crate::theme::{self, Accent};

/// Player lifecycle plus the cosmetic data derived from the current track
#[derive(Debug, Default)]
struct PlayerState {
    machine: PlaybackMachine,
    device_name: String,
    insight: Option<TrackInsight>,
    insight_request: RequestSlot,
    accent: Accent,
}

/// Main application model containing all state
pub struct AppModel {
    session: Arc<Mutex<SessionStore>>,
    /// Mirrors the session token for readers that cannot await
    token_tx: watch::Sender<Option<String>>,
    player: Arc<Mutex<PlayerState>>,
    pub ui_state: Arc<Mutex<UiState>>,
    pub content_state: Arc<Mutex<ContentState>>,
    pub should_quit: Arc<Mutex<bool>>,
}

impl AppModel {
    pub fn new(session: SessionStore, auth_url: String) -> Self {
        let ui_state = UiState { auth_url, ..UiState::default() };
        let (token_tx, _) = watch::channel(session.token().map(str::to_string));
        Self {
            session: Arc::new(Mutex::new(session)),
            token_tx,
            player: Arc::new(Mutex::new(PlayerState::default())),
            ui_state: Arc::new(Mutex::new(ui_state)),
            content_state: Arc::new(Mutex::new(ContentState::default())),
            should_quit: Arc::new(Mutex::new(false)),
        }
    }

    // ========================================================================
    // Session
    // ========================================================================

    pub async fn token(&self) -> Option<String> {
        self.session.lock().await.token().map(str::to_string)
    }

    pub async fn is_logged_in(&self) -> bool {
        self.session.lock().await.token().is_some()
    }

    /// Follows the session token as new ones are captured.
    pub fn token_watch(&self) -> watch::Receiver<Option<String>> {
        self.token_tx.subscribe()
    }

    /// Run token extraction on a landed location.
    pub async fn capture_location(&self, location: &mut Location) -> bool {
        let mut session = self.session.lock().await;
        let captured = session.capture_from_location(location);
        if captured {
            self.token_tx.send_replace(session.token().map(str::to_string));
        }
        captured
    }

    pub async fn screen(&self) -> Screen {
        if !self.is_logged_in().await {
            return Screen::Login;
        }
        match &self.ui_state.lock().await.route {
            Route::Dashboard => Screen::Dashboard,
            Route::Playlist { id } => Screen::Playlist { id: id.clone() },
        }
    }

    // ========================================================================
    // UI state
    // ========================================================================

    pub async fn get_ui_state(&self) -> UiState {
        self.ui_state.lock().await.clone()
    }

    pub async fn set_route(&self, route: Route) {
        self.ui_state.lock().await.route = route;
    }

    pub async fn append_to_login_input(&self, c: char) {
        let mut state = self.ui_state.lock().await;
        state.login_input.push(c);
        state.login_error = None;
    }

    pub async fn append_str_to_login_input(&self, text: &str) {
        let mut state = self.ui_state.lock().await;
        state.login_input.push_str(text.trim());
        state.login_error = None;
    }

    pub async fn backspace_login_input(&self) {
        self.ui_state.lock().await.login_input.pop();
    }

    /// Take the pasted redirect URL, leaving the input empty.
    pub async fn take_login_input(&self) -> String {
        std::mem::take(&mut self.ui_state.lock().await.login_input)
    }

    pub async fn set_login_error(&self, message: Option<String>) {
        self.ui_state.lock().await.login_error = message;
    }

    pub async fn append_to_search(&self, c: char) {
        self.ui_state.lock().await.search_query.push(c);
    }

    pub async fn backspace_search(&self) {
        self.ui_state.lock().await.search_query.pop();
    }

    pub async fn clear_search(&self) {
        self.ui_state.lock().await.search_query.clear();
    }

    pub async fn get_search_query(&self) -> String {
        self.ui_state.lock().await.search_query.clone()
    }

    pub async fn cycle_focus_forward(&self) {
        let mut state = self.ui_state.lock().await;
        state.focus = state.focus.next();
    }

    pub async fn cycle_focus_backward(&self) {
        let mut state = self.ui_state.lock().await;
        state.focus = state.focus.prev();
    }

    pub async fn set_focus(&self, focus: DashboardFocus) {
        self.ui_state.lock().await.focus = focus;
    }

    pub async fn move_selection_up(&self) {
        let mut guard = self.ui_state.lock().await;
        let state = &mut *guard;
        let on_page = matches!(state.route, Route::Playlist { .. });
        let index = match state.focus {
            _ if on_page => &mut state.track_selected,
            DashboardFocus::Playlists => &mut state.playlist_selected,
            DashboardFocus::Results => &mut state.result_selected,
            DashboardFocus::Search => return,
        };
        *index = index.saturating_sub(1);
    }

    pub async fn move_selection_down(&self) {
        let content = self.content_state.lock().await;
        let mut guard = self.ui_state.lock().await;
        let state = &mut *guard;
        let on_page = matches!(state.route, Route::Playlist { .. });
        let (index, len) = match state.focus {
            _ if on_page => {
                let len = content.playlist_page.as_ref().map(|p| p.tracks.len()).unwrap_or(0);
                (&mut state.track_selected, len)
            }
            DashboardFocus::Playlists => (&mut state.playlist_selected, content.playlists.len()),
            DashboardFocus::Results => (&mut state.result_selected, content.search_results.len()),
            DashboardFocus::Search => return,
        };
        if *index < len.saturating_sub(1) {
            *index += 1;
        }
    }

    /// Raise the blocking alert dialog.
    pub async fn set_alert(&self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(alert = %message, "Alert raised");
        self.ui_state.lock().await.alert = Some(message);
    }

    pub async fn clear_alert(&self) {
        self.ui_state.lock().await.alert = None;
    }

    pub async fn has_alert(&self) -> bool {
        self.ui_state.lock().await.alert.is_some()
    }

    pub async fn get_alert(&self) -> Option<String> {
        self.ui_state.lock().await.alert.clone()
    }

    // ========================================================================
    // Content
    // ========================================================================

    pub async fn get_content_state(&self) -> ContentState {
        self.content_state.lock().await.clone()
    }

    /// Issue request ids for the dashboard's profile and playlists fetches.
    pub async fn begin_dashboard_fetch(&self) -> (RequestId, RequestId) {
        let mut content = self.content_state.lock().await;
        let profile = content.requests.profile.begin();
        let playlists = content.requests.playlists.begin();
        (profile, playlists)
    }

    pub async fn apply_profile(&self, id: RequestId, profile: Option<UserProfile>) -> bool {
        self.content_state.lock().await.apply_profile(id, profile)
    }

    pub async fn apply_playlists(&self, id: RequestId, playlists: Vec<Playlist>) -> bool {
        let applied = self.content_state.lock().await.apply_playlists(id, playlists);
        if applied {
            self.ui_state.lock().await.playlist_selected = 0;
        }
        applied
    }

    pub async fn begin_search(&self) -> RequestId {
        self.content_state.lock().await.requests.search.begin()
    }

    pub async fn apply_search_results(&self, id: RequestId, tracks: Vec<Track>) -> bool {
        let applied = self.content_state.lock().await.apply_search_results(id, tracks);
        if applied {
            self.ui_state.lock().await.result_selected = 0;
        }
        applied
    }

    pub async fn open_playlist(&self, playlist_id: &str) -> RequestId {
        let id = self.content_state.lock().await.open_playlist(playlist_id);
        let mut state = self.ui_state.lock().await;
        state.route = Route::Playlist { id: playlist_id.to_string() };
        state.track_selected = 0;
        id
    }

    pub async fn close_playlist(&self) {
        self.content_state.lock().await.close_playlist();
        self.ui_state.lock().await.route = Route::Dashboard;
    }

    pub async fn apply_playlist_tracks(&self, id: RequestId, tracks: Vec<Track>) -> bool {
        self.content_state.lock().await.apply_playlist_tracks(id, tracks)
    }

    pub async fn get_playlist_page(&self) -> Option<PlaylistPage> {
        self.content_state.lock().await.playlist_page.clone()
    }

    pub async fn get_selected_playlist(&self) -> Option<Playlist> {
        let index = self.ui_state.lock().await.playlist_selected;
        self.content_state.lock().await.playlists.get(index).cloned()
    }

    pub async fn get_selected_result(&self) -> Option<Track> {
        let index = self.ui_state.lock().await.result_selected;
        self.content_state.lock().await.search_results.get(index).cloned()
    }

    /// The selected track on the playlist page with its playlist id.
    pub async fn get_selected_page_track(&self) -> Option<(String, Track)> {
        let index = self.ui_state.lock().await.track_selected;
        let content = self.content_state.lock().await;
        let page = content.playlist_page.as_ref()?;
        page.tracks.get(index).map(|t| (page.id.clone(), t.clone()))
    }

    pub async fn find_known_track(&self, uri: &str) -> Option<Track> {
        self.content_state.lock().await.known_track(uri).cloned()
    }

    // ========================================================================
    // Player
    // ========================================================================

    pub async fn set_device_name(&self, name: String) {
        self.player.lock().await.device_name = name;
    }

    pub async fn begin_connecting(&self) {
        self.player.lock().await.machine.begin_connecting();
    }

    /// Fold an engine notification into the player. Returns the new track
    /// when the notification switched tracks.
    pub async fn apply_player_event(&self, event: ProviderEvent) -> Option<Track> {
        self.player.lock().await.machine.apply(event)
    }

    pub async fn device_id(&self) -> Option<String> {
        self.player.lock().await.machine.device_id().map(str::to_string)
    }

    pub async fn player_phase(&self) -> PlayerPhase {
        self.player.lock().await.machine.phase()
    }

    pub async fn playback_state(&self) -> PlaybackState {
        self.player.lock().await.machine.state().clone()
    }

    /// Start a new insight for `track_uri`, superseding any in flight.
    pub async fn begin_insight(&self, track_uri: &str) -> RequestId {
        let mut player = self.player.lock().await;
        player.insight = Some(TrackInsight {
            track_uri: track_uri.to_string(),
            ..TrackInsight::default()
        });
        player.insight_request.begin()
    }

    /// Record genres and steer the accent toward the first one.
    pub async fn apply_genres(&self, id: RequestId, genres: Vec<String>) -> bool {
        let mut player = self.player.lock().await;
        if !player.insight_request.is_current(id) {
            return false;
        }
        if let Some(genre) = genres.first() {
            player.accent.retarget(theme::genre_hue(genre));
        }
        if let Some(insight) = player.insight.as_mut() {
            insight.genres = genres;
        }
        true
    }

    pub async fn apply_summary(&self, id: RequestId, summary: Option<String>) -> bool {
        let mut player = self.player.lock().await;
        if !player.insight_request.is_current(id) {
            return false;
        }
        if let Some(insight) = player.insight.as_mut() {
            insight.summary = summary;
        }
        true
    }

    pub async fn get_insight(&self) -> Option<TrackInsight> {
        self.player.lock().await.insight.clone()
    }

    /// Advance the accent animation by one frame and return its color.
    pub async fn tick_accent(&self) -> Color {
        let mut player = self.player.lock().await;
        player.accent.tick();
        player.accent.color()
    }

    pub async fn get_playback_info(&self) -> PlaybackInfo {
        let player = self.player.lock().await;
        let reported = player.machine.reported();
        let state = &reported.state;
        let insight = player.insight.as_ref().filter(|i| Some(i.track_uri.as_str()) == state.track_uri());

        PlaybackInfo {
            track: state.current_track.clone(),
            progress_ms: reported.current_position_ms(),
            duration_ms: state.duration_ms,
            icon: PlaybackIcon::from_state(state),
            phase: player.machine.phase(),
            device_name: player.device_name.clone(),
            genres: insight.map(|i| i.genres.clone()).unwrap_or_default(),
            summary: insight.and_then(|i| i.summary.clone()),
        }
    }

    pub async fn should_quit(&self) -> bool {
        *self.should_quit.lock().await
    }

    pub async fn set_should_quit(&self, quit: bool) {
        *self.should_quit.lock().await = quit;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{LocalStorage, TOKEN_STORAGE_KEY};
    use tempfile::TempDir;

    /// The returned directory holds the storage file; keep it alive for the test.
    fn model(token: Option<&str>) -> (TempDir, AppModel) {
        let dir = TempDir::new().expect("temp dir");
        let mut storage = LocalStorage::open(dir.path().join("local_storage.json"));
        if let Some(token) = token {
            storage.set_item(TOKEN_STORAGE_KEY, token).expect("write storage");
        }
        let model = AppModel::new(SessionStore::restore(storage), "https://auth.example/authorize".into());
        (dir, model)
    }

    #[tokio::test]
    async fn screen_branches_on_token() {
        let (_dir, model) = model(None);
        assert_eq!(model.screen().await, Screen::Login);

        let mut location = Location::new("http://localhost:5173/#access_token=ABC&token_type=Bearer");
        assert!(model.capture_location(&mut location).await);
        assert_eq!(model.screen().await, Screen::Dashboard);

        model.open_playlist("p1").await;
        assert_eq!(model.screen().await, Screen::Playlist { id: "p1".into() });
        model.close_playlist().await;
        assert_eq!(model.screen().await, Screen::Dashboard);
    }

    #[tokio::test]
    async fn stale_insight_is_dropped() {
        let (_dir, model) = model(Some("tok"));
        let first = model.begin_insight("spotify:track:1").await;
        let second = model.begin_insight("spotify:track:2").await;

        assert!(!model.apply_genres(first, vec!["rock".into()]).await);
        assert!(model.apply_genres(second, vec!["jazz".into()]).await);
        assert!(model.apply_summary(second, Some("Smooth.".into())).await);

        let insight = model.get_insight().await.expect("insight");
        assert_eq!(insight.track_uri, "spotify:track:2");
        assert_eq!(insight.genres, vec!["jazz".to_string()]);
        assert_eq!(insight.summary.as_deref(), Some("Smooth."));
    }

    #[tokio::test]
    async fn selection_stays_in_bounds() {
        let (_dir, model) = model(Some("tok"));
        model.set_focus(DashboardFocus::Playlists).await;
        let (_, playlists) = model.begin_dashboard_fetch().await;
        model
            .apply_playlists(
                playlists,
                vec![
                    Playlist { id: "a".into(), name: "A".into(), cover_image_url: None },
                    Playlist { id: "b".into(), name: "B".into(), cover_image_url: None },
                ],
            )
            .await;

        model.move_selection_down().await;
        model.move_selection_down().await;
        assert_eq!(model.get_selected_playlist().await.map(|p| p.id), Some("b".into()));
        model.move_selection_up().await;
        model.move_selection_up().await;
        assert_eq!(model.get_selected_playlist().await.map(|p| p.id), Some("a".into()));
    }

    #[tokio::test]
    async fn captured_token_does_not_leak_into_a_new_model() {
        let (first_dir, first) = model(None);
        let mut location = Location::new("http://localhost:5173/#access_token=ABC");
        assert!(first.capture_location(&mut location).await);
        assert!(first_dir.path().join("local_storage.json").exists());

        let (_dir, second) = model(None);
        assert!(!second.is_logged_in().await);
        assert_eq!(second.screen().await, Screen::Login);

        let stale = first_dir.path().to_path_buf();
        drop(first_dir);
        assert!(!stale.exists());
    }

    #[tokio::test]
    async fn token_watch_sees_later_captures() {
        let (_dir, model) = model(Some("OLD"));
        let tokens = model.token_watch();
        assert_eq!(tokens.borrow().as_deref(), Some("OLD"));

        let mut location = Location::new("http://localhost:5173/#access_token=NEW");
        assert!(model.capture_location(&mut location).await);
        assert_eq!(tokens.borrow().as_deref(), Some("NEW"));
    }
}
