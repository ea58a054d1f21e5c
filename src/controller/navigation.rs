//! Login, dashboard and playlist navigation

use crate::model::{Route, Screen};
use crate::session::Location;

use super::AppController;

impl AppController {
    /// Run token extraction on the location the app landed on.
    ///
    /// Returns whether a new token was captured; the dashboard mounts if so.
    pub async fn land_on(&self, href: &str) -> bool {
        let mut location = Location::new(href);
        let captured = self.model.lock().await.capture_location(&mut location).await;
        if captured {
            tracing::debug!(location = %location.href(), "Location fragment cleared");
            self.mount_dashboard();
        }
        captured
    }

    /// Submit the redirect URL pasted on the login screen.
    pub async fn submit_login(&self) {
        let input = self.model.lock().await.take_login_input().await;
        if input.trim().is_empty() {
            return;
        }
        if !self.land_on(&input).await {
            self.model
                .lock()
                .await
                .set_login_error(Some("No access token found in that URL".to_string()))
                .await;
        }
    }

    pub async fn open_login_page(&self) {
        let model = self.model.lock().await;
        let url = model.get_ui_state().await.auth_url;
        tracing::info!("Opening authorization page in the browser");
        if let Err(e) = webbrowser::open(&url) {
            tracing::warn!(error = %e, "Could not open a browser");
            model
                .set_login_error(Some("Could not open a browser; visit the address shown above".to_string()))
                .await;
        }
    }

    /// Dashboard mount: load profile and playlists, start the player.
    pub fn mount_dashboard(&self) {
        let controller = self.clone();
        tokio::spawn(async move {
            controller.load_dashboard().await;
        });
        let controller = self.clone();
        tokio::spawn(async move {
            controller.start_player().await;
        });
        let controller = self.clone();
        tokio::spawn(async move {
            controller.run_reconcile_poll().await;
        });
    }

    pub async fn load_dashboard(&self) {
        let (profile_id, playlists_id) = {
            let model = self.model.lock().await;
            model.begin_dashboard_fetch().await
        };
        let token = self.token().await;

        let (profile, playlists) = futures::join!(
            self.api.fetch_profile(&token),
            self.api.fetch_playlists(&token)
        );
        tracing::info!(playlists = playlists.len(), has_profile = profile.is_some(), "Dashboard data loaded");

        let model = self.model.lock().await;
        model.apply_profile(profile_id, profile).await;
        model.apply_playlists(playlists_id, playlists).await;
    }

    pub async fn perform_search(&self, query: &str) {
        let request = self.model.lock().await.begin_search().await;
        let token = self.token().await;

        tracing::debug!(query = %query, ?request, "Searching tracks");
        let tracks = self.api.search_tracks(&token, query).await;

        let applied = self.model.lock().await.apply_search_results(request, tracks).await;
        if !applied {
            tracing::debug!(query = %query, "Search superseded by a newer one");
        }
    }

    pub async fn open_selected_playlist(&self) {
        let selected = self.model.lock().await.get_selected_playlist().await;
        if let Some(playlist) = selected {
            self.open_playlist(&playlist.id).await;
        }
    }

    /// Route to the playlist page and load its tracks.
    pub async fn open_playlist(&self, playlist_id: &str) {
        let request = self.model.lock().await.open_playlist(playlist_id).await;
        let token = self.token().await;

        let tracks = self.api.fetch_playlist_tracks(&token, playlist_id).await;
        tracing::info!(playlist_id = %playlist_id, tracks = tracks.len(), "Playlist tracks loaded");

        self.model.lock().await.apply_playlist_tracks(request, tracks).await;
    }

    pub async fn back_to_library(&self) {
        let model = self.model.lock().await;
        if matches!(model.screen().await, Screen::Playlist { .. }) {
            model.close_playlist().await;
        } else {
            model.set_route(Route::Dashboard).await;
        }
    }
}
