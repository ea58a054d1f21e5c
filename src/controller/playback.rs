//! Playback control methods
//!
//! Commands are one-shot Web API calls. None of them touch the displayed
//! playback state; the next engine notification or poll does that.

use crate::api::PlayRequest;
use crate::model::{Playlist, Track};

use super::AppController;

/// Step used by the seek keys
pub const SEEK_STEP_MS: i64 = 10_000;

pub const NO_DEVICE_ALERT: &str = "The player is not ready yet. Wait for it to connect and try again.";

impl AppController {
    /// Token and device id for a command, or an alert when no device is ready.
    async fn command_target(&self) -> Option<(String, String)> {
        let model = self.model.lock().await;
        match model.device_id().await {
            Some(device_id) => {
                let token = model.token().await.unwrap_or_default();
                Some((token, device_id))
            }
            None => {
                tracing::warn!("Transport command without a ready device");
                model.set_alert(NO_DEVICE_ALERT).await;
                None
            }
        }
    }

    pub async fn play_track(&self, track: &Track) {
        let Some((token, device_id)) = self.command_target().await else {
            return;
        };
        tracing::info!(track = %track.name, uri = %track.uri, "Playing track");
        self.api
            .play(&token, Some(&device_id), PlayRequest::Tracks(vec![track.uri.clone()]))
            .await;
    }

    /// Play `track` within its playlist so next/previous follow the playlist.
    pub async fn play_in_playlist(&self, playlist_id: &str, track: &Track) {
        let Some((token, device_id)) = self.command_target().await else {
            return;
        };
        let context_uri = Playlist { id: playlist_id.to_string(), ..Playlist::default() }.uri();
        tracing::info!(track = %track.name, context = %context_uri, "Playing track in playlist");
        let request = PlayRequest::Context {
            context_uri,
            offset_uri: Some(track.uri.clone()),
        };
        self.api.play(&token, Some(&device_id), request).await;
    }

    pub async fn play_selected_result(&self) {
        let selected = self.model.lock().await.get_selected_result().await;
        if let Some(track) = selected {
            self.play_track(&track).await;
        }
    }

    pub async fn play_selected_page_track(&self) {
        let selected = self.model.lock().await.get_selected_page_track().await;
        if let Some((playlist_id, track)) = selected {
            self.play_in_playlist(&playlist_id, &track).await;
        }
    }

    pub async fn toggle_playback(&self) {
        let Some((token, device_id)) = self.command_target().await else {
            return;
        };
        let is_playing = self.model.lock().await.playback_state().await.is_playing;
        tracing::debug!(is_playing, "Toggling playback");

        let accepted = if is_playing {
            self.api.pause(&token, Some(&device_id)).await
        } else {
            self.api.play(&token, Some(&device_id), PlayRequest::Resume).await
        };
        if accepted {
            tracing::info!(action = if is_playing { "pause" } else { "resume" }, "Toggle sent");
        }
    }

    pub async fn next_track(&self) {
        let Some((token, device_id)) = self.command_target().await else {
            return;
        };
        tracing::debug!("Skipping to next track");
        self.api.next(&token, Some(&device_id)).await;
    }

    pub async fn previous_track(&self) {
        let Some((token, device_id)) = self.command_target().await else {
            return;
        };
        tracing::debug!("Going to previous track");
        self.api.previous(&token, Some(&device_id)).await;
    }

    pub async fn seek_relative(&self, delta_ms: i64) {
        let Some((token, device_id)) = self.command_target().await else {
            return;
        };
        let info = self.model.lock().await.get_playback_info().await;
        if info.track.is_none() {
            return;
        }
        let target = (i64::from(info.progress_ms) + delta_ms).clamp(0, i64::from(info.duration_ms));
        tracing::debug!(from = info.progress_ms, to = target, "Seeking");
        self.api.seek(&token, Some(&device_id), target as u32).await;
    }
}
