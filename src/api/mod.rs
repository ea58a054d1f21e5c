//! Spotify Web API client
//!
//! Thin bearer-authenticated wrappers over the endpoints the app uses. The
//! public methods never fail: network errors, non-2xx statuses and
//! undecodable bodies are logged and turned into an empty default at the
//! [`settle`] boundary, so callers only ever see data or the absence of it.

pub mod textgen;
pub mod types;

pub use self::textgen::{ChatMessage, TextGenClient};

use anyhow::Result;
use reqwest::header::CONTENT_LENGTH;
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;

use self::types::{
    ArtistObject, CurrentPlaybackObject, Paging, PlayBody, PlayOffset, PlaylistItemObject,
    PlaylistObject, SearchResponse, TransferBody, UserObject,
};
use crate::model::{PlaybackState, Playlist, Track, UserProfile};
use crate::{log_api_request, log_api_result};

/// Number of tracks requested per search
pub const SEARCH_LIMIT: u32 = 10;

/// What `PUT /me/player/play` should start
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PlayRequest {
    /// Resume whatever is loaded on the device
    Resume,
    /// Play an explicit list of track uris
    Tracks(Vec<String>),
    /// Play a playlist or album, optionally starting at one of its tracks
    Context {
        context_uri: String,
        offset_uri: Option<String>,
    },
}

impl PlayRequest {
    fn into_body(self) -> Option<PlayBody> {
        match self {
            Self::Resume => None,
            Self::Tracks(uris) => Some(PlayBody {
                uris: Some(uris),
                ..PlayBody::default()
            }),
            Self::Context { context_uri, offset_uri } => Some(PlayBody {
                context_uri: Some(context_uri),
                offset: offset_uri.map(|uri| PlayOffset { uri }),
                ..PlayBody::default()
            }),
        }
    }
}

/// Log the outcome of a fallible call and collapse failures to `T::default()`.
fn settle<T: Default>(operation: &'static str, result: Result<T>) -> T {
    log_api_result!(operation, result);
    result.unwrap_or_default()
}

#[derive(Clone, Debug)]
pub struct SpotifyApi {
    http: Client,
    base_url: String,
}

impl SpotifyApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        token: &str,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let response = self
            .http
            .get(self.url(path))
            .bearer_auth(token)
            .query(query)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json::<T>().await?)
    }

    async fn send_command(
        &self,
        token: &str,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<serde_json::Value>,
    ) -> Result<()> {
        let request = self
            .http
            .request(method, self.url(path))
            .bearer_auth(token)
            .query(query);
        let request = match body {
            Some(body) => request.json(&body),
            None => request.header(CONTENT_LENGTH, "0"),
        };
        request.send().await?.error_for_status()?;
        Ok(())
    }

    async fn try_current_playback(&self, token: &str) -> Result<Option<PlaybackState>> {
        let response = self
            .http
            .get(self.url("/me/player"))
            .bearer_auth(token)
            .send()
            .await?
            .error_for_status()?;
        if response.status() == StatusCode::NO_CONTENT {
            return Ok(None);
        }
        let playback = response.json::<CurrentPlaybackObject>().await?;
        Ok(Some(PlaybackState::from(playback)))
    }

    fn device_query(device_id: Option<&str>) -> Vec<(&'static str, String)> {
        device_id
            .map(|id| vec![("device_id", id.to_string())])
            .unwrap_or_default()
    }

    /// `GET /me`
    pub async fn fetch_profile(&self, token: &str) -> Option<UserProfile> {
        if token.is_empty() {
            tracing::warn!("fetch_profile called without an access token");
            return None;
        }
        log_api_request!("fetch_profile");
        let result = self
            .get_json::<UserObject>(token, "/me", &[])
            .await
            .map(|user| Some(UserProfile::from(user)));
        settle("fetch_profile", result)
    }

    /// `GET /me/playlists`
    pub async fn fetch_playlists(&self, token: &str) -> Vec<Playlist> {
        if token.is_empty() {
            tracing::warn!("fetch_playlists called without an access token");
            return Vec::new();
        }
        log_api_request!("fetch_playlists");
        let result = self
            .get_json::<Paging<PlaylistObject>>(token, "/me/playlists", &[])
            .await
            .map(|page| page.items.into_iter().map(Playlist::from).collect());
        settle("fetch_playlists", result)
    }

    /// `GET /playlists/{id}/tracks`; items whose track is null are skipped.
    pub async fn fetch_playlist_tracks(&self, token: &str, playlist_id: &str) -> Vec<Track> {
        if token.is_empty() || playlist_id.is_empty() {
            tracing::warn!("fetch_playlist_tracks called without a token or playlist id");
            return Vec::new();
        }
        log_api_request!("fetch_playlist_tracks", playlist_id = %playlist_id);
        let path = format!("/playlists/{}/tracks", urlencoding::encode(playlist_id));
        let result = self
            .get_json::<Paging<PlaylistItemObject>>(token, &path, &[])
            .await
            .map(|page| {
                page.items
                    .into_iter()
                    .filter_map(|item| item.track)
                    .map(Track::from)
                    .collect()
            });
        settle("fetch_playlist_tracks", result)
    }

    /// `GET /search?type=track`; a blank query sends nothing.
    pub async fn search_tracks(&self, token: &str, query: &str) -> Vec<Track> {
        if token.is_empty() || query.trim().is_empty() {
            tracing::debug!("Skipping search: no access token or empty query");
            return Vec::new();
        }
        log_api_request!("search_tracks", query = %query);
        let params = [
            ("q", query.to_string()),
            ("type", "track".to_string()),
            ("limit", SEARCH_LIMIT.to_string()),
        ];
        let result = self
            .get_json::<SearchResponse>(token, "/search", &params)
            .await
            .map(|found| found.tracks.items.into_iter().map(Track::from).collect());
        settle("search_tracks", result)
    }

    /// `GET /artists/{id}`, projected to the artist's genres
    pub async fn artist_genres(&self, token: &str, artist_id: &str) -> Vec<String> {
        if token.is_empty() || artist_id.is_empty() {
            tracing::debug!("Skipping genre lookup: no access token or artist id");
            return Vec::new();
        }
        log_api_request!("artist_genres", artist_id = %artist_id);
        let path = format!("/artists/{}", urlencoding::encode(artist_id));
        let result = self
            .get_json::<ArtistObject>(token, &path, &[])
            .await
            .map(|artist| artist.genres.unwrap_or_default());
        settle("artist_genres", result)
    }

    /// `GET /me/player`; `None` when nothing is playing anywhere (204).
    pub async fn current_playback(&self, token: &str) -> Option<PlaybackState> {
        if token.is_empty() {
            return None;
        }
        let result = self.try_current_playback(token).await;
        settle("current_playback", result)
    }

    /// `PUT /me/player/play`
    pub async fn play(&self, token: &str, device_id: Option<&str>, request: PlayRequest) -> bool {
        log_api_request!("play", device_id = ?device_id, request = ?request);
        let body = match request.into_body().map(serde_json::to_value).transpose() {
            Ok(body) => body,
            Err(e) => {
                tracing::error!(operation = "play", error = %e, "Could not encode play request");
                return false;
            }
        };
        let result = self
            .send_command(token, Method::PUT, "/me/player/play", &Self::device_query(device_id), body)
            .await
            .map(|()| true);
        settle("play", result)
    }

    /// `PUT /me/player/pause`
    pub async fn pause(&self, token: &str, device_id: Option<&str>) -> bool {
        log_api_request!("pause", device_id = ?device_id);
        let result = self
            .send_command(token, Method::PUT, "/me/player/pause", &Self::device_query(device_id), None)
            .await
            .map(|()| true);
        settle("pause", result)
    }

    /// `PUT /me/player/seek`
    pub async fn seek(&self, token: &str, device_id: Option<&str>, position_ms: u32) -> bool {
        log_api_request!("seek", device_id = ?device_id, position_ms);
        let mut query = Self::device_query(device_id);
        query.push(("position_ms", position_ms.to_string()));
        let result = self
            .send_command(token, Method::PUT, "/me/player/seek", &query, None)
            .await
            .map(|()| true);
        settle("seek", result)
    }

    /// `POST /me/player/next`
    pub async fn next(&self, token: &str, device_id: Option<&str>) -> bool {
        log_api_request!("next", device_id = ?device_id);
        let result = self
            .send_command(token, Method::POST, "/me/player/next", &Self::device_query(device_id), None)
            .await
            .map(|()| true);
        settle("next", result)
    }

    /// `POST /me/player/previous`
    pub async fn previous(&self, token: &str, device_id: Option<&str>) -> bool {
        log_api_request!("previous", device_id = ?device_id);
        let result = self
            .send_command(
                token,
                Method::POST,
                "/me/player/previous",
                &Self::device_query(device_id),
                None,
            )
            .await
            .map(|()| true);
        settle("previous", result)
    }

    /// `PUT /me/player`: make `device_id` the active device without starting playback.
    pub async fn transfer_playback(&self, token: &str, device_id: &str) -> bool {
        log_api_request!("transfer_playback", device_id = %device_id);
        let body = TransferBody {
            device_ids: vec![device_id.to_string()],
            play: false,
        };
        let result = match serde_json::to_value(body) {
            Ok(body) => self
                .send_command(token, Method::PUT, "/me/player", &[], Some(body))
                .await
                .map(|()| true),
            Err(e) => Err(e.into()),
        };
        settle("transfer_playback", result)
    }
}
