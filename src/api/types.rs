//! Wire shapes of the Web API responses we read
//!
//! Only the fields the app displays are declared; everything is optional or
//! defaulted because the API omits or nulls fields freely (local files have
//! no ids, playlists may have no images).

use serde::{Deserialize, Serialize};

use crate::model::{ArtistRef, PlaybackState, Playlist, Track, UserProfile};

#[derive(Debug, Clone, Deserialize)]
pub struct ImageObject {
    pub url: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ArtistObject {
    pub id: Option<String>,
    pub name: String,
    pub genres: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AlbumObject {
    pub images: Option<Vec<ImageObject>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TrackObject {
    pub id: Option<String>,
    pub name: String,
    pub uri: String,
    pub artists: Vec<ArtistObject>,
    pub album: Option<AlbumObject>,
    pub preview_url: Option<String>,
    pub duration_ms: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UserObject {
    pub id: String,
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PlaylistObject {
    pub id: String,
    pub name: String,
    pub images: Option<Vec<ImageObject>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Paging<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PlaylistItemObject {
    pub track: Option<TrackObject>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    pub tracks: Paging<TrackObject>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CurrentPlaybackObject {
    pub is_playing: bool,
    pub progress_ms: Option<u32>,
    pub item: Option<TrackObject>,
}

/// Body of `PUT /me/player/play`
#[derive(Debug, Clone, Default, Serialize)]
pub struct PlayBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uris: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<PlayOffset>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlayOffset {
    pub uri: String,
}

/// Body of `PUT /me/player`
#[derive(Debug, Clone, Serialize)]
pub struct TransferBody {
    pub device_ids: Vec<String>,
    pub play: bool,
}

fn first_image(images: &Option<Vec<ImageObject>>) -> Option<String> {
    images
        .as_ref()
        .and_then(|images| images.first())
        .map(|image| image.url.clone())
}

impl From<TrackObject> for Track {
    fn from(track: TrackObject) -> Self {
        let album_cover_url = track
            .album
            .as_ref()
            .and_then(|album| first_image(&album.images))
            .unwrap_or_default();

        Self {
            id: track.id.unwrap_or_default(),
            name: track.name,
            uri: track.uri,
            album_cover_url,
            artists: track
                .artists
                .into_iter()
                .map(|a| ArtistRef {
                    id: a.id.unwrap_or_default(),
                    name: a.name,
                })
                .collect(),
            preview_url: track.preview_url,
            duration_ms: track.duration_ms,
        }
    }
}

impl From<PlaylistObject> for Playlist {
    fn from(playlist: PlaylistObject) -> Self {
        Self {
            cover_image_url: first_image(&playlist.images),
            id: playlist.id,
            name: playlist.name,
        }
    }
}

impl From<UserObject> for UserProfile {
    fn from(user: UserObject) -> Self {
        Self {
            id: user.id,
            display_name: user.display_name,
        }
    }
}

impl From<CurrentPlaybackObject> for PlaybackState {
    fn from(playback: CurrentPlaybackObject) -> Self {
        let current_track: Option<Track> = playback.item.map(Track::from);
        Self {
            is_playing: playback.is_playing,
            position_ms: playback.progress_ms.unwrap_or(0),
            duration_ms: current_track.as_ref().map(|t| t.duration_ms).unwrap_or(0),
            current_track,
        }
    }
}
