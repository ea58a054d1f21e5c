//! Fetched content: profile, playlists, search results and the open playlist
//!
//! Each piece is filled by a fire-and-forget fetch. Responses are applied
//! through the `apply_*` methods, which drop anything that is no longer the
//! newest request for its slot.

use super::requests::{RequestId, RequestSlots};
use super::types::{Playlist, Track, UserProfile};

/// Tracks of the playlist currently open on the playlist page
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PlaylistPage {
    pub id: String,
    pub tracks: Vec<Track>,
    pub loading: bool,
}

#[derive(Clone, Debug, Default)]
pub struct ContentState {
    pub profile: Option<UserProfile>,
    pub playlists: Vec<Playlist>,
    pub search_results: Vec<Track>,
    pub playlist_page: Option<PlaylistPage>,
    pub requests: RequestSlots,
}

impl ContentState {
    pub fn apply_profile(&mut self, id: RequestId, profile: Option<UserProfile>) -> bool {
        if !self.requests.profile.is_current(id) {
            tracing::debug!(?id, "Dropping stale profile response");
            return false;
        }
        self.profile = profile;
        true
    }

    pub fn apply_playlists(&mut self, id: RequestId, playlists: Vec<Playlist>) -> bool {
        if !self.requests.playlists.is_current(id) {
            tracing::debug!(?id, "Dropping stale playlists response");
            return false;
        }
        self.playlists = playlists;
        true
    }

    pub fn apply_search_results(&mut self, id: RequestId, tracks: Vec<Track>) -> bool {
        if !self.requests.search.is_current(id) {
            tracing::debug!(?id, "Dropping stale search response");
            return false;
        }
        self.search_results = tracks;
        true
    }

    /// Open the playlist page for `playlist_id` and issue its request id.
    pub fn open_playlist(&mut self, playlist_id: &str) -> RequestId {
        self.playlist_page = Some(PlaylistPage {
            id: playlist_id.to_string(),
            tracks: Vec::new(),
            loading: true,
        });
        self.requests.playlist_tracks.begin()
    }

    pub fn close_playlist(&mut self) {
        self.playlist_page = None;
        self.requests.playlist_tracks.invalidate();
    }

    pub fn apply_playlist_tracks(&mut self, id: RequestId, tracks: Vec<Track>) -> bool {
        if !self.requests.playlist_tracks.is_current(id) {
            tracing::debug!(?id, "Dropping stale playlist tracks response");
            return false;
        }
        match self.playlist_page.as_mut() {
            Some(page) => {
                page.tracks = tracks;
                page.loading = false;
                true
            }
            None => false,
        }
    }

    /// Every track the app has listed, for resolving a uri back to its artists
    pub fn known_track(&self, uri: &str) -> Option<&Track> {
        let page_tracks = self.playlist_page.iter().flat_map(|page| page.tracks.iter());
        self.search_results
            .iter()
            .chain(page_tracks)
            .find(|track| track.uri == uri)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(id: &str) -> Track {
        Track {
            id: id.into(),
            name: format!("Song {id}"),
            uri: format!("spotify:track:{id}"),
            ..Track::default()
        }
    }

    #[test]
    fn stale_search_is_dropped() {
        let mut content = ContentState::default();
        let first = content.requests.search.begin();
        let second = content.requests.search.begin();

        assert!(content.apply_search_results(second, vec![track("ab")]));
        assert!(!content.apply_search_results(first, vec![track("a1"), track("a2")]));
        assert_eq!(content.search_results, vec![track("ab")]);
    }

    #[test]
    fn closed_playlist_ignores_late_tracks() {
        let mut content = ContentState::default();
        let id = content.open_playlist("p1");
        content.close_playlist();
        assert!(!content.apply_playlist_tracks(id, vec![track("t1")]));
        assert!(content.playlist_page.is_none());
    }

    #[test]
    fn reopening_playlist_supersedes_previous_fetch() {
        let mut content = ContentState::default();
        let old = content.open_playlist("p1");
        let new = content.open_playlist("p2");
        assert!(!content.apply_playlist_tracks(old, vec![track("from-p1")]));
        assert!(content.apply_playlist_tracks(new, vec![track("from-p2")]));

        let page = content.playlist_page.as_ref().expect("page");
        assert_eq!(page.id, "p2");
        assert!(!page.loading);
        assert_eq!(page.tracks, vec![track("from-p2")]);
    }

    #[test]
    fn known_track_searches_results_and_page() {
        let mut content = ContentState::default();
        let search = content.requests.search.begin();
        content.apply_search_results(search, vec![track("s1")]);
        let page = content.open_playlist("p1");
        content.apply_playlist_tracks(page, vec![track("p1t")]);

        assert!(content.known_track("spotify:track:s1").is_some());
        assert!(content.known_track("spotify:track:p1t").is_some());
        assert!(content.known_track("spotify:track:none").is_none());
    }
}
