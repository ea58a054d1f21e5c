mod common;

use std::sync::Mutex;

use common::MockSpotify;
use medmusic::api::{PlayRequest, SpotifyApi};
use medmusic::model::{RequestSlot, Track};

fn names(tracks: &[Track]) -> Vec<String> {
    tracks.iter().map(|t| t.name.clone()).collect()
}

#[tokio::test]
async fn test_profile_and_playlists_are_projected() {
    let mock = MockSpotify::start().await;
    let api = SpotifyApi::new(&mock.base_url);

    let profile = api.fetch_profile("tok").await.expect("profile");
    assert_eq!(profile.id, "user1");
    assert_eq!(profile.greeting_name(), "Ada");

    let playlists = api.fetch_playlists("tok").await;
    assert_eq!(playlists.len(), 2);
    assert_eq!(playlists[0].cover_image_url.as_deref(), Some("https://i.scdn.co/p1"));
    assert_eq!(playlists[1].cover_image_url, None);

    let auth = mock.state.requests()[0].authorization.clone();
    assert_eq!(auth.as_deref(), Some("Bearer tok"));
}

#[tokio::test]
async fn test_playlist_tracks_skip_null_items() {
    let mock = MockSpotify::start().await;
    let api = SpotifyApi::new(&mock.base_url);

    let tracks = api.fetch_playlist_tracks("tok", "p1").await;
    let names: Vec<&str> = tracks.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["Get Lucky", "Harder Better"]);
    assert_eq!(tracks[0].uri, "spotify:track:p1-t1");
    assert_eq!(tracks[0].primary_artist_id(), Some("a1"));
}

#[tokio::test]
async fn test_search_sends_query_type_and_limit() {
    let mock = MockSpotify::start().await;
    let api = SpotifyApi::new(&mock.base_url);

    let tracks = api.search_tracks("tok", "daft punk").await;
    assert_eq!(tracks.len(), 1);
    assert_eq!(tracks[0].name, "Result for daft punk");

    let request = mock.state.requests().pop().expect("search request");
    assert_eq!(request.path, "/v1/search");
    assert_eq!(request.query.get("q").map(String::as_str), Some("daft punk"));
    assert_eq!(request.query.get("type").map(String::as_str), Some("track"));
    assert_eq!(request.query.get("limit").map(String::as_str), Some("10"));
}

#[tokio::test]
async fn test_blank_search_makes_no_request() {
    let mock = MockSpotify::start().await;
    let api = SpotifyApi::new(&mock.base_url);

    assert!(api.search_tracks("tok", "").await.is_empty());
    assert!(api.search_tracks("tok", "   ").await.is_empty());
    assert_eq!(mock.state.hits(), 0);
}

#[tokio::test]
async fn test_missing_token_makes_no_request() {
    let mock = MockSpotify::start().await;
    let api = SpotifyApi::new(&mock.base_url);

    assert!(api.fetch_profile("").await.is_none());
    assert!(api.fetch_playlists("").await.is_empty());
    assert!(api.artist_genres("tok", "").await.is_empty());
    assert_eq!(mock.state.hits(), 0);
}

#[tokio::test]
async fn test_unauthorized_resolves_to_defaults() {
    let mock = MockSpotify::start().await;
    mock.reject_all();
    let api = SpotifyApi::new(&mock.base_url);

    assert!(api.fetch_profile("expired").await.is_none());
    assert!(api.fetch_playlists("expired").await.is_empty());
    assert!(api.fetch_playlist_tracks("expired", "p1").await.is_empty());
    assert!(api.search_tracks("expired", "x").await.is_empty());
    assert!(api.artist_genres("expired", "a1").await.is_empty());
    assert!(api.current_playback("expired").await.is_none());
    assert!(!api.pause("expired", Some("dev")).await);
    assert!(!api.transfer_playback("expired", "dev").await);
    assert_eq!(mock.state.hits(), 8);
}

#[tokio::test]
async fn test_artist_genres() {
    let mock = MockSpotify::start().await;
    let api = SpotifyApi::new(&mock.base_url);

    let genres = api.artist_genres("tok", "a1").await;
    assert_eq!(genres, vec!["french house".to_string(), "electro".to_string()]);
    assert_eq!(mock.state.hits_for("/v1/artists/a1"), 1);
}

#[tokio::test]
async fn test_nothing_playing_is_none() {
    let mock = MockSpotify::start().await;
    let api = SpotifyApi::new(&mock.base_url);
    assert!(api.current_playback("tok").await.is_none());
}

#[tokio::test]
async fn test_transport_commands_target_device() {
    let mock = MockSpotify::start().await;
    let api = SpotifyApi::new(&mock.base_url);

    let request = PlayRequest::Context {
        context_uri: "spotify:playlist:p1".into(),
        offset_uri: Some("spotify:track:p1-t2".into()),
    };
    assert!(api.play("tok", Some("dev-1"), request).await);
    assert!(api.pause("tok", Some("dev-1")).await);
    assert!(api.seek("tok", Some("dev-1"), 42_000).await);
    assert!(api.next("tok", Some("dev-1")).await);
    assert!(api.previous("tok", Some("dev-1")).await);
    assert!(api.transfer_playback("tok", "dev-1").await);

    let requests = mock.state.requests();
    let summary: Vec<(String, String)> =
        requests.iter().map(|r| (r.method.clone(), r.path.clone())).collect();
    assert_eq!(
        summary,
        vec![
            ("PUT".to_string(), "/v1/me/player/play".to_string()),
            ("PUT".to_string(), "/v1/me/player/pause".to_string()),
            ("PUT".to_string(), "/v1/me/player/seek".to_string()),
            ("POST".to_string(), "/v1/me/player/next".to_string()),
            ("POST".to_string(), "/v1/me/player/previous".to_string()),
            ("PUT".to_string(), "/v1/me/player".to_string()),
        ]
    );

    let play: serde_json::Value = serde_json::from_str(&requests[0].body).expect("play body");
    assert_eq!(play["context_uri"], "spotify:playlist:p1");
    assert_eq!(play["offset"]["uri"], "spotify:track:p1-t2");
    assert_eq!(requests[0].query.get("device_id").map(String::as_str), Some("dev-1"));
    assert_eq!(requests[2].query.get("position_ms").map(String::as_str), Some("42000"));

    let transfer: serde_json::Value = serde_json::from_str(&requests[5].body).expect("transfer body");
    assert_eq!(transfer["device_ids"][0], "dev-1");
    assert_eq!(transfer["play"], false);
}

#[tokio::test]
async fn test_overlapping_searches_race_without_sequencing() {
    let mock = MockSpotify::start().await;
    mock.delay_search("a", 300);
    let api = SpotifyApi::new(&mock.base_url);

    // Every response overwrites the display as it arrives
    let displayed = Mutex::new(Vec::new());
    futures::join!(
        async {
            let tracks = api.search_tracks("tok", "a").await;
            *displayed.lock().expect("display lock") = names(&tracks);
        },
        async {
            let tracks = api.search_tracks("tok", "ab").await;
            *displayed.lock().expect("display lock") = names(&tracks);
        }
    );
    assert_eq!(*displayed.lock().expect("display lock"), vec!["Result for a".to_string()]);

    // Same race, applying only responses whose request id is still current
    let slot = Mutex::new(RequestSlot::default());
    let displayed = Mutex::new(Vec::new());
    let show = |id, tracks: Vec<Track>| {
        if slot.lock().expect("slot lock").is_current(id) {
            *displayed.lock().expect("display lock") = names(&tracks);
        }
    };
    futures::join!(
        async {
            let id = slot.lock().expect("slot lock").begin();
            show(id, api.search_tracks("tok", "a").await);
        },
        async {
            let id = slot.lock().expect("slot lock").begin();
            show(id, api.search_tracks("tok", "ab").await);
        }
    );
    assert_eq!(*displayed.lock().expect("display lock"), vec!["Result for ab".to_string()]);
}
