//! Controller module - Application logic and event handling
//!
//! This module contains the application controller that handles user input,
//! coordinates between the model and view, and drives the player.
//! It is organized into submodules by responsibility:
//!
//! - `input`: Key and paste event handling
//! - `navigation`: Login, dashboard mount, playlists and search
//! - `playback`: Transport commands
//! - `player_events`: Player startup, notifications, reconcile poll and track insight

mod input;
mod navigation;
mod playback;
mod player_events;

use std::sync::Arc;
use tokio::sync::{Mutex, watch};

use crate::api::{SpotifyApi, TextGenClient};
use crate::model::AppModel;
use crate::playback::{PlaybackProvider, RetryPolicy};

#[derive(Clone)]
pub struct AppController {
    pub(crate) model: Arc<Mutex<AppModel>>,
    pub(crate) api: SpotifyApi,
    pub(crate) textgen: TextGenClient,
    pub(crate) provider: Arc<dyn PlaybackProvider>,
    retry: RetryPolicy,
    shutdown: Arc<watch::Sender<bool>>,
    player_started: Arc<Mutex<bool>>,
}

impl AppController {
    pub fn new(
        model: Arc<Mutex<AppModel>>,
        api: SpotifyApi,
        textgen: TextGenClient,
        provider: Arc<dyn PlaybackProvider>,
    ) -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            model,
            api,
            textgen,
            provider,
            retry: RetryPolicy::default(),
            shutdown: Arc::new(shutdown),
            player_started: Arc::new(Mutex::new(false)),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub(crate) fn shutdown_signal(&self) -> watch::Receiver<bool> {
        self.shutdown.subscribe()
    }

    pub(crate) fn is_shutting_down(&self) -> bool {
        *self.shutdown.borrow()
    }

    /// The session token, or an empty string when logged out.
    pub(crate) async fn token(&self) -> String {
        self.model.lock().await.token().await.unwrap_or_default()
    }

    /// Stop background tasks and release the player.
    pub async fn shutdown(&self) {
        tracing::info!("Controller shutting down");
        self.shutdown.send_replace(true);
        self.model.lock().await.set_should_quit(true).await;
        self.provider.disconnect().await;
    }
}
