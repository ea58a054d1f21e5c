//! Player startup, engine notifications, the reconcile poll and track insight

use std::sync::Arc;
use std::time::Duration;

use crate::model::Track;
use crate::playback::{
    self, Availability, EventReceiver, PlayerOptions, ProviderEvent, TokenCallback,
};

use super::AppController;

pub const DEVICE_NAME: &str = "MedMusic";
pub const INITIAL_VOLUME: f32 = 0.5;
pub const RECONCILE_INTERVAL: Duration = Duration::from_secs(1);

impl AppController {
    /// Wait for the engine, connect the player and listen to its notifications.
    ///
    /// Only the first call does anything.
    pub async fn start_player(&self) {
        {
            let mut started = self.player_started.lock().await;
            if *started {
                return;
            }
            *started = true;
        }

        let availability =
            playback::wait_until_available(self.provider.as_ref(), self.retry, self.shutdown_signal()).await;
        match availability {
            Availability::Available => {}
            Availability::Exhausted => {
                tracing::error!("Playback engine unavailable; player stays offline");
                return;
            }
            Availability::Cancelled => return,
        }

        {
            let model = self.model.lock().await;
            model.begin_connecting().await;
            model.set_device_name(DEVICE_NAME.to_string()).await;
        }

        let tokens = self.model.lock().await.token_watch();
        let token: TokenCallback = Arc::new(move || tokens.borrow().clone());
        let options = PlayerOptions {
            name: DEVICE_NAME.to_string(),
            volume: INITIAL_VOLUME,
            token,
        };

        match self.provider.connect(options).await {
            Ok(events) => self.start_player_event_listener(events),
            Err(e) => tracing::error!(error = %e, "Failed to connect the player"),
        }
    }

    pub fn start_player_event_listener(&self, mut events: EventReceiver) {
        let controller = self.clone();
        let mut shutdown = self.shutdown_signal();
        tracing::info!("Starting player event listener");

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    event = events.recv() => match event {
                        Some(event) => controller.handle_player_event(event).await,
                        None => break,
                    },
                    _ = shutdown.changed() => break,
                }
            }
            tracing::debug!("Player event listener stopped");
        });
    }

    /// Fold one notification into the model and fire its side effects.
    pub async fn handle_player_event(&self, event: ProviderEvent) {
        let ready_device = match &event {
            ProviderEvent::Ready { device_id } => Some(device_id.clone()),
            _ => None,
        };

        let changed = self.model.lock().await.apply_player_event(event).await;

        if let Some(device_id) = ready_device {
            let controller = self.clone();
            tokio::spawn(async move {
                let token = controller.token().await;
                controller.api.transfer_playback(&token, &device_id).await;
            });
        }

        if let Some(track) = changed {
            let controller = self.clone();
            tokio::spawn(async move {
                controller.load_track_insight(track).await;
            });
        }
    }

    /// Pull the current playback once: the engine's view first, then the Web API.
    pub async fn reconcile_playback(&self) {
        let state = match self.provider.current_state().await {
            Some(state) => Some(state),
            None => {
                let token = self.token().await;
                self.api.current_playback(&token).await
            }
        };
        if let Some(state) = state {
            self.handle_player_event(ProviderEvent::StateChanged(Some(state))).await;
        }
    }

    /// Reconcile every second until shutdown.
    pub async fn run_reconcile_poll(&self) {
        let mut shutdown = self.shutdown_signal();
        let mut interval = tokio::time::interval(RECONCILE_INTERVAL);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = interval.tick() => {}
                _ = shutdown.changed() => break,
            }
            if self.is_shutting_down() {
                break;
            }
            if self.model.lock().await.device_id().await.is_none() {
                continue;
            }
            self.reconcile_playback().await;
        }
        tracing::debug!("Reconcile poll stopped");
    }

    /// Genres of the track's primary artist, then a one-line summary of the
    /// first genre. Best effort; results for an older track are dropped.
    pub async fn load_track_insight(&self, track: Track) {
        let request = self.model.lock().await.begin_insight(&track.uri).await;

        let artist_id = match track.primary_artist_id() {
            Some(id) => Some(id.to_string()),
            None => self
                .model
                .lock()
                .await
                .find_known_track(&track.uri)
                .await
                .and_then(|known| known.primary_artist_id().map(str::to_string)),
        };
        let Some(artist_id) = artist_id else {
            tracing::debug!(uri = %track.uri, "No artist id for insight");
            return;
        };

        let token = self.token().await;
        let genres = self.api.artist_genres(&token, &artist_id).await;
        let first_genre = genres.first().cloned();
        tracing::debug!(uri = %track.uri, ?genres, "Track genres loaded");

        if !self.model.lock().await.apply_genres(request, genres).await {
            return;
        }

        let Some(genre) = first_genre else {
            return;
        };
        let summary = self.textgen.summarize_genre(&genre).await;
        self.model.lock().await.apply_summary(request, summary).await;
    }
}
