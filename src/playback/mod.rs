//! Playback engine adapter and the player lifecycle
//!
//! The engine (librespot in production) sits behind [`PlaybackProvider`].
//! It pushes [`ProviderEvent`]s; the [`PlaybackMachine`] turns them into the
//! player phase and the displayed [`PlaybackState`]. Transport commands go
//! over the Web API and never move the machine themselves: the engine's
//! next notification is the single source of truth.

mod librespot;

pub use self::librespot::LibrespotProvider;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::{mpsc, watch};

use crate::model::{PlaybackState, PlayerPhase, ReportedPlayback, Track};

/// Supplies the current access token whenever the engine asks for one
pub type TokenCallback = Arc<dyn Fn() -> Option<String> + Send + Sync>;

/// Notifications pushed by the playback engine
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProviderEvent {
    /// The engine registered a device and can receive commands
    Ready { device_id: String },
    /// The device went offline
    NotReady { device_id: String },
    /// Playback changed; `None` when the engine no longer holds playback
    StateChanged(Option<PlaybackState>),
}

pub type EventReceiver = mpsc::UnboundedReceiver<ProviderEvent>;

/// Options used to create the engine's player
#[derive(Clone)]
pub struct PlayerOptions {
    pub name: String,
    pub volume: f32,
    pub token: TokenCallback,
}

#[async_trait]
pub trait PlaybackProvider: Send + Sync {
    /// Succeeds once the engine is loaded and a player can be created.
    async fn probe(&self) -> Result<()>;

    /// Create the player and start delivering notifications.
    async fn connect(&self, options: PlayerOptions) -> Result<EventReceiver>;

    /// The engine's own view of playback, if it has one.
    async fn current_state(&self) -> Option<PlaybackState>;

    async fn disconnect(&self);
}

/// Bounded retry used while waiting for the engine to load
#[derive(Clone, Copy, Debug)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 20,
            delay: Duration::from_millis(500),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Availability {
    Available,
    Exhausted,
    Cancelled,
}

/// Probe the engine until it is available, the attempts run out, or
/// `shutdown` flips to `true`.
pub async fn wait_until_available(
    provider: &dyn PlaybackProvider,
    policy: RetryPolicy,
    mut shutdown: watch::Receiver<bool>,
) -> Availability {
    for attempt in 1..=policy.attempts {
        if *shutdown.borrow() {
            return Availability::Cancelled;
        }

        match provider.probe().await {
            Ok(()) => {
                tracing::debug!(attempt, "Playback engine available");
                return Availability::Available;
            }
            Err(e) => tracing::debug!(attempt, error = %e, "Playback engine not available yet"),
        }

        if attempt == policy.attempts {
            break;
        }

        tokio::select! {
            _ = tokio::time::sleep(policy.delay) => {}
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    return Availability::Cancelled;
                }
            }
        }
    }

    tracing::warn!(attempts = policy.attempts, "Playback engine never became available");
    Availability::Exhausted
}

/// Player phase, device id and last reported state
#[derive(Clone, Debug, Default)]
pub struct PlaybackMachine {
    phase: PlayerPhase,
    device_id: Option<String>,
    reported: ReportedPlayback,
}

impl PlaybackMachine {
    pub fn phase(&self) -> PlayerPhase {
        self.phase
    }

    pub fn device_id(&self) -> Option<&str> {
        self.device_id.as_deref()
    }

    pub fn state(&self) -> &PlaybackState {
        &self.reported.state
    }

    pub fn reported(&self) -> &ReportedPlayback {
        &self.reported
    }

    /// The engine finished loading.
    pub fn begin_connecting(&mut self) {
        if self.phase == PlayerPhase::Uninitialized {
            self.phase = PlayerPhase::Connecting;
        }
    }

    /// Fold one notification into the machine.
    ///
    /// Returns the new track when the notification switched tracks.
    pub fn apply(&mut self, event: ProviderEvent) -> Option<Track> {
        match event {
            ProviderEvent::Ready { device_id } => {
                tracing::info!(device_id = %device_id, "Player ready");
                self.device_id = Some(device_id);
                if matches!(self.phase, PlayerPhase::Uninitialized | PlayerPhase::Connecting) {
                    self.phase = PlayerPhase::Ready;
                }
                None
            }
            ProviderEvent::NotReady { device_id } => {
                tracing::warn!(device_id = %device_id, "Player went offline");
                if self.device_id.as_deref() == Some(device_id.as_str()) {
                    self.device_id = None;
                    self.phase = PlayerPhase::Connecting;
                }
                None
            }
            ProviderEvent::StateChanged(state) => {
                let state = state.unwrap_or_default();
                let previous_uri = self.reported.state.track_uri().map(str::to_string);

                if self.device_id.is_some() {
                    self.phase = match (&state.current_track, state.is_playing) {
                        (None, _) => PlayerPhase::Ready,
                        (Some(_), true) => PlayerPhase::PlayingTrack,
                        (Some(_), false) => PlayerPhase::PausedTrack,
                    };
                }

                let changed = match (&state.current_track, previous_uri) {
                    (Some(track), Some(prev)) if track.uri == prev => None,
                    (Some(track), _) => Some(track.clone()),
                    (None, _) => None,
                };

                self.reported.replace(state);
                changed
            }
        }
    }
}
