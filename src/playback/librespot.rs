//! librespot-backed playback engine: a Spotify Connect device in-process

use std::sync::Arc;

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use librespot::connect::{ConnectConfig, Spirc};
use librespot::core::authentication::Credentials;
use librespot::core::config::SessionConfig;
use librespot::core::session::Session;
use librespot::metadata::audio::UniqueFields;
use librespot::playback::config::{AudioFormat, Bitrate, PlayerConfig};
use librespot::playback::mixer::{MixerConfig, NoOpVolume};
use librespot::playback::player::{Player, PlayerEvent, PlayerEventChannel};
use librespot::playback::{audio_backend, mixer};
use tokio::sync::{Mutex, mpsc};

use super::{EventReceiver, PlaybackProvider, PlayerOptions, ProviderEvent};
use crate::model::{ArtistRef, PlaybackState, ReportedPlayback, Track};

struct Connected {
    session: Session,
    spirc: Spirc,
}

#[derive(Default)]
pub struct LibrespotProvider {
    connected: Mutex<Option<Connected>>,
    last_state: Arc<Mutex<Option<ReportedPlayback>>>,
}

impl LibrespotProvider {
    pub fn new() -> Self {
        Self::default()
    }

    fn device_id(name: &str) -> String {
        // Stable per machine so the Web API sees the same device across runs
        let hostname = hostname::get()
            .map(|h| h.to_string_lossy().to_string())
            .unwrap_or_else(|_| "unknown".to_string());
        format!("{}-{}", name, hostname)
    }
}

#[async_trait]
impl PlaybackProvider for LibrespotProvider {
    async fn probe(&self) -> Result<()> {
        audio_backend::find(None).ok_or_else(|| anyhow!("no audio backend available"))?;
        mixer::find(None).ok_or_else(|| anyhow!("no mixer available"))?;
        Ok(())
    }

    async fn connect(&self, options: PlayerOptions) -> Result<EventReceiver> {
        let token = (options.token)().ok_or_else(|| anyhow!("no access token for the player"))?;
        let device_id = Self::device_id(&options.name);

        let session_config = SessionConfig {
            device_id: device_id.clone(),
            ..Default::default()
        };
        let player_config = PlayerConfig {
            bitrate: Bitrate::Bitrate320,
            ..Default::default()
        };
        let connect_config = ConnectConfig {
            name: options.name.clone(),
            ..Default::default()
        };
        let audio_format = AudioFormat::default();
        let sink_builder = audio_backend::find(None).ok_or_else(|| anyhow!("no audio backend available"))?;
        let mixer_builder = mixer::find(None).ok_or_else(|| anyhow!("no mixer available"))?;

        tracing::info!(device = %options.name, "Connecting librespot");
        let session = Session::new(session_config, None);
        let mixer = mixer_builder(MixerConfig::default())?;

        let player = Player::new(
            player_config,
            session.clone(),
            Box::new(NoOpVolume),
            move || sink_builder(None, audio_format),
        );
        let event_channel = player.get_player_event_channel();

        let (spirc, spirc_task) = Spirc::new(
            connect_config,
            session.clone(),
            Credentials::with_access_token(token),
            player.clone(),
            mixer,
        )
        .await?;

        tokio::spawn(async move {
            spirc_task.await;
            tracing::debug!("Spirc task finished");
        });

        spirc.activate()?;

        let volume = (options.volume.clamp(0.0, 1.0) * f32::from(u16::MAX)) as u16;
        if let Err(e) = spirc.set_volume(volume) {
            tracing::warn!(error = %e, "Failed to set initial volume");
        }

        let (tx, rx) = mpsc::unbounded_channel();
        let _ = tx.send(ProviderEvent::Ready { device_id: device_id.clone() });
        spawn_event_translator(event_channel, tx, device_id, self.last_state.clone());

        *self.connected.lock().await = Some(Connected { session, spirc });
        tracing::info!(device = %options.name, "librespot player connected");
        Ok(rx)
    }

    async fn current_state(&self) -> Option<PlaybackState> {
        let last = self.last_state.lock().await;
        last.as_ref().map(|reported| PlaybackState {
            position_ms: reported.current_position_ms(),
            ..reported.state.clone()
        })
    }

    async fn disconnect(&self) {
        if let Some(connected) = self.connected.lock().await.take() {
            if let Err(e) = connected.spirc.shutdown() {
                tracing::warn!(error = %e, "Spirc shutdown failed");
            }
            connected.session.shutdown();
            tracing::info!("librespot player disconnected");
        }
    }
}

/// Forward librespot player events as full state snapshots.
fn spawn_event_translator(
    mut events: PlayerEventChannel,
    tx: mpsc::UnboundedSender<ProviderEvent>,
    device_id: String,
    last_state: Arc<Mutex<Option<ReportedPlayback>>>,
) {
    tokio::spawn(async move {
        let mut state = PlaybackState::default();

        while let Some(event) = events.recv().await {
            let changed = match event {
                PlayerEvent::Playing { position_ms, .. } => {
                    tracing::trace!(position_ms, "PlayerEvent::Playing");
                    state.is_playing = true;
                    state.position_ms = position_ms;
                    true
                }
                PlayerEvent::Paused { position_ms, .. } => {
                    tracing::debug!(position_ms, "PlayerEvent::Paused");
                    state.is_playing = false;
                    state.position_ms = position_ms;
                    true
                }
                PlayerEvent::PositionChanged { position_ms, .. }
                | PlayerEvent::Seeked { position_ms, .. } => {
                    tracing::trace!(position_ms, "PlayerEvent position update");
                    state.position_ms = position_ms;
                    true
                }
                PlayerEvent::Loading { position_ms, .. } => {
                    tracing::debug!(position_ms, "PlayerEvent::Loading");
                    state.is_playing = false;
                    state.position_ms = position_ms;
                    true
                }
                PlayerEvent::TrackChanged { audio_item } => {
                    let artists: Vec<ArtistRef> = match &audio_item.unique_fields {
                        UniqueFields::Track { artists, .. } => artists
                            .0
                            .iter()
                            .map(|a| ArtistRef { id: String::new(), name: a.name.clone() })
                            .collect(),
                        UniqueFields::Episode { show_name, .. } => {
                            vec![ArtistRef { id: String::new(), name: show_name.clone() }]
                        }
                        UniqueFields::Local { artists, .. } => artists
                            .clone()
                            .map(|name| vec![ArtistRef { id: String::new(), name }])
                            .unwrap_or_default(),
                    };
                    let uri = audio_item.track_id.to_uri().unwrap_or_default();

                    tracing::info!(
                        track = %audio_item.name,
                        duration_ms = audio_item.duration_ms,
                        uri = %uri,
                        "PlayerEvent::TrackChanged"
                    );

                    state.duration_ms = audio_item.duration_ms;
                    state.position_ms = 0;
                    state.current_track = Some(Track {
                        id: uri.rsplit(':').next().unwrap_or_default().to_string(),
                        name: audio_item.name.clone(),
                        uri,
                        artists,
                        duration_ms: audio_item.duration_ms,
                        ..Track::default()
                    });
                    true
                }
                PlayerEvent::Stopped { .. } => {
                    tracing::debug!("PlayerEvent::Stopped");
                    state = PlaybackState::default();
                    true
                }
                PlayerEvent::EndOfTrack { .. } => {
                    tracing::debug!("PlayerEvent::EndOfTrack");
                    state.is_playing = false;
                    true
                }
                _ => false,
            };

            if !changed {
                continue;
            }

            let mut reported = ReportedPlayback::default();
            reported.replace(state.clone());
            *last_state.lock().await = Some(reported);

            if tx.send(ProviderEvent::StateChanged(Some(state.clone()))).is_err() {
                break;
            }
        }

        tracing::info!("librespot event channel closed");
        let _ = tx.send(ProviderEvent::NotReady { device_id });
    });
}
