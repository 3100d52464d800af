//! Voice connections through songbird
//!
//! One songbird `Call` exists per guild at most; the manager is keyed by
//! guild so joining twice reuses the same call.

use async_trait::async_trait;
use serenity::all::{ChannelId, GuildId};
use songbird::events::{Event, EventContext, EventHandler as VoiceEventHandler, TrackEvent};
use songbird::input::File;
use songbird::Songbird;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, instrument};

#[derive(Error, Debug)]
pub enum VoiceError {
    #[error("not connected to a voice channel")]
    NotConnected,
    #[error("failed to join voice channel: {0}")]
    Join(#[from] songbird::error::JoinError),
}

/// Per-guild voice control
#[async_trait]
pub trait VoiceManager: Send + Sync {
    /// Channel of the guild's active voice connection, if any
    async fn current_channel(&self, guild_id: GuildId) -> Option<ChannelId>;

    async fn join(&self, guild_id: GuildId, channel_id: ChannelId) -> Result<(), VoiceError>;

    /// Start playing `path`, replacing whatever is playing
    async fn play_file(&self, guild_id: GuildId, path: &Path) -> Result<(), VoiceError>;

    async fn stop(&self, guild_id: GuildId) -> Result<(), VoiceError>;

    /// Disconnect and drop the guild's voice connection
    async fn leave(&self, guild_id: GuildId) -> Result<(), VoiceError>;
}

/// [`VoiceManager`] backed by the songbird instance registered on the client
pub struct SongbirdVoice {
    manager: Arc<Songbird>,
}

impl SongbirdVoice {
    pub fn new(manager: Arc<Songbird>) -> Self {
        Self { manager }
    }
}

#[async_trait]
impl VoiceManager for SongbirdVoice {
    #[instrument(skip_all)]
    async fn current_channel(&self, guild_id: GuildId) -> Option<ChannelId> {
        let call = self.manager.get(guild_id)?;
        let call = call.lock().await;
        call.current_channel().map(|id| ChannelId::new(id.0.get()))
    }

    #[instrument(skip_all)]
    async fn join(&self, guild_id: GuildId, channel_id: ChannelId) -> Result<(), VoiceError> {
        let call = self.manager.join(guild_id, channel_id).await?;

        // Playback failures (e.g. a missing file) only show up here
        let mut handler = call.lock().await;
        handler.remove_all_global_events();
        handler.add_global_event(
            Event::Track(TrackEvent::Error),
            TrackErrorLogger { guild_id },
        );

        info!("Joined voice channel {} in guild {}", channel_id, guild_id);
        Ok(())
    }

    #[instrument(skip_all)]
    async fn play_file(&self, guild_id: GuildId, path: &Path) -> Result<(), VoiceError> {
        let call = self.manager.get(guild_id).ok_or(VoiceError::NotConnected)?;
        let mut handler = call.lock().await;
        let source = File::new(path.to_path_buf());
        handler.play_only_input(source.into());
        Ok(())
    }

    #[instrument(skip_all)]
    async fn stop(&self, guild_id: GuildId) -> Result<(), VoiceError> {
        let call = self.manager.get(guild_id).ok_or(VoiceError::NotConnected)?;
        call.lock().await.stop();
        Ok(())
    }

    #[instrument(skip_all)]
    async fn leave(&self, guild_id: GuildId) -> Result<(), VoiceError> {
        self.manager.remove(guild_id).await?;
        info!("Left voice in guild {}", guild_id);
        Ok(())
    }
}

/// Logs tracks that fail to start or decode
struct TrackErrorLogger {
    guild_id: GuildId,
}

#[async_trait]
impl VoiceEventHandler for TrackErrorLogger {
    #[instrument(name = "track_error", skip_all)]
    async fn act(&self, ctx: &EventContext<'_>) -> Option<Event> {
        if let EventContext::Track(tracks) = ctx {
            for (state, handle) in tracks.iter() {
                error!(
                    guild_id = %self.guild_id,
                    track = %handle.uuid(),
                    "Player error: {:?}",
                    state.playing
                );
            }
        }

        None
    }
}
