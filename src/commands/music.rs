//! Local song playback: `!play`, `!list`, `!scram`

use async_trait::async_trait;
use tracing::{info, instrument};

use super::args::{Args, Param};
use super::{CommandDescriptor, CommandError, CommandHandler, Invocation};

pub fn play_descriptor() -> CommandDescriptor {
    CommandDescriptor::new("play", "Play a song from local filesystem", Play)
        .param(Param::text("query"))
}

pub fn list_descriptor() -> CommandDescriptor {
    CommandDescriptor::new("list", "List all available songs", List)
}

pub fn scram_descriptor() -> CommandDescriptor {
    CommandDescriptor::new("scram", "Disconnect the bot from voice chat", Scram)
}

/// Joins the author's voice channel if needed and plays `<songs_dir>/<query>.mp3`
pub struct Play;

#[async_trait]
impl CommandHandler for Play {
    #[instrument(name = "play", skip_all)]
    async fn call(&self, inv: &Invocation<'_>, args: Args) -> Result<(), CommandError> {
        let guild_id = inv.require_guild()?;
        let query = args.text(0).unwrap_or_default();

        if inv.voice.current_channel(guild_id).await.is_none() {
            let channel_id = inv
                .session
                .voice_channel_of(guild_id, inv.author_id)
                .ok_or(CommandError::AuthorNotInVoice)?;
            inv.voice.join(guild_id, channel_id).await?;
        }

        // The file is not checked here; a missing one fails inside the player
        let path = inv.config.song_path(query);
        inv.voice.play_file(guild_id, &path).await?;
        info!("Playing {:?} in guild {}", path, guild_id);

        inv.reply(&format!("Now playing: {}", query)).await
    }
}

/// One message per regular file in the songs directory, after a header
pub struct List;

#[async_trait]
impl CommandHandler for List {
    #[instrument(name = "list", skip_all)]
    async fn call(&self, inv: &Invocation<'_>, _args: Args) -> Result<(), CommandError> {
        inv.reply("Songs: ").await?;

        let mut entries = tokio::fs::read_dir(&inv.config.songs_dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_file() {
                let name = entry.file_name();
                inv.reply(&format!(" - {}", name.to_string_lossy())).await?;
            }
        }
        Ok(())
    }
}

/// Stops playback and leaves the voice channel
pub struct Scram;

#[async_trait]
impl CommandHandler for Scram {
    #[instrument(name = "scram", skip_all)]
    async fn call(&self, inv: &Invocation<'_>, _args: Args) -> Result<(), CommandError> {
        let guild_id = inv.require_guild()?;
        if inv.voice_connection().await.is_none() {
            return Err(CommandError::NoVoiceConnection);
        }

        inv.voice.stop(guild_id).await?;
        inv.voice.leave(guild_id).await?;
        Ok(())
    }
}
