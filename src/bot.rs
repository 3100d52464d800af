//! Discord Bot event handler and client setup

use crate::commands;
use crate::config::Config;
use crate::router::Router;
use crate::session::{InboundMessage, SerenitySession};
use crate::voice::SongbirdVoice;
use serenity::all::{Client, Context, EventHandler, GatewayIntents, Message, Ready, VoiceState};
use serenity::async_trait;
use songbird::{SerenityInit, Songbird};
use std::sync::Arc;
use tracing::info;

/// Main event handler for the bot
pub struct Handler {
    router: Router,
    voice: SongbirdVoice,
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, _ctx: Context, ready: Ready) {
        self.router.on_ready(&ready.user.tag());
    }

    async fn message(&self, ctx: Context, new_message: Message) {
        let session = SerenitySession::new(ctx);
        let msg = InboundMessage::from(&new_message);
        self.router.on_message(&session, &self.voice, &msg).await;
    }

    async fn voice_state_update(&self, ctx: Context, _old: Option<VoiceState>, new: VoiceState) {
        let session = SerenitySession::new(ctx);
        self.router
            .on_voice_state_update(&session, &self.voice, new.guild_id)
            .await;
    }
}

/// Create and run the Discord bot
pub async fn run(config: Config) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config = Arc::new(config);

    let registry = Arc::new(commands::standard_registry(&config.prefix)?);
    info!("Registered {} commands", registry.commands().len());

    let songbird = Songbird::serenity();
    let handler = Handler {
        router: Router::new(config.clone(), registry),
        voice: SongbirdVoice::new(songbird.clone()),
    };

    // Prefix commands need message content; voice states feed the cache
    let intents = GatewayIntents::non_privileged()
        | GatewayIntents::MESSAGE_CONTENT
        | GatewayIntents::GUILD_VOICE_STATES;

    let mut client = Client::builder(&config.token, intents)
        .event_handler(handler)
        .register_songbird_with(songbird)
        .await?;

    // Blocks until the gateway connection closes
    info!("Starting bot...");
    client.start().await?;

    Ok(())
}
