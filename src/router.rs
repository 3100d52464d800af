//! Session event routing
//!
//! Ready, message and voice-state events end up here. Messages go to the
//! command dispatcher; voice-state changes may make the bot leave a channel
//! it is alone in.

use dashmap::DashSet;
use serenity::all::GuildId;
use std::sync::Arc;
use tracing::{error, info, instrument};

use crate::commands::{CommandRegistry, Dispatch, Invocation};
use crate::config::Config;
use crate::logger::log_msg;
use crate::session::{ChatSession, InboundMessage};
use crate::voice::VoiceManager;

pub struct Router {
    config: Arc<Config>,
    registry: Arc<CommandRegistry>,
    /// Guilds with an auto-leave in flight
    departing: DashSet<GuildId>,
}

impl Router {
    pub fn new(config: Arc<Config>, registry: Arc<CommandRegistry>) -> Self {
        Self {
            config,
            registry,
            departing: DashSet::new(),
        }
    }

    #[instrument(skip_all)]
    pub fn on_ready(&self, user_tag: &str) {
        log_msg!("info", "logged on as <{}>", user_tag);
    }

    /// Returns `None` for the bot's own messages, which are never dispatched
    #[instrument(skip_all)]
    pub async fn on_message(
        &self,
        session: &dyn ChatSession,
        voice: &dyn VoiceManager,
        msg: &InboundMessage,
    ) -> Option<Dispatch> {
        if msg.author_id == session.current_user_id() {
            return None;
        }

        log_msg!("debug", "message from <{}>: \"{}\"", msg.author_tag, msg.content);

        let inv = Invocation {
            content: &msg.content,
            author_id: msg.author_id,
            channel_id: msg.channel_id,
            guild_id: msg.guild_id,
            session,
            voice,
            config: &self.config,
            registry: &self.registry,
        };
        Some(self.registry.dispatch(&inv).await)
    }

    /// Leave the guild's voice channel once the bot is its only member.
    /// Returns whether a disconnect was issued.
    #[instrument(skip_all)]
    pub async fn on_voice_state_update(
        &self,
        session: &dyn ChatSession,
        voice: &dyn VoiceManager,
        guild_id: Option<GuildId>,
    ) -> bool {
        let Some(guild_id) = guild_id else {
            return false;
        };
        let Some(channel_id) = voice.current_channel(guild_id).await else {
            return false;
        };
        if session.channel_member_count(guild_id, channel_id) != 1 {
            return false;
        }
        if !self.departing.insert(guild_id) {
            return false;
        }

        let result = voice.leave(guild_id).await;
        self.departing.remove(&guild_id);

        match result {
            Ok(()) => {
                info!("Left {} in guild {}: no one else is listening", channel_id, guild_id);
                true
            }
            Err(e) => {
                error!("Failed to leave voice in guild {}: {}", guild_id, e);
                false
            }
        }
    }
}
