//! Chat session access for handlers
//!
//! Handlers talk to Discord only through [`ChatSession`], which the
//! production code backs with a serenity [`Context`].

use async_trait::async_trait;
use serenity::all::{ChannelId, Context, CreateMessage, GuildId, Message, UserId};

/// What the bot can do with its gateway/HTTP session
#[async_trait]
pub trait ChatSession: Send + Sync {
    /// The bot's own user
    fn current_user_id(&self) -> UserId;

    /// Post a plain text message
    async fn send(&self, channel_id: ChannelId, text: &str) -> Result<(), serenity::Error>;

    /// Voice channel `user_id` is currently connected to in `guild_id`
    fn voice_channel_of(&self, guild_id: GuildId, user_id: UserId) -> Option<ChannelId>;

    /// Number of members (bot included) connected to a voice channel
    fn channel_member_count(&self, guild_id: GuildId, channel_id: ChannelId) -> usize;
}

/// [`ChatSession`] over a serenity event context
pub struct SerenitySession {
    ctx: Context,
}

impl SerenitySession {
    pub fn new(ctx: Context) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl ChatSession for SerenitySession {
    fn current_user_id(&self) -> UserId {
        self.ctx.cache.current_user().id
    }

    async fn send(&self, channel_id: ChannelId, text: &str) -> Result<(), serenity::Error> {
        let msg = CreateMessage::new().content(text);
        channel_id.send_message(&self.ctx.http, msg).await?;
        Ok(())
    }

    fn voice_channel_of(&self, guild_id: GuildId, user_id: UserId) -> Option<ChannelId> {
        let guild = self.ctx.cache.guild(guild_id)?;
        guild.voice_states.get(&user_id).and_then(|vs| vs.channel_id)
    }

    fn channel_member_count(&self, guild_id: GuildId, channel_id: ChannelId) -> usize {
        match self.ctx.cache.guild(guild_id) {
            Some(guild) => guild
                .voice_states
                .values()
                .filter(|vs| vs.channel_id == Some(channel_id))
                .count(),
            None => 0,
        }
    }
}

/// The parts of a gateway message the router needs
#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub author_id: UserId,
    /// `name#discriminator`, for logs
    pub author_tag: String,
    pub channel_id: ChannelId,
    pub guild_id: Option<GuildId>,
    pub content: String,
}

impl From<&Message> for InboundMessage {
    fn from(msg: &Message) -> Self {
        Self {
            author_id: msg.author.id,
            author_tag: msg.author.tag(),
            channel_id: msg.channel_id,
            guild_id: msg.guild_id,
            content: msg.content.clone(),
        }
    }
}
