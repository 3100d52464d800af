//! Prefix command registry and dispatcher
//!
//! Commands are registered once at startup into a [`CommandRegistry`] and
//! looked up by name for every message that starts with the prefix.

pub mod args;
pub mod help;
pub mod music;
pub mod roll;

use async_trait::async_trait;
use serenity::all::{ChannelId, GuildId, UserId};
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::config::Config;
use crate::session::ChatSession;
use crate::voice::{VoiceError, VoiceManager};
use args::{Args, Param};

#[derive(Error, Debug)]
pub enum CommandError {
    #[error("{0}")]
    InvalidArgument(String),
    #[error("this command cannot be used in private messages")]
    GuildOnly,
    #[error("you are not connected to a voice channel")]
    AuthorNotInVoice,
    #[error("not connected to a voice channel")]
    NoVoiceConnection,
    #[error(transparent)]
    Voice(#[from] VoiceError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to send message: {0}")]
    Send(#[from] serenity::Error),
}

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("command {0:?} is already registered")]
    Duplicate(String),
}

/// Everything a handler can see for one command invocation
pub struct Invocation<'a> {
    pub content: &'a str,
    pub author_id: UserId,
    pub channel_id: ChannelId,
    pub guild_id: Option<GuildId>,
    pub session: &'a dyn ChatSession,
    pub voice: &'a dyn VoiceManager,
    pub config: &'a Config,
    pub registry: &'a CommandRegistry,
}

impl Invocation<'_> {
    /// Send `text` to the channel the command came from
    pub async fn reply(&self, text: &str) -> Result<(), CommandError> {
        self.session.send(self.channel_id, text).await?;
        Ok(())
    }

    pub fn require_guild(&self) -> Result<GuildId, CommandError> {
        self.guild_id.ok_or(CommandError::GuildOnly)
    }

    /// Channel of this guild's active voice connection
    pub async fn voice_connection(&self) -> Option<ChannelId> {
        match self.guild_id {
            Some(guild_id) => self.voice.current_channel(guild_id).await,
            None => None,
        }
    }
}

#[async_trait]
pub trait CommandHandler: Send + Sync {
    async fn call(&self, inv: &Invocation<'_>, args: Args) -> Result<(), CommandError>;
}

/// Called with the handler's error instead of logging it
#[async_trait]
pub trait ErrorHook: Send + Sync {
    async fn handle(&self, inv: &Invocation<'_>, error: &CommandError) -> Result<(), CommandError>;
}

/// Error hook that posts the error text to the invoking channel
pub struct ReplyWithError;

#[async_trait]
impl ErrorHook for ReplyWithError {
    async fn handle(&self, inv: &Invocation<'_>, error: &CommandError) -> Result<(), CommandError> {
        inv.reply(&error.to_string()).await
    }
}

/// Registered metadata for one command
pub struct CommandDescriptor {
    pub name: &'static str,
    pub brief: &'static str,
    pub params: Vec<Param>,
    handler: Box<dyn CommandHandler>,
    error_hook: Option<Box<dyn ErrorHook>>,
}

impl CommandDescriptor {
    pub fn new(name: &'static str, brief: &'static str, handler: impl CommandHandler + 'static) -> Self {
        Self {
            name,
            brief,
            params: Vec::new(),
            handler: Box::new(handler),
            error_hook: None,
        }
    }

    pub fn param(mut self, param: Param) -> Self {
        self.params.push(param);
        self
    }

    pub fn on_error(mut self, hook: impl ErrorHook + 'static) -> Self {
        self.error_hook = Some(Box::new(hook));
        self
    }

    /// `!roll <max_val>`
    pub fn usage(&self, prefix: &str) -> String {
        let mut usage = format!("{}{}", prefix, self.name);
        for param in &self.params {
            usage.push(' ');
            usage.push_str(&param.usage());
        }
        usage
    }
}

/// Result of feeding one message to the dispatcher
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// No prefix, or nothing after it
    NotACommand,
    /// Prefix followed by an unregistered name
    Unknown,
    /// Arguments did not match the command's parameters
    Rejected,
    Completed,
    /// The handler returned an error
    Failed,
}

pub struct CommandRegistry {
    prefix: String,
    commands: HashMap<&'static str, CommandDescriptor>,
}

impl CommandRegistry {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            commands: HashMap::new(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn register(&mut self, command: CommandDescriptor) -> Result<(), RegistryError> {
        if self.commands.contains_key(command.name) {
            return Err(RegistryError::Duplicate(command.name.to_string()));
        }
        self.commands.insert(command.name, command);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&CommandDescriptor> {
        self.commands.get(name)
    }

    /// Registered commands sorted by name
    pub fn commands(&self) -> Vec<&CommandDescriptor> {
        let mut commands: Vec<_> = self.commands.values().collect();
        commands.sort_by_key(|c| c.name);
        commands
    }

    /// Parse and run the command in `inv.content`
    pub async fn dispatch(&self, inv: &Invocation<'_>) -> Dispatch {
        let Some(body) = inv.content.strip_prefix(self.prefix.as_str()) else {
            return Dispatch::NotACommand;
        };
        if body.starts_with(char::is_whitespace) {
            return Dispatch::NotACommand;
        }
        let (name, rest) = args::split_word(body);
        if name.is_empty() {
            return Dispatch::NotACommand;
        }

        let Some(command) = self.commands.get(name) else {
            debug!("Ignoring unknown command {:?}", name);
            return Dispatch::Unknown;
        };

        let args = match args::parse(command.name, &command.params, rest) {
            Ok(args) => args,
            Err(e) => {
                debug!("Rejected arguments for {}: {}", command.name, e);
                if let Err(send_err) = inv.reply(&e.to_string()).await {
                    warn!("Failed to report argument error: {}", send_err);
                }
                return Dispatch::Rejected;
            }
        };

        match command.handler.call(inv, args).await {
            Ok(()) => Dispatch::Completed,
            Err(e) => {
                match &command.error_hook {
                    Some(hook) => {
                        if let Err(hook_err) = hook.handle(inv, &e).await {
                            error!("Error hook for {} failed: {}", command.name, hook_err);
                        }
                    }
                    None => error!("Command {} failed: {}", command.name, e),
                }
                Dispatch::Failed
            }
        }
    }
}

/// Registry with every command the bot offers
pub fn standard_registry(prefix: &str) -> Result<CommandRegistry, RegistryError> {
    let mut registry = CommandRegistry::new(prefix);
    registry.register(roll::descriptor())?;
    registry.register(music::play_descriptor())?;
    registry.register(music::list_descriptor())?;
    registry.register(music::scram_descriptor())?;
    registry.register(help::descriptor())?;
    Ok(registry)
}
