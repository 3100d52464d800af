//! In-memory stand-ins for the Discord session and songbird

use async_trait::async_trait;
use serenity::all::{ChannelId, GuildId, UserId};
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tracing::{Level, Subscriber};

use crate::commands::{CommandRegistry, Dispatch, Invocation};
use crate::config::Config;
use crate::logger::ConsoleFormat;
use crate::session::ChatSession;
use crate::voice::{VoiceError, VoiceManager};

pub const BOT: UserId = UserId::new(1);
pub const AUTHOR: UserId = UserId::new(2);
pub const GUILD: GuildId = GuildId::new(10);
pub const CHANNEL: ChannelId = ChannelId::new(100);
pub const VOICE: ChannelId = ChannelId::new(200);
pub const OTHER_VOICE: ChannelId = ChannelId::new(201);

/// Collects console log output written through [`ConsoleFormat`]
#[derive(Clone, Default)]
pub struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl LogCapture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Debug-level subscriber without colours writing into this capture
    pub fn subscriber(&self) -> impl Subscriber + Send + Sync + 'static {
        let writer = self.clone();
        tracing_subscriber::fmt()
            .with_ansi(false)
            .event_format(ConsoleFormat)
            .with_max_level(Level::DEBUG)
            .with_writer(move || writer.clone())
            .finish()
    }

    pub fn text(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

#[derive(Default)]
pub struct FakeSession {
    sent: Mutex<Vec<(ChannelId, String)>>,
    /// Voice channel per user, all in [`GUILD`]
    voice_states: Mutex<HashMap<UserId, ChannelId>>,
}

impl FakeSession {
    pub fn sent_texts(&self) -> Vec<String> {
        self.sent.lock().unwrap().iter().map(|(_, text)| text.clone()).collect()
    }

    pub fn put_in_voice(&self, user_id: UserId, channel_id: ChannelId) {
        self.voice_states.lock().unwrap().insert(user_id, channel_id);
    }
}

#[async_trait]
impl ChatSession for FakeSession {
    fn current_user_id(&self) -> UserId {
        BOT
    }

    async fn send(&self, channel_id: ChannelId, text: &str) -> Result<(), serenity::Error> {
        self.sent.lock().unwrap().push((channel_id, text.to_string()));
        Ok(())
    }

    fn voice_channel_of(&self, guild_id: GuildId, user_id: UserId) -> Option<ChannelId> {
        if guild_id != GUILD {
            return None;
        }
        self.voice_states.lock().unwrap().get(&user_id).copied()
    }

    fn channel_member_count(&self, guild_id: GuildId, channel_id: ChannelId) -> usize {
        if guild_id != GUILD {
            return 0;
        }
        self.voice_states
            .lock()
            .unwrap()
            .values()
            .filter(|c| **c == channel_id)
            .count()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoiceCall {
    Join(GuildId, ChannelId),
    Play(GuildId, PathBuf),
    Stop(GuildId),
    Leave(GuildId),
}

#[derive(Default)]
pub struct FakeVoice {
    connections: Mutex<HashMap<GuildId, ChannelId>>,
    calls: Mutex<Vec<VoiceCall>>,
}

impl FakeVoice {
    /// Pretend a connection already exists
    pub fn connect(&self, guild_id: GuildId, channel_id: ChannelId) {
        self.connections.lock().unwrap().insert(guild_id, channel_id);
    }

    pub fn current(&self, guild_id: GuildId) -> Option<ChannelId> {
        self.connections.lock().unwrap().get(&guild_id).copied()
    }

    pub fn calls(&self) -> Vec<VoiceCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: VoiceCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl VoiceManager for FakeVoice {
    async fn current_channel(&self, guild_id: GuildId) -> Option<ChannelId> {
        self.current(guild_id)
    }

    async fn join(&self, guild_id: GuildId, channel_id: ChannelId) -> Result<(), VoiceError> {
        self.record(VoiceCall::Join(guild_id, channel_id));
        self.connect(guild_id, channel_id);
        Ok(())
    }

    async fn play_file(&self, guild_id: GuildId, path: &Path) -> Result<(), VoiceError> {
        self.current(guild_id).ok_or(VoiceError::NotConnected)?;
        self.record(VoiceCall::Play(guild_id, path.to_path_buf()));
        Ok(())
    }

    async fn stop(&self, guild_id: GuildId) -> Result<(), VoiceError> {
        self.current(guild_id).ok_or(VoiceError::NotConnected)?;
        self.record(VoiceCall::Stop(guild_id));
        Ok(())
    }

    async fn leave(&self, guild_id: GuildId) -> Result<(), VoiceError> {
        self.record(VoiceCall::Leave(guild_id));
        // Give concurrently routed events a chance to observe the call
        tokio::task::yield_now().await;
        self.connections
            .lock()
            .unwrap()
            .remove(&guild_id)
            .map(|_| ())
            .ok_or(VoiceError::NotConnected)
    }
}

/// Fakes plus a config pointing at a fresh songs directory
pub struct Harness {
    pub session: FakeSession,
    pub voice: FakeVoice,
    pub config: Config,
    guild_id: Option<GuildId>,
    _songs: TempDir,
}

impl Harness {
    pub fn new() -> Self {
        let songs = tempfile::tempdir().unwrap();
        let config = Config {
            token: "test-token".into(),
            prefix: "!".into(),
            songs_dir: songs.path().to_path_buf(),
            description: "My discord bot.".into(),
        };
        Self {
            session: FakeSession::default(),
            voice: FakeVoice::default(),
            config,
            guild_id: Some(GUILD),
            _songs: songs,
        }
    }

    /// Invocations come from a private channel
    pub fn in_dm(mut self) -> Self {
        self.guild_id = None;
        self
    }

    pub async fn dispatch(&self, registry: &CommandRegistry, content: &str) -> Dispatch {
        let inv = Invocation {
            content,
            author_id: AUTHOR,
            channel_id: CHANNEL,
            guild_id: self.guild_id,
            session: &self.session,
            voice: &self.voice,
            config: &self.config,
            registry,
        };
        registry.dispatch(&inv).await
    }
}
