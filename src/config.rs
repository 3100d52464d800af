//! Configuration management for the jukebox bot
//!
//! The bot token comes from the command line or the environment; everything
//! else is read from environment variables (.env file).

use std::env;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable holding the bot token
pub const TOKEN_ENV: &str = "BOT_TOKEN";

pub const DEFAULT_PREFIX: &str = "!";
pub const DEFAULT_SONGS_DIR: &str = "music";
pub const DEFAULT_DESCRIPTION: &str = "My discord bot.";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("save your token in the BOT_TOKEN env variable!")]
    MissingToken,
    #[error("Invalid value for {0}: {1:?}")]
    InvalidValue(String, String),
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Discord bot token
    pub token: String,
    /// Command prefix
    pub prefix: String,
    /// Directory holding the playable `.mp3` files
    pub songs_dir: PathBuf,
    /// Shown at the top of `help`
    pub description: String,
}

impl Config {
    /// Load configuration, preferring `token_flag` over `BOT_TOKEN`
    pub fn load(token_flag: Option<String>) -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let token = resolve_token(token_flag, env::var(TOKEN_ENV).ok())?;

        let prefix = env::var("COMMAND_PREFIX")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_PREFIX.to_string());
        if prefix.chars().any(char::is_whitespace) {
            return Err(ConfigError::InvalidValue("COMMAND_PREFIX".to_string(), prefix));
        }

        let songs_dir = env::var("SONGS_DIR")
            .unwrap_or_else(|_| DEFAULT_SONGS_DIR.to_string())
            .into();

        let description = env::var("BOT_DESCRIPTION")
            .unwrap_or_else(|_| DEFAULT_DESCRIPTION.to_string());

        Ok(Self {
            token,
            prefix,
            songs_dir,
            description,
        })
    }

    /// Path of the file played for `query`
    pub fn song_path(&self, query: &str) -> PathBuf {
        song_path(&self.songs_dir, query)
    }
}

/// Concatenates rather than joins: an absolute `query` stays under `songs_dir`
fn song_path(songs_dir: &Path, query: &str) -> PathBuf {
    let mut path = songs_dir.as_os_str().to_owned();
    path.push("/");
    path.push(query);
    path.push(".mp3");
    PathBuf::from(path)
}

/// Pick the token: an explicit flag wins, then the environment. Empty values
/// count as absent.
pub fn resolve_token(flag: Option<String>, env: Option<String>) -> Result<String, ConfigError> {
    flag.filter(|t| !t.is_empty())
        .or_else(|| env.filter(|t| !t.is_empty()))
        .ok_or(ConfigError::MissingToken)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_wins_over_env() {
        let token = resolve_token(Some("from-flag".into()), Some("from-env".into())).unwrap();
        assert_eq!(token, "from-flag");
    }

    #[test]
    fn test_env_used_without_flag() {
        let token = resolve_token(None, Some("from-env".into())).unwrap();
        assert_eq!(token, "from-env");
        let token = resolve_token(Some(String::new()), Some("from-env".into())).unwrap();
        assert_eq!(token, "from-env");
    }

    #[test]
    fn test_missing_token() {
        let err = resolve_token(None, None).unwrap_err();
        assert!(matches!(err, ConfigError::MissingToken));
        assert_eq!(err.to_string(), "save your token in the BOT_TOKEN env variable!");
        assert!(resolve_token(None, Some(String::new())).is_err());
    }

    #[test]
    fn test_song_path() {
        let path = song_path(Path::new("/srv/music"), "never gonna");
        assert_eq!(path, PathBuf::from("/srv/music/never gonna.mp3"));
    }

    #[test]
    fn test_absolute_query_stays_in_songs_dir() {
        let path = song_path(Path::new("/srv/music"), "/etc/secret");
        assert!(path.starts_with("/srv/music"), "{path:?}");
        assert_eq!(path, PathBuf::from("/srv/music//etc/secret.mp3"));
    }
}
