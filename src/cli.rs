use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "jukebox_bot", about = "Discord bot that plays songs from a local directory")]
pub struct Cli {
    /// input bot token (falls back to BOT_TOKEN)
    #[arg(short, long)]
    pub token: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_flag() {
        let cli = Cli::try_parse_from(["jukebox_bot", "--token", "abc"]).unwrap();
        assert_eq!(cli.token.as_deref(), Some("abc"));
        let cli = Cli::try_parse_from(["jukebox_bot", "-t", "xyz"]).unwrap();
        assert_eq!(cli.token.as_deref(), Some("xyz"));
    }

    #[test]
    fn test_token_is_optional() {
        let cli = Cli::try_parse_from(["jukebox_bot"]).unwrap();
        assert!(cli.token.is_none());
    }

    #[test]
    fn test_rejects_unknown_flags() {
        assert!(Cli::try_parse_from(["jukebox_bot", "--verbose"]).is_err());
    }
}
