//! jukebox_bot
//!
//! A Discord bot answering `!` commands: dice rolls, and playback of songs
//! from a local directory in the caller's voice channel.

mod logger;

mod bot;
mod cli;
mod commands;
mod config;
mod router;
mod session;
#[cfg(test)]
mod testing;
mod voice;

use clap::Parser;
use cli::Cli;
use config::Config;
use logger::{log_msg, ConsoleFormat};
use tracing::{error, instrument};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "info,jukebox_bot=debug".into()))
        .with(tracing_subscriber::fmt::layer().event_format(ConsoleFormat))
        .init();

    let cli = Cli::parse();

    let config = load_config(cli.token);

    if let Err(e) = bot::run(config).await {
        error!("Bot error: {}", e);
        std::process::exit(1);
    }
}

/// No token, no connection attempt
#[instrument(skip_all)]
fn load_config(token_flag: Option<String>) -> Config {
    match Config::load(token_flag) {
        Ok(c) => c,
        Err(e) => {
            log_msg!("error", "{}", e);
            std::process::exit(-1);
        }
    }
}
