//! `!help [command]`

use async_trait::async_trait;
use std::fmt::Write as _;
use tracing::instrument;

use super::args::{Args, Param};
use super::{CommandDescriptor, CommandError, CommandHandler, CommandRegistry, Invocation};

pub fn descriptor() -> CommandDescriptor {
    CommandDescriptor::new("help", "Shows this message", Help)
        .param(Param::text("command").optional())
}

pub struct Help;

#[async_trait]
impl CommandHandler for Help {
    #[instrument(name = "help", skip_all)]
    async fn call(&self, inv: &Invocation<'_>, args: Args) -> Result<(), CommandError> {
        let text = match args.text(0) {
            Some(name) => command_help(inv.registry, name),
            None => overview(inv.registry, &inv.config.description),
        };
        inv.reply(&text).await
    }
}

fn overview(registry: &CommandRegistry, description: &str) -> String {
    let commands = registry.commands();
    let width = commands.iter().map(|c| c.name.len()).max().unwrap_or(0);

    let mut text = String::from("```\n");
    if !description.is_empty() {
        let _ = writeln!(text, "{}\n", description);
    }
    text.push_str("Commands:\n");
    for command in commands {
        let _ = writeln!(text, "  {:<width$}  {}", command.name, command.brief, width = width);
    }
    let _ = writeln!(text, "\nType {}help command for more info on a command.", registry.prefix());
    text.push_str("```");
    text
}

fn command_help(registry: &CommandRegistry, name: &str) -> String {
    match registry.get(name) {
        Some(command) => format!("```\n{}\n\n{}\n```", command.usage(registry.prefix()), command.brief),
        None => format!("No command called \"{}\" found.", name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{standard_registry, Dispatch};
    use crate::testing::Harness;

    #[test]
    fn test_overview_lists_every_command() {
        let registry = standard_registry("!").unwrap();
        let text = overview(&registry, "My discord bot.");
        assert!(text.starts_with("```\nMy discord bot.\n\nCommands:\n"));
        assert!(text.contains("  roll   Generate random number between 1 and <arg>\n"));
        assert!(text.contains("  scram  Disconnect the bot from voice chat\n"));
        assert!(text.ends_with("Type !help command for more info on a command.\n```"));
        let help = text.find("help ").unwrap();
        let list = text.find("list ").unwrap();
        assert!(help < list);
    }

    #[tokio::test]
    async fn test_help_for_one_command() {
        let h = Harness::new();
        let registry = standard_registry("!").unwrap();
        assert_eq!(h.dispatch(&registry, "!help play").await, Dispatch::Completed);
        assert_eq!(h.dispatch(&registry, "!help dance").await, Dispatch::Completed);
        assert_eq!(
            h.session.sent_texts(),
            [
                "```\n!play <query>\n\nPlay a song from local filesystem\n```",
                "No command called \"dance\" found.",
            ]
        );
    }
}
