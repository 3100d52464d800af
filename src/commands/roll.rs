//! `!roll <max_val>`: random number between 1 and `max_val`

use async_trait::async_trait;
use rand::Rng;
use tracing::instrument;

use super::args::{Args, Param};
use super::{CommandDescriptor, CommandError, CommandHandler, Invocation, ReplyWithError};

pub fn descriptor() -> CommandDescriptor {
    CommandDescriptor::new("roll", "Generate random number between 1 and <arg>", Roll)
        .param(Param::integer("max_val"))
        .on_error(ReplyWithError)
}

pub struct Roll;

pub fn roll(max_val: i64) -> Result<i64, CommandError> {
    if max_val < 1 {
        return Err(CommandError::InvalidArgument(
            "argument <max_val> must be at least 1".to_string(),
        ));
    }
    Ok(rand::thread_rng().gen_range(1..=max_val))
}

#[async_trait]
impl CommandHandler for Roll {
    #[instrument(name = "roll", skip_all)]
    async fn call(&self, inv: &Invocation<'_>, args: Args) -> Result<(), CommandError> {
        let max_val = args
            .integer(0)
            .ok_or_else(|| CommandError::InvalidArgument("argument <max_val> is required".to_string()))?;
        let value = roll(max_val)?;
        inv.reply(&value.to_string()).await
    }
}
