//! Command dispatch: bridges CLI args -> core controllers -> output formatting.

pub mod adoptions;
pub mod animals;
pub mod config_cmd;
pub mod donations;
pub mod lost_found;
pub mod messages;
pub mod rules;
pub mod stats;
pub mod submit;
pub mod util;
pub mod volunteers;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a backend-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Animals(args) => animals::handle(args, global).await,
        Command::Adoptions(args) => adoptions::handle(args, global).await,
        Command::Donations(args) => donations::handle(args, global).await,
        Command::Volunteers(args) => volunteers::handle(args, global).await,
        Command::Messages(args) => messages::handle(args, global).await,
        Command::LostFound(args) => lost_found::handle(args, global).await,
        Command::Rules(args) => rules::handle(args, global).await,
        Command::Stats => stats::handle(global).await,
        Command::Activity => stats::activity(global).await,
        Command::Submit(args) => submit::handle(args, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => Err(CliError::Internal(
            "config and completions are handled before dispatch".into(),
        )),
    }
}
