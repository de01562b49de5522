mod deploy;
mod destroy;

use crate::cli::{Args, Command};
use skylift_core::error::Result;

pub fn execute_command(args: Args) -> Result<()> {
    match args.command {
        Command::Deploy {
            assets,
            repo,
            content,
            project,
            auto_approve,
            workspace,
            ephemeral,
        } => deploy::handle_deploy(
            &assets,
            repo,
            content,
            project,
            auto_approve,
            workspace,
            ephemeral,
        ),
        Command::Destroy {
            auto_approve,
            workspace,
        } => destroy::handle_destroy(auto_approve, workspace),
    }
}
