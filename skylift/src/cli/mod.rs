// CLI argument parsing and definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "skylift")]
#[command(about = "Provision and bootstrap generated cloud deployments")]
#[command(version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Provision infrastructure and bootstrap the application
    Deploy {
        /// Path to the generated deployment assets document (JSON)
        #[arg(long)]
        assets: PathBuf,

        /// Repository URL cloned as the application content
        #[arg(long, conflicts_with = "content")]
        repo: Option<String>,

        /// Local directory packaged as the application content
        #[arg(long)]
        content: Option<PathBuf>,

        /// Cloud project id (read from gcloud config when omitted)
        #[arg(long)]
        project: Option<String>,

        /// Approve engine actions without a prompt
        #[arg(long)]
        auto_approve: bool,

        /// Workspace directory (defaults to .skylift-workdir; concurrent
        /// invocations against the same directory are not supported)
        #[arg(long, conflicts_with = "ephemeral")]
        workspace: Option<PathBuf>,

        /// Use a fresh temporary workspace instead of the fixed directory
        #[arg(long)]
        ephemeral: bool,
    },
    /// Destroy all provisioned resources
    Destroy {
        /// Approve engine actions without a prompt
        #[arg(long)]
        auto_approve: bool,

        /// Workspace directory (defaults to .skylift-workdir)
        #[arg(long)]
        workspace: Option<PathBuf>,
    },
}
