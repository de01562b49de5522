use std::fs;
use std::path::{Path, PathBuf};

use skylift_core::error::{DeployError, Result};
use skylift_core::workspace::WorkspaceStrategy;
use skylift_core::{sky_println, sky_progress, sky_success};
use skylift_infra::credentials::resolve_project_id;
use skylift_infra::DeploymentAssets;
use skylift_remote::SshBootstrap;

use crate::orchestrator::{self, ContentSource, DeployOptions};

#[allow(clippy::too_many_arguments)]
pub fn handle_deploy(
    assets_path: &Path,
    repo: Option<String>,
    content: Option<PathBuf>,
    project: Option<String>,
    auto_approve: bool,
    workspace: Option<PathBuf>,
    ephemeral: bool,
) -> Result<()> {
    let assets = DeploymentAssets::from_json(&fs::read_to_string(assets_path)?)?;

    let content = match (repo, content) {
        (Some(url), _) => ContentSource::GitRepo(url),
        (None, Some(dir)) => ContentSource::LocalDir(dir),
        (None, None) => {
            return Err(DeployError::Config(
                "Either --repo or --content is required for deployment".to_string(),
            ))
        }
    };

    // Ambient configuration is read exactly once, before the pipeline starts.
    let project_id = match project {
        Some(id) => id,
        None => resolve_project_id()?,
    };

    let strategy = match (workspace, ephemeral) {
        (_, true) => WorkspaceStrategy::Ephemeral,
        (Some(dir), false) => WorkspaceStrategy::Fixed(dir),
        (None, false) => WorkspaceStrategy::fixed_default()?,
    };

    let options = DeployOptions {
        project_id,
        auto_approve,
        strategy,
    };

    sky_progress!("Provisioning and deploying...");
    let endpoint = orchestrator::deploy(
        &assets,
        &content,
        &options,
        &orchestrator::terraform_factory,
        &SshBootstrap::new(),
    )?;

    sky_success!("Deployment complete");
    sky_println!("{}", endpoint);
    Ok(())
}
