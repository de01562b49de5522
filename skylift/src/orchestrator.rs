//! Composition of the full provision-then-bootstrap flow and the
//! symmetric destroy flow.
//!
//! Every step is a blocking call whose inputs depend on the previous
//! step's output; nothing here runs concurrently. The engine and the
//! remote transport are injected so the pipeline can be exercised against
//! stubs.

use std::fs;
use std::path::{Path, PathBuf};

use skylift_core::error::{DeployError, Result};
use skylift_core::workspace::{Workspace, WorkspaceStrategy};
use skylift_infra::credentials::ensure_keypair;
use skylift_infra::source::clone_repo;
use skylift_infra::terraform::{
    substitute_project_id, TerraformCli, BOOTSTRAP_SCRIPT_FILE, DECLARATION_FILE,
    HOST_ADDRESS_OUTPUT, PUBLIC_KEY_VAR,
};
use skylift_infra::{DeploymentAssets, Engine};
use skylift_remote::{pack_directory, BootstrapRunner};
use tracing::info;

/// Conventional fallback when the upstream analysis did not report a port.
pub const DEFAULT_EXPOSED_PORT: u16 = 8080;

/// Workspace member names owned by the orchestrator.
pub const CONTENT_DIR_NAME: &str = "content";
pub const CONTENT_ARCHIVE_NAME: &str = "app-content.tar.gz";

/// Where the application content comes from.
#[derive(Debug, Clone)]
pub enum ContentSource {
    /// An already-prepared local directory, packaged as-is.
    LocalDir(PathBuf),
    /// A repository cloned into the workspace via the version control client.
    GitRepo(String),
}

#[derive(Debug, Clone)]
pub struct DeployOptions {
    /// Resolved once at process start; nothing downstream reads ambient
    /// cloud configuration.
    pub project_id: String,
    pub auto_approve: bool,
    pub strategy: WorkspaceStrategy,
}

/// Builds the engine for a given workspace directory. The indirection
/// exists so tests can substitute a stub engine.
pub type EngineFactory<'a> = &'a dyn Fn(&Path) -> Result<Box<dyn Engine>>;

/// The production factory: the Terraform CLI.
pub fn terraform_factory(workdir: &Path) -> Result<Box<dyn Engine>> {
    Ok(Box::new(TerraformCli::new(workdir)?))
}

/// Provisions infrastructure from the generated assets and bootstraps the
/// application on the resulting host. Returns the reachable endpoint.
///
/// The workspace is removed on every exit path; a failure anywhere in the
/// sequence aborts the remaining steps but still releases the workspace.
pub fn deploy(
    assets: &DeploymentAssets,
    content: &ContentSource,
    options: &DeployOptions,
    engine_for: EngineFactory,
    bootstrap: &dyn BootstrapRunner,
) -> Result<String> {
    let workspace = Workspace::acquire(options.strategy.clone())?;
    let endpoint = run_pipeline(&workspace, assets, content, options, engine_for, bootstrap)?;
    workspace.release()?;
    Ok(endpoint)
}

fn run_pipeline(
    workspace: &Workspace,
    assets: &DeploymentAssets,
    content: &ContentSource,
    options: &DeployOptions,
    engine_for: EngineFactory,
    bootstrap: &dyn BootstrapRunner,
) -> Result<String> {
    let declaration = substitute_project_id(assets.declaration.text()?, &options.project_id);
    workspace.write_file(DECLARATION_FILE, &declaration)?;
    let script_path = workspace.write_executable(BOOTSTRAP_SCRIPT_FILE, &assets.bootstrap_script)?;
    info!("Staged declaration and bootstrap script in workspace");

    let keypair = ensure_keypair(workspace.path())?;
    let content_dir = prepare_content(workspace, content)?;

    let engine = engine_for(workspace.path())?;
    engine.initialize()?;
    engine.apply(
        options.auto_approve,
        &[(PUBLIC_KEY_VAR, keypair.public_key.as_str())],
    )?;
    let host = engine.output_value(HOST_ADDRESS_OUTPUT)?;
    info!("Provisioned host address: {}", host);

    let archive_path = workspace.path().join(CONTENT_ARCHIVE_NAME);
    pack_directory(&content_dir, &archive_path)?;

    bootstrap.run(&host, &keypair.private_key_path, &script_path, &archive_path)?;

    let port = assets.exposed_port.unwrap_or(DEFAULT_EXPOSED_PORT);
    Ok(format!("http://{}:{}", host, port))
}

fn prepare_content(workspace: &Workspace, content: &ContentSource) -> Result<PathBuf> {
    match content {
        ContentSource::LocalDir(dir) => {
            if !dir.is_dir() {
                return Err(DeployError::Config(format!(
                    "Content directory does not exist: {}",
                    dir.display()
                )));
            }
            Ok(dir.clone())
        }
        ContentSource::GitRepo(url) => {
            let dest = workspace.path().join(CONTENT_DIR_NAME);
            clone_repo(url, &dest)?;
            Ok(dest)
        }
    }
}

/// Tears down everything the engine provisioned from `workdir`.
///
/// Safe to invoke with no prior apply: a missing workspace is a no-op
/// rather than a failure. On success the workspace directory is removed,
/// completing the symmetric lifecycle.
pub fn destroy(workdir: &Path, auto_approve: bool, engine_for: EngineFactory) -> Result<()> {
    if !workdir.exists() {
        info!(
            "Workspace not found at {}; nothing to destroy",
            workdir.display()
        );
        return Ok(());
    }

    let engine = engine_for(workdir)?;
    engine.initialize()?;
    engine.destroy(auto_approve)?;
    fs::remove_dir_all(workdir)?;
    Ok(())
}
