//! Drives `resolve_project_id` against a fake `gcloud` binary planted on
//! PATH, covering the unset, empty and configured cases.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

use skylift_core::error::DeployError;
use skylift_infra::credentials::resolve_project_id;
use tempfile::TempDir;

fn install_fake_gcloud(bin_dir: &Path, stdout: &str) -> anyhow::Result<()> {
    let fake = bin_dir.join("gcloud");
    fs::write(&fake, format!("#!/bin/sh\necho '{}'\nexit 0\n", stdout))?;
    fs::set_permissions(&fake, fs::Permissions::from_mode(0o755))?;
    Ok(())
}

// One test so the PATH mutation is never raced by a sibling.
#[test]
fn project_id_resolution_follows_the_gcloud_configuration() -> anyhow::Result<()> {
    let scratch = TempDir::new()?;
    let bin_dir = scratch.path().join("bin");
    fs::create_dir_all(&bin_dir)?;

    let original_path = std::env::var("PATH").unwrap_or_default();
    std::env::set_var("PATH", format!("{}:{}", bin_dir.display(), original_path));

    install_fake_gcloud(&bin_dir, "(unset)")?;
    let err = resolve_project_id().expect_err("unset project must fail");
    assert!(matches!(err, DeployError::Config(_)));

    install_fake_gcloud(&bin_dir, "")?;
    let err = resolve_project_id().expect_err("empty project must fail");
    assert!(matches!(err, DeployError::Config(_)));

    install_fake_gcloud(&bin_dir, "acme-prod-1234")?;
    assert_eq!(resolve_project_id()?, "acme-prod-1234");
    Ok(())
}
