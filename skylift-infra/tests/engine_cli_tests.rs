//! Drives the real `TerraformCli` against a fake `terraform` binary
//! planted on PATH, asserting the exact subcommand sequence.

use std::fs;
use std::os::unix::fs::PermissionsExt;

use skylift_core::error::DeployError;
use skylift_infra::terraform::TerraformCli;
use skylift_infra::Engine;
use tempfile::TempDir;

#[test]
fn drives_the_engine_cli_through_the_full_lifecycle() -> anyhow::Result<()> {
    let scratch = TempDir::new()?;
    let bin_dir = scratch.path().join("bin");
    let workdir = scratch.path().join("workdir");
    fs::create_dir_all(&bin_dir)?;
    fs::create_dir_all(&workdir)?;

    let call_log = scratch.path().join("calls.log");
    let script = format!(
        "#!/bin/sh\necho \"$@\" >> {}\nif [ \"$1\" = \"output\" ]; then\n  echo '{{\"nat_ip\": {{\"value\": \"203.0.113.5\"}}}}'\nfi\nexit 0\n",
        call_log.display()
    );
    let fake = bin_dir.join("terraform");
    fs::write(&fake, script)?;
    fs::set_permissions(&fake, fs::Permissions::from_mode(0o755))?;

    let original_path = std::env::var("PATH").unwrap_or_default();
    std::env::set_var("PATH", format!("{}:{}", bin_dir.display(), original_path));

    let cli = TerraformCli::new(&workdir)?;
    cli.initialize()?;
    cli.apply(true, &[("ssh_public_key", "ssh-rsa AAAA skylift")])?;
    assert_eq!(cli.output_value("nat_ip")?, "203.0.113.5");

    let err = cli
        .output_value("lb_address")
        .expect_err("absent output must fail");
    assert!(matches!(err, DeployError::MissingOutput(name) if name == "lb_address"));

    cli.destroy(true)?;

    let calls = fs::read_to_string(&call_log)?;
    let lines: Vec<&str> = calls.lines().collect();
    assert_eq!(lines[0], "init -input=false");
    assert!(lines[1].starts_with("apply -input=false -auto-approve"));
    assert!(lines[1].contains("-var=ssh_public_key=ssh-rsa AAAA skylift"));
    assert_eq!(lines[2], "output -json");
    assert_eq!(lines[3], "output -json");
    assert_eq!(lines[4], "destroy -auto-approve");
    Ok(())
}
