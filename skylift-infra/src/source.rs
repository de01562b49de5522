//! Application content retrieval via the version control client.

use std::env;
use std::path::Path;

use skylift_core::command_stream::stream_command;
use skylift_core::error::Result;
use tracing::info;

/// Clones `repo_url` into `dest` (which must not exist yet), streaming the
/// client's progress output.
pub fn clone_repo(repo_url: &str, dest: &Path) -> Result<()> {
    info!("Cloning repository: {}", repo_url);
    let dest = dest.to_string_lossy();
    stream_command("git", &["clone", repo_url, dest.as_ref()], &env::current_dir()?)?;
    info!("Repository cloned successfully");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn clone_from_local_path_materializes_the_tree() -> anyhow::Result<()> {
        let scratch = TempDir::new()?;
        let origin = scratch.path().join("origin");
        std::fs::create_dir_all(&origin)?;
        std::fs::write(origin.join("app.py"), "print('hi')\n")?;

        // Build a throwaway git repo to clone from.
        let run = |args: &[&str]| stream_command("git", args, &origin);
        run(&["init", "-q"])?;
        run(&["-c", "user.email=t@t", "-c", "user.name=t", "add", "."])?;
        run(&["-c", "user.email=t@t", "-c", "user.name=t", "commit", "-q", "-m", "init"])?;

        let dest = scratch.path().join("clone");
        clone_repo(&origin.to_string_lossy(), &dest)?;
        assert!(dest.join("app.py").exists());
        Ok(())
    }
}
