//! Scratch directory management for one orchestration run.
//!
//! A workspace holds the staged declaration, bootstrap script, generated
//! key pair and packaged content archive. It exists for exactly one
//! invocation and is removed on every exit path, success or failure.

use std::env;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use crate::error::Result;
use tempfile::{Builder, TempDir};
use tracing::{debug, warn};

/// Well-known directory name used by the fixed workspace strategy.
pub const FIXED_WORKDIR_NAME: &str = ".skylift-workdir";

/// How the scratch directory is chosen.
///
/// `Fixed` reuses one well-known path, which lets a later `destroy` find
/// engine state left behind by a killed run, but forbids concurrent
/// invocations. `Ephemeral` creates a fresh temporary directory per run and
/// is safe to use concurrently.
#[derive(Debug, Clone)]
pub enum WorkspaceStrategy {
    Fixed(PathBuf),
    Ephemeral,
}

impl WorkspaceStrategy {
    /// The default fixed path: `.skylift-workdir` under the current directory.
    pub fn fixed_default() -> Result<Self> {
        Ok(WorkspaceStrategy::Fixed(
            env::current_dir()?.join(FIXED_WORKDIR_NAME),
        ))
    }
}

/// An acquired scratch directory. Dropping the handle removes the
/// directory recursively, so release runs on every exit path; call
/// [`Workspace::release`] explicitly where a removal failure should be
/// surfaced instead of logged.
#[derive(Debug)]
pub struct Workspace {
    root: PathBuf,
    temp: Option<TempDir>,
    released: bool,
}

impl Workspace {
    pub fn acquire(strategy: WorkspaceStrategy) -> Result<Self> {
        match strategy {
            WorkspaceStrategy::Fixed(path) => {
                fs::create_dir_all(&path)?;
                debug!("Acquired fixed workspace at {}", path.display());
                Ok(Self {
                    root: path,
                    temp: None,
                    released: false,
                })
            }
            WorkspaceStrategy::Ephemeral => {
                let temp = Builder::new().prefix("skylift-").tempdir()?;
                let root = temp.path().to_path_buf();
                debug!("Acquired ephemeral workspace at {}", root.display());
                Ok(Self {
                    root,
                    temp: Some(temp),
                    released: false,
                })
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Writes `contents` to `name` inside the workspace.
    pub fn write_file(&self, name: &str, contents: &str) -> Result<PathBuf> {
        let path = self.root.join(name);
        fs::write(&path, contents)?;
        Ok(path)
    }

    /// Writes `contents` to `name` and marks the file executable (0755).
    pub fn write_executable(&self, name: &str, contents: &str) -> Result<PathBuf> {
        let path = self.write_file(name, contents)?;
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755))?;
        Ok(path)
    }

    /// Removes the workspace directory, surfacing any removal error.
    pub fn release(mut self) -> Result<()> {
        self.released = true;
        match self.temp.take() {
            Some(temp) => temp.close()?,
            None => fs::remove_dir_all(&self.root)?,
        }
        debug!("Released workspace at {}", self.root.display());
        Ok(())
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        let result = match self.temp.take() {
            Some(temp) => temp.close(),
            None => fs::remove_dir_all(&self.root),
        };
        if let Err(e) = result {
            warn!(
                "Failed to remove workspace at {}: {}",
                self.root.display(),
                e
            );
        }
    }
}
