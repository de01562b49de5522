pub use anyhow::bail;
use std::fmt::{self, Display, Formatter};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeployError {
    Config(String),
    ToolNotFound(String),
    Command {
        command: String,
        status: i32,
        tail: String,
    },
    UnreachableHost {
        host: String,
        attempts: u32,
        reason: String,
    },
    RemoteScript {
        status: i32,
        tail: String,
    },
    MissingOutput(String),
    Io(#[from] std::io::Error),
    Serialization(String),
    Internal(String),
    Other(#[from] anyhow::Error),
}

impl Display for DeployError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            DeployError::Config(s) => write!(f, "Configuration error: {}", s),
            DeployError::ToolNotFound(tool) => {
                write!(f, "Required tool not found in PATH: {}", tool)
            }
            DeployError::Command {
                command,
                status,
                tail,
            } => {
                write!(f, "Command failed with exit code {}: {}", status, command)?;
                if !tail.is_empty() {
                    write!(f, "\n\nOutput (tail):\n{}", tail)?;
                }
                Ok(())
            }
            DeployError::UnreachableHost {
                host,
                attempts,
                reason,
            } => write!(
                f,
                "Host {} unreachable after {} connection attempts: {}",
                host, attempts, reason
            ),
            DeployError::RemoteScript { status, tail } => {
                write!(f, "Bootstrap script failed on remote host (exit {})", status)?;
                if !tail.is_empty() {
                    write!(f, "\n\nRemote stderr (tail):\n{}", tail)?;
                }
                Ok(())
            }
            DeployError::MissingOutput(name) => write!(
                f,
                "Declaration did not expose the expected output '{}'",
                name
            ),
            DeployError::Io(e) => write!(f, "I/O error: {}", e),
            DeployError::Serialization(s) => write!(f, "Serialization error: {}", s),
            DeployError::Internal(s) => write!(f, "Internal error: {}", s),
            DeployError::Other(e) => write!(f, "Other error: {}", e),
        }
    }
}

impl From<serde_json::Error> for DeployError {
    fn from(err: serde_json::Error) -> Self {
        DeployError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DeployError>;
