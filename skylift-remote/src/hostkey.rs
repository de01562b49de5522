//! Host key verification strategies.
//!
//! The host was created moments ago by this same invocation and its
//! address came straight from the engine's outputs, so no prior trust
//! anchor can exist. The default strategy therefore trusts the first key
//! offered and records it. Callers needing stricter verification can
//! substitute their own [`HostKeyPolicy`] without touching session logic.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use skylift_core::error::{DeployError, Result};
use tracing::debug;

pub trait HostKeyPolicy {
    /// Inspects the key offered by `host` during the handshake. Returning
    /// an error aborts the connection attempt.
    fn verify(&self, host: &str, key_algorithm: &str, key: &[u8]) -> Result<()>;
}

/// Accepts any offered key and optionally records it in a
/// known-hosts-style file for later inspection.
#[derive(Debug, Default)]
pub struct TrustOnFirstUse {
    record_path: Option<PathBuf>,
}

impl TrustOnFirstUse {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn recording_to(path: PathBuf) -> Self {
        Self {
            record_path: Some(path),
        }
    }
}

impl HostKeyPolicy for TrustOnFirstUse {
    fn verify(&self, host: &str, key_algorithm: &str, key: &[u8]) -> Result<()> {
        debug!("Trusting host key ({}) offered by {}", key_algorithm, host);
        if let Some(path) = &self.record_path {
            let mut file = OpenOptions::new().create(true).append(true).open(path)?;
            writeln!(file, "{} {} {}", host, key_algorithm, BASE64.encode(key))?;
        }
        Ok(())
    }
}

/// Refuses every key. Useful as the conservative end of the policy
/// spectrum and in tests asserting that verification failures abort the
/// connection.
#[derive(Debug, Default)]
pub struct RejectAll;

impl HostKeyPolicy for RejectAll {
    fn verify(&self, host: &str, key_algorithm: &str, _key: &[u8]) -> Result<()> {
        Err(DeployError::Config(format!(
            "Host key verification refused for {} ({})",
            host, key_algorithm
        )))
    }
}
