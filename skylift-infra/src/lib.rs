//! Infrastructure provisioning layer.
//!
//! Owns the deployment assets model, the credential resolver and the
//! Terraform lifecycle driver. The engine sits behind the [`Engine`] trait
//! so the orchestrator can be exercised against a stub in tests.

use skylift_core::error::Result;

pub mod assets;
pub mod credentials;
pub mod source;
pub mod terraform;

pub use assets::{DeclarationSource, DeploymentAssets};
pub use credentials::{ensure_keypair, resolve_project_id, KeyPair};
pub use terraform::TerraformCli;

/// Lifecycle contract of the infrastructure-as-code engine.
///
/// `initialize` must succeed before any other operation and is safe to
/// re-run. `output_value` queries the engine's structured outputs after an
/// apply and fails with `MissingOutput` when the declaration did not
/// expose the requested key.
pub trait Engine {
    fn initialize(&self) -> Result<()>;
    fn apply(&self, auto_approve: bool, vars: &[(&str, &str)]) -> Result<()>;
    fn destroy(&self, auto_approve: bool) -> Result<()>;
    fn output_value(&self, name: &str) -> Result<String>;
}
