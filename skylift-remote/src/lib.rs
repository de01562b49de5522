//! Remote bootstrap layer.
//!
//! Delivers the generated bootstrap script and the packaged application
//! content to the freshly provisioned host over SSH and executes the
//! script there. The transport sits behind the [`BootstrapRunner`] trait
//! so the orchestrator can be exercised without a network in tests.

use std::path::Path;

use skylift_core::error::Result;

pub mod archive;
pub mod hostkey;
pub mod retry;
pub mod session;

pub use archive::pack_directory;
pub use hostkey::{HostKeyPolicy, RejectAll, TrustOnFirstUse};
pub use retry::{retry, RetrySchedule};
pub use session::SshBootstrap;

/// Executes the bootstrap procedure against `host`: transfer both staged
/// artifacts, run the script, succeed only on remote exit status zero.
pub trait BootstrapRunner {
    fn run(&self, host: &str, private_key: &Path, script: &Path, archive: &Path) -> Result<()>;
}
