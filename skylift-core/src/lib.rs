pub mod command_stream;
pub mod error;
pub mod output_macros;
pub mod workspace;

pub use error::{DeployError, Result};
pub use workspace::{Workspace, WorkspaceStrategy};
