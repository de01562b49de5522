//! Content archive packaging.

use std::fs::File;
use std::path::Path;

use flate2::write::GzEncoder;
use flate2::Compression;
use skylift_core::error::Result;
use tracing::info;

/// Packages `src` into a gzipped tarball at `dest`. Entry paths are
/// relative to `src` so the archive unpacks in place on the remote host.
pub fn pack_directory(src: &Path, dest: &Path) -> Result<()> {
    info!(
        "Packaging {} into {}",
        src.display(),
        dest.display()
    );
    let file = File::create(dest)?;
    let encoder = GzEncoder::new(file, Compression::default());
    let mut builder = tar::Builder::new(encoder);
    builder.append_dir_all(".", src)?;
    builder.into_inner()?.finish()?;
    Ok(())
}
