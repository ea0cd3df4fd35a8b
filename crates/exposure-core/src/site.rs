//! Output tree operations: cleaning and copying the static site.

use std::path::Path;
use walkdir::WalkDir;

use crate::error::ExposureError;

/// Remove the output directory and everything in it.
///
/// A missing directory is not an error.
pub async fn clean(output_dir: &Path) -> Result<(), ExposureError> {
    match tokio::fs::remove_dir_all(output_dir).await {
        Ok(()) => {
            tracing::info!("Removed {:?}", output_dir);
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("Nothing to clean at {:?}", output_dir);
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

/// Copy the static tree under `static_dir` into `output_root`, preserving
/// relative paths. Returns the number of files copied.
pub async fn copy_static(static_dir: &Path, output_root: &Path) -> Result<usize, ExposureError> {
    if !static_dir.is_dir() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("static directory not found: {}", static_dir.display()),
        )
        .into());
    }
    tokio::fs::create_dir_all(output_root).await?;

    let mut copied = 0;
    for entry in WalkDir::new(static_dir).follow_links(true).min_depth(1) {
        let entry = entry.map_err(|e| {
            std::io::Error::other(format!("walking static tree: {e}"))
        })?;
        let relative = entry
            .path()
            .strip_prefix(static_dir)
            .map_err(std::io::Error::other)?;
        let target = output_root.join(relative);

        if entry.file_type().is_dir() {
            tokio::fs::create_dir_all(&target).await?;
        } else if entry.file_type().is_file() {
            if let Some(parent) = target.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::copy(entry.path(), &target).await?;
            tracing::trace!("Copied {:?}", relative);
            copied += 1;
        }
    }

    tracing::info!("Copied {} static file(s) into {:?}", copied, output_root);
    Ok(copied)
}
