//! Artifact writer

use anyhow::{bail, Context, Result};
use codegen::Artifact;
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// Write `artifacts` under `root`, creating directories as needed
///
/// Returns the number of files written.
pub fn write_artifacts<'a>(
    root: &Path,
    artifacts: impl IntoIterator<Item = &'a Artifact>,
) -> Result<usize> {
    let mut written = 0;
    for artifact in artifacts {
        let path = resolve(root, &artifact.path)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
        fs::write(&path, &artifact.contents)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        debug!(
            "Wrote {} ({}, {} bytes)",
            path.display(),
            artifact.kind,
            artifact.contents.len()
        );
        written += 1;
    }
    Ok(written)
}

/// Join a relative artifact path, refusing anything that escapes `root`
fn resolve(root: &Path, relative: &str) -> Result<PathBuf> {
    let relative = Path::new(relative);
    if !relative
        .components()
        .all(|component| matches!(component, Component::Normal(_)))
    {
        bail!(
            "Refusing to write artifact outside the output directory: {}",
            relative.display()
        );
    }
    Ok(root.join(relative))
}
