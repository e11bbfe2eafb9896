//! Build-output tree enumeration.
//!
//! A pure flattening of the output directory: every regular file becomes
//! one (relative, absolute) pair, directories are excluded by
//! construction, and symlinks are ignored. Ordering is unspecified;
//! uploads are independent, so nothing may rely on it.

use std::path::{Path, PathBuf};
use tokio::fs;

/// One file discovered under the build output root.
#[derive(Clone, Debug)]
pub struct OutputFile {
    /// Path relative to the output root.
    pub relative: PathBuf,
    /// Absolute path on disk.
    pub absolute: PathBuf,
}

/// Recursively enumerate every regular file under `root`.
pub async fn enumerate_files(root: &Path) -> std::io::Result<Vec<OutputFile>> {
    let mut results = Vec::new();
    let mut stack = vec![root.to_path_buf()];

    while let Some(dir) = stack.pop() {
        let mut entries = fs::read_dir(&dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            // file_type() does not follow symlinks, so a link out of the
            // output tree is neither walked nor published.
            let file_type = entry.file_type().await?;
            if file_type.is_dir() {
                stack.push(path);
            } else if file_type.is_file() {
                if let Ok(relative) = path.strip_prefix(root) {
                    results.push(OutputFile {
                        relative: relative.to_path_buf(),
                        absolute: path,
                    });
                }
            }
        }
    }

    Ok(results)
}
