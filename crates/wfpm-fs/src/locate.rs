//! Upward search for project markers

use std::path::{Path, PathBuf};

/// Find the nearest directory, starting at `start` and walking up to the
/// filesystem root, that contains a regular file named `marker`.
pub fn find_upwards(start: &Path, marker: impl AsRef<Path>) -> Option<PathBuf> {
    let marker = marker.as_ref();
    let mut current = Some(start);

    while let Some(dir) = current {
        if dir.join(marker).is_file() {
            tracing::debug!(root = %dir.display(), "Found project marker");
            return Some(dir.to_path_buf());
        }
        current = dir.parent();
    }

    None
}
