//! Filesystem helpers shared by the storage layer and the transfer pipeline.

use std::fs;
use std::io;
use std::path::{Component, Path};

/// Copy a file, or a directory tree, from `from` to `to`.
///
/// Returns the number of files copied. Existing files at the destination are
/// overwritten.
pub fn copy_recursive(from: &Path, to: &Path) -> io::Result<u64> {
    if from.is_dir() {
        fs::create_dir_all(to)?;
        let mut copied = 0;
        for entry in fs::read_dir(from)? {
            let entry = entry?;
            copied += copy_recursive(&entry.path(), &to.join(entry.file_name()))?;
        }
        Ok(copied)
    } else {
        if let Some(parent) = to.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(from, to)?;
        Ok(1)
    }
}

/// Move a file or directory, falling back to copy + remove across filesystems.
pub fn move_path(from: &Path, to: &Path) -> io::Result<()> {
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent)?;
    }
    if fs::rename(from, to).is_ok() {
        return Ok(());
    }

    copy_recursive(from, to)?;
    if from.is_dir() {
        fs::remove_dir_all(from)
    } else {
        fs::remove_file(from)
    }
}

/// True when `name` is a single plain path segment (no separators, no `..`).
pub fn is_plain_file_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

/// Extension of `path` including the leading dot, or an empty string.
pub fn dotted_extension(path: &Path) -> String {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{}", ext))
        .unwrap_or_default()
}
