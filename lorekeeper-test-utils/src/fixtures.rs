//! Helpers for laying out hand-built transfer directories in tests.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;

/// Write `value` as pretty JSON at `root/relative_path`, creating parents.
pub fn write_json<T: Serialize>(root: &Path, relative_path: &str, value: &T) -> io::Result<PathBuf> {
    let bytes = serde_json::to_vec_pretty(value)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    write_bytes(root, relative_path, &bytes)
}

/// Write raw bytes at `root/relative_path`, creating parents.
pub fn write_bytes(root: &Path, relative_path: &str, bytes: &[u8]) -> io::Result<PathBuf> {
    let path = root.join(relative_path);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&path, bytes)?;
    Ok(path)
}
