//! Live binary storage: the static root that serves avatars and asset
//! payloads, and the staging area that imported binaries wait in until the
//! record that owns them is created.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::errors::{CoreError, CoreResult};
use crate::utils::fs::{is_plain_file_name, move_path};

#[derive(Clone, Debug)]
pub struct StorageLayout {
    static_root: PathBuf,
    staging_root: PathBuf,
}

impl StorageLayout {
    pub fn new(static_root: impl Into<PathBuf>, staging_root: impl Into<PathBuf>) -> Self {
        Self {
            static_root: static_root.into(),
            staging_root: staging_root.into(),
        }
    }

    pub fn static_root(&self) -> &Path {
        &self.static_root
    }

    pub fn staging_root(&self) -> &Path {
        &self.staging_root
    }

    pub fn static_path(&self, relative: &str) -> PathBuf {
        self.static_root.join(relative)
    }

    pub fn staging_path(&self, name: &str) -> PathBuf {
        self.staging_root.join(name)
    }

    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.static_root)?;
        fs::create_dir_all(&self.staging_root)
    }

    /// Move a staged file or directory into the static root, keeping its name.
    pub fn adopt(&self, staged_name: &str) -> CoreResult<String> {
        if !is_plain_file_name(staged_name) {
            return Err(CoreError::validation(format!(
                "Invalid staged upload name '{}'",
                staged_name
            )));
        }

        let from = self.staging_path(staged_name);
        if !from.exists() {
            return Err(CoreError::not_found("Staged upload", staged_name));
        }

        let to = self.static_path(staged_name);
        move_path(&from, &to).map_err(|e| {
            CoreError::internal(format!(
                "Failed to move staged upload {:?} to {:?}",
                from, to
            ))
            .with_source(e)
        })?;
        debug!("Adopted staged upload {} into static storage", staged_name);

        Ok(staged_name.to_string())
    }

    /// Undo [`StorageLayout::adopt`] for a record that was never created.
    pub fn release(&self, adopted_name: &str) -> CoreResult<()> {
        let from = self.static_path(adopted_name);
        let to = self.staging_path(adopted_name);
        move_path(&from, &to).map_err(|e| {
            CoreError::internal(format!(
                "Failed to return {:?} to staging at {:?}",
                from, to
            ))
            .with_source(e)
        })?;
        debug!("Returned {} to staging", adopted_name);
        Ok(())
    }
}

/// Where a record's binary comes from when it is created.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum BinarySource {
    /// No binary; stored as an empty string
    #[default]
    None,
    /// Already present under the static root at this relative path
    Stored(String),
    /// Waiting in the staging area under this name
    Staged(String),
}

impl BinarySource {
    pub fn stored(path: &str) -> Self {
        if path.is_empty() {
            BinarySource::None
        } else {
            BinarySource::Stored(path.to_string())
        }
    }

    /// Resolve to the value persisted on the row, adopting staged uploads.
    pub fn resolve(&self, storage: &StorageLayout) -> CoreResult<String> {
        match self {
            BinarySource::None => Ok(String::new()),
            BinarySource::Stored(path) => Ok(path.clone()),
            BinarySource::Staged(name) => storage.adopt(name),
        }
    }

    /// Return an adopted staged upload to the staging area after the record
    /// that would have owned it failed to persist.
    pub fn rollback(&self, storage: &StorageLayout) {
        if let BinarySource::Staged(name) = self {
            if let Err(err) = storage.release(name) {
                warn!("Staged upload {} left in static storage: {}", name, err);
            }
        }
    }
}
