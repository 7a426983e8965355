//! Export/import pipeline errors
//!
//! Structural failures (missing export root, manifest or phase directory,
//! database unavailable, a run already in progress) abort a whole run.
//! Everything else is scoped to a single character or asset record and is
//! reported without stopping the phase.

use std::path::PathBuf;

use thiserror::Error;

use super::CoreError;
use crate::transfer::{EntityKind, TransferOperation};

#[derive(Error, Debug)]
pub enum TransferError {
    /// Export root or a per-phase subdirectory is absent
    #[error("Directory not found: {0:?}")]
    MissingDirectory(PathBuf),

    /// `context.json` is absent, so no record can be rewired
    #[error("Manifest not found: {0:?}")]
    MissingManifest(PathBuf),

    /// A record file is absent
    #[error("File not found: {0:?}")]
    MissingFile(PathBuf),

    /// A binary referenced by a record is absent
    #[error("Binary not found: {0:?}")]
    MissingBinary(PathBuf),

    #[error("IO error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error at {path:?}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid id list '{0}'")]
    InvalidIdList(String),

    /// Only raised when strict remapping is enabled
    #[error("Unresolved {kind} reference {id}")]
    UnresolvedReference { kind: EntityKind, id: i32 },

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Store rejected record: {0}")]
    Store(#[from] CoreError),

    #[error("{0} already in progress")]
    Busy(TransferOperation),
}

impl TransferError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        TransferError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        TransferError::Json {
            path: path.into(),
            source,
        }
    }

    /// Whether this error aborts the entire run rather than a single record
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            TransferError::MissingDirectory(_)
                | TransferError::MissingManifest(_)
                | TransferError::Database(_)
                | TransferError::Busy(_)
        )
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            TransferError::MissingDirectory(_) => "MISSING_DIRECTORY",
            TransferError::MissingManifest(_) => "MISSING_MANIFEST",
            TransferError::MissingFile(_) => "MISSING_FILE",
            TransferError::MissingBinary(_) => "MISSING_BINARY",
            TransferError::Io { .. } => "IO_ERROR",
            TransferError::Json { .. } => "JSON_ERROR",
            TransferError::InvalidIdList(_) => "INVALID_ID_LIST",
            TransferError::UnresolvedReference { .. } => "UNRESOLVED_REFERENCE",
            TransferError::Database(_) => "DATABASE_ERROR",
            TransferError::Store(_) => "STORE_REJECTED",
            TransferError::Busy(_) => "TRANSFER_BUSY",
        }
    }
}

impl From<TransferError> for CoreError {
    fn from(err: TransferError) -> Self {
        match err {
            TransferError::Store(inner) => inner,
            TransferError::Busy(_) => CoreError::conflict(err.to_string()),
            TransferError::MissingDirectory(_)
            | TransferError::MissingManifest(_)
            | TransferError::MissingFile(_) => {
                CoreError::validation(err.to_string())
            }
            other => CoreError::internal(other.to_string()).with_source(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::CoreErrorKind;

    #[test]
    fn structural_errors_are_fatal() {
        assert!(TransferError::MissingDirectory(PathBuf::from("/x")).is_fatal());
        assert!(TransferError::Busy(TransferOperation::Import).is_fatal());
        assert!(TransferError::MissingManifest(PathBuf::from("/x/context.json")).is_fatal());
        assert!(!TransferError::MissingFile(PathBuf::from("/x/3.json")).is_fatal());
        assert!(!TransferError::MissingBinary(PathBuf::from("/x/avatar.png")).is_fatal());
        assert!(!TransferError::InvalidIdList("a".to_string()).is_fatal());
    }

    #[test]
    fn unresolved_reference_names_the_kind() {
        let err = TransferError::UnresolvedReference {
            kind: EntityKind::Tag,
            id: 10,
        };
        assert_eq!(err.to_string(), "Unresolved tag reference 10");
        assert_eq!(err.error_code(), "UNRESOLVED_REFERENCE");
    }

    #[test]
    fn busy_maps_to_conflict() {
        let err: CoreError = TransferError::Busy(TransferOperation::Export).into();
        assert_eq!(err.kind(), CoreErrorKind::Conflict);
        assert_eq!(err.message(), "export already in progress");
    }

    #[test]
    fn missing_manifest_is_a_validation_error() {
        let err = TransferError::MissingManifest(PathBuf::from("/x/context.json"));
        assert_eq!(err.error_code(), "MISSING_MANIFEST");
        let err: CoreError = err.into();
        assert_eq!(err.kind(), CoreErrorKind::Validation);
    }

    #[test]
    fn store_errors_unwrap_to_the_original() {
        let err: CoreError =
            TransferError::Store(CoreError::validation("Tag name cannot be empty")).into();
        assert_eq!(err.kind(), CoreErrorKind::Validation);
    }
}
