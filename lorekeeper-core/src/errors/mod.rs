//! Error types for lorekeeper-core
//!
//! - **CoreError**: Entity Store failures (validation, lookups, persistence)
//! - **TransferError**: export/import pipeline failures, split into fatal
//!   structural errors and per-record errors
//!
//! # Examples
//!
//! ```rust
//! use lorekeeper::errors::{CoreError, CoreErrorKind, TransferError};
//! use std::path::PathBuf;
//!
//! let err = CoreError::validation("Character name cannot be empty");
//! assert_eq!(err.kind(), CoreErrorKind::Validation);
//!
//! let err = TransferError::MissingDirectory(PathBuf::from("/backups/missing"));
//! assert!(err.is_fatal());
//! ```

pub mod core_error;
pub mod transfer;

pub use core_error::{CoreError, CoreErrorKind};
pub use transfer::TransferError;

/// Result type alias for Entity Store operations
pub type CoreResult<T> = Result<T, CoreError>;

/// Result type alias for export/import operations
pub type TransferResult<T> = Result<T, TransferError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_result_alias() {
        let result: CoreResult<i32> = Err(CoreError::not_found("Character", "42"));
        assert!(result.is_err());
    }

    #[test]
    fn test_transfer_result_alias() {
        let result: TransferResult<()> = Err(TransferError::InvalidIdList("1,x".to_string()));
        assert!(result.is_err());
    }
}
