use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::debug;

use super::events::TransferOperation;
use crate::errors::{TransferError, TransferResult};

/// Admits at most one export and one import at a time.
#[derive(Clone, Debug, Default)]
pub struct TransferCoordinator {
    export_active: Arc<AtomicBool>,
    import_active: Arc<AtomicBool>,
}

impl TransferCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the slot for `operation`, failing fast if it is taken.
    pub fn try_acquire(&self, operation: TransferOperation) -> TransferResult<TransferGuard> {
        let flag = self.flag(operation);
        if flag
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(TransferError::Busy(operation));
        }
        debug!("Acquired {} slot", operation);
        Ok(TransferGuard {
            operation,
            flag: Arc::clone(flag),
        })
    }

    pub fn is_active(&self, operation: TransferOperation) -> bool {
        self.flag(operation).load(Ordering::Acquire)
    }

    fn flag(&self, operation: TransferOperation) -> &Arc<AtomicBool> {
        match operation {
            TransferOperation::Export => &self.export_active,
            TransferOperation::Import => &self.import_active,
        }
    }
}

/// Releases its slot when dropped.
#[derive(Debug)]
pub struct TransferGuard {
    operation: TransferOperation,
    flag: Arc<AtomicBool>,
}

impl TransferGuard {
    pub fn operation(&self) -> TransferOperation {
        self.operation
    }
}

impl Drop for TransferGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
        debug!("Released {} slot", self.operation);
    }
}
