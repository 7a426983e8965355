//! Export/import of the whole store through a portable directory tree.
//!
//! - [`Exporter`] writes `context.json` plus one record per character and
//!   asset, copying their binaries alongside
//! - [`Importer`] reads that tree back, remapping every reference through an
//!   [`IdRemapTable`]
//! - [`TransferService`] sequences both and reports [`TransferEvent`]s
//! - [`TransferCoordinator`] keeps runs single-flight per operation

pub mod coordinator;
pub mod events;
pub mod exporter;
pub mod id_list;
pub mod id_remap;
pub mod importer;
pub mod kinds;
pub mod orchestrator;
pub mod records;

pub use coordinator::{TransferCoordinator, TransferGuard};
pub use events::{
    ProgressReporter, RecordTally, TransferEvent, TransferOperation, TransferPhase,
    TransferSummary,
};
pub use exporter::{ExportOptions, Exporter};
pub use id_list::{join_id_list, parse_id_list};
pub use id_remap::IdRemapTable;
pub use importer::{ImportOptions, ImportedAsset, ImportedCharacter, Importer, Records};
pub use kinds::EntityKind;
pub use orchestrator::{TransferService, TransferSettings};
pub use records::{Context, ContextManifest};
