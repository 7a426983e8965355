//! Typed progress events emitted by export/import runs.
//!
//! The core only pushes events into an mpsc channel; whoever owns the
//! receiving end decides how to deliver them (websocket, log lines, tests).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferOperation {
    Export,
    Import,
}

impl TransferOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransferOperation::Export => "export",
            TransferOperation::Import => "import",
        }
    }

    /// Name of the channel event that carries per-record failures
    pub fn error_event(&self) -> &'static str {
        match self {
            TransferOperation::Export => "export_error",
            TransferOperation::Import => "import_error",
        }
    }
}

impl fmt::Display for TransferOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransferOperation {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "export" => Ok(TransferOperation::Export),
            "import" => Ok(TransferOperation::Import),
            other => Err(format!("Unknown transfer command '{}'", other)),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferPhase {
    Context,
    Characters,
    Assets,
}

impl TransferPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransferPhase::Context => "context",
            TransferPhase::Characters => "characters",
            TransferPhase::Assets => "assets",
        }
    }

    /// Singular noun for one record of this phase
    pub fn record_noun(&self) -> &'static str {
        match self {
            TransferPhase::Context => "context",
            TransferPhase::Characters => "character",
            TransferPhase::Assets => "asset",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordTally {
    pub succeeded: usize,
    pub failed: usize,
}

impl RecordTally {
    pub fn total(&self) -> usize {
        self.succeeded + self.failed
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferSummary {
    pub categories: usize,
    pub tags: usize,
    pub asset_groups: usize,
    pub character_groups: usize,
    pub relationships: usize,
    pub static_categories: usize,
    pub characters: RecordTally,
    pub assets: RecordTally,
}

impl TransferSummary {
    pub fn context_total(&self) -> usize {
        self.categories
            + self.tags
            + self.asset_groups
            + self.character_groups
            + self.relationships
            + self.static_categories
    }

    pub fn failed(&self) -> usize {
        self.characters.failed + self.assets.failed
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum TransferEvent {
    PhaseStarted {
        operation: TransferOperation,
        phase: TransferPhase,
    },
    RecordStarted {
        operation: TransferOperation,
        phase: TransferPhase,
        id: i32,
    },
    RecordFinished {
        operation: TransferOperation,
        phase: TransferPhase,
        id: i32,
        new_id: Option<i32>,
    },
    RecordFailed {
        operation: TransferOperation,
        phase: TransferPhase,
        id: i32,
        error: String,
    },
    PhaseFinished {
        operation: TransferOperation,
        phase: TransferPhase,
        processed: usize,
    },
    RunFinished {
        operation: TransferOperation,
        summary: TransferSummary,
    },
}

impl TransferEvent {
    pub fn operation(&self) -> TransferOperation {
        match self {
            TransferEvent::PhaseStarted { operation, .. }
            | TransferEvent::RecordStarted { operation, .. }
            | TransferEvent::RecordFinished { operation, .. }
            | TransferEvent::RecordFailed { operation, .. }
            | TransferEvent::PhaseFinished { operation, .. }
            | TransferEvent::RunFinished { operation, .. } => *operation,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, TransferEvent::RecordFailed { .. })
    }

    pub fn is_run_finished(&self) -> bool {
        matches!(self, TransferEvent::RunFinished { .. })
    }

    /// Operator-facing text for this event.
    pub fn message(&self) -> String {
        match self {
            TransferEvent::PhaseStarted { phase, .. } => format!("start {}", phase.as_str()),
            TransferEvent::RecordStarted { phase, id, .. } => {
                format!("start {} {}", phase.record_noun(), id)
            }
            TransferEvent::RecordFinished {
                phase,
                id,
                new_id: Some(new_id),
                ..
            } => format!("finished {} {} -> {}", phase.record_noun(), id, new_id),
            TransferEvent::RecordFinished { phase, id, .. } => {
                format!("finished {} {}", phase.record_noun(), id)
            }
            TransferEvent::RecordFailed { error, .. } => error.clone(),
            TransferEvent::PhaseFinished { phase, .. } => format!("finished {}", phase.as_str()),
            TransferEvent::RunFinished { .. } => "finished".to_string(),
        }
    }
}

/// Sending half of a run's progress channel.
///
/// A closed or absent receiver never interrupts a run; events are dropped.
#[derive(Clone, Debug)]
pub struct ProgressReporter {
    operation: TransferOperation,
    tx: Option<mpsc::UnboundedSender<TransferEvent>>,
}

impl ProgressReporter {
    pub fn channel(
        operation: TransferOperation,
    ) -> (Self, mpsc::UnboundedReceiver<TransferEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                operation,
                tx: Some(tx),
            },
            rx,
        )
    }

    /// Reporter that only logs
    pub fn silent(operation: TransferOperation) -> Self {
        Self { operation, tx: None }
    }

    pub fn operation(&self) -> TransferOperation {
        self.operation
    }

    fn emit(&self, event: TransferEvent) {
        if let Some(tx) = &self.tx {
            // Listener gone: keep running
            let _ = tx.send(event);
        }
    }

    pub fn phase_started(&self, phase: TransferPhase) {
        info!("{}: start {}", self.operation, phase.as_str());
        self.emit(TransferEvent::PhaseStarted {
            operation: self.operation,
            phase,
        });
    }

    pub fn phase_finished(&self, phase: TransferPhase, processed: usize) {
        info!(
            "{}: finished {} ({} processed)",
            self.operation,
            phase.as_str(),
            processed
        );
        self.emit(TransferEvent::PhaseFinished {
            operation: self.operation,
            phase,
            processed,
        });
    }

    pub fn record_started(&self, phase: TransferPhase, id: i32) {
        debug!("{}: start {} {}", self.operation, phase.record_noun(), id);
        self.emit(TransferEvent::RecordStarted {
            operation: self.operation,
            phase,
            id,
        });
    }

    pub fn record_finished(&self, phase: TransferPhase, id: i32, new_id: Option<i32>) {
        debug!("{}: finished {} {}", self.operation, phase.record_noun(), id);
        self.emit(TransferEvent::RecordFinished {
            operation: self.operation,
            phase,
            id,
            new_id,
        });
    }

    pub fn record_failed(&self, phase: TransferPhase, id: i32, error: impl fmt::Display) {
        let error = error.to_string();
        warn!(
            "{}: {} {} failed: {}",
            self.operation,
            phase.record_noun(),
            id,
            error
        );
        self.emit(TransferEvent::RecordFailed {
            operation: self.operation,
            phase,
            id,
            error,
        });
    }

    pub fn run_finished(&self, summary: TransferSummary) {
        info!(
            "{}: finished ({} context records, {} characters, {} assets, {} failed)",
            self.operation,
            summary.context_total(),
            summary.characters.succeeded,
            summary.assets.succeeded,
            summary.failed()
        );
        self.emit(TransferEvent::RunFinished {
            operation: self.operation,
            summary,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_are_operator_text() {
        let op = TransferOperation::Import;
        let phase = TransferPhase::Characters;
        assert_eq!(
            TransferEvent::PhaseStarted { operation: op, phase }.message(),
            "start characters"
        );
        assert_eq!(
            TransferEvent::RecordStarted { operation: op, phase, id: 100 }.message(),
            "start character 100"
        );
        assert_eq!(
            TransferEvent::RecordFinished { operation: op, phase, id: 100, new_id: Some(3) }
                .message(),
            "finished character 100 -> 3"
        );
        assert_eq!(
            TransferEvent::RunFinished { operation: op, summary: TransferSummary::default() }
                .message(),
            "finished"
        );
    }

    #[test]
    fn only_record_failures_are_errors() {
        let failed = TransferEvent::RecordFailed {
            operation: TransferOperation::Export,
            phase: TransferPhase::Assets,
            id: 4,
            error: "Binary not found".to_string(),
        };
        assert!(failed.is_error());
        assert_eq!(failed.operation().error_event(), "export_error");
        assert!(!TransferEvent::PhaseFinished {
            operation: TransferOperation::Export,
            phase: TransferPhase::Assets,
            processed: 1,
        }
        .is_error());
    }

    #[test]
    fn operations_parse_from_commands() {
        assert_eq!("export".parse::<TransferOperation>(), Ok(TransferOperation::Export));
        assert!("backup".parse::<TransferOperation>().is_err());
    }

    #[test]
    fn reporter_survives_a_dropped_receiver() {
        let (reporter, rx) = ProgressReporter::channel(TransferOperation::Export);
        drop(rx);
        reporter.phase_started(TransferPhase::Context);
        reporter.run_finished(TransferSummary::default());
    }

    #[test]
    fn reporter_delivers_in_order() {
        let (reporter, mut rx) = ProgressReporter::channel(TransferOperation::Import);
        reporter.phase_started(TransferPhase::Context);
        reporter.phase_finished(TransferPhase::Context, 3);
        drop(reporter);

        let messages = tokio_test::block_on(async {
            let mut messages = Vec::new();
            while let Some(event) = rx.recv().await {
                messages.push(event.message());
            }
            messages
        });
        assert_eq!(messages, vec!["start context", "finished context"]);
    }
}
