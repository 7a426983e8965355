use serde::{Deserialize, Serialize};

use lorekeeper::transfer::{TransferEvent, TransferOperation};

/// Inbound command: `{"event": "export" | "import", "data": "<optional dir>"}`
#[derive(Clone, Debug, Deserialize)]
pub struct ClientMessage {
    pub event: String,
    #[serde(default)]
    pub data: Option<String>,
}

impl ClientMessage {
    pub fn operation(&self) -> Result<TransferOperation, String> {
        self.event.parse()
    }

    /// The requested directory, if the client named one
    pub fn directory(&self) -> Option<&str> {
        self.data
            .as_deref()
            .map(str::trim)
            .filter(|dir| !dir.is_empty())
    }
}

/// Outbound progress line: `{"event": "...", "data": "<text>"}`
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ServerMessage {
    pub event: String,
    pub data: String,
    /// Close the socket once this message is delivered
    #[serde(skip)]
    pub close_after: bool,
}

impl ServerMessage {
    pub fn from_event(event: &TransferEvent) -> Self {
        let operation = event.operation();
        let name = if event.is_error() {
            operation.error_event()
        } else {
            operation.as_str()
        };

        Self {
            event: name.to_string(),
            data: event.message(),
            close_after: operation == TransferOperation::Export && event.is_run_finished(),
        }
    }

    pub fn error(operation: TransferOperation, message: impl Into<String>) -> Self {
        Self {
            event: operation.error_event().to_string(),
            data: message.into(),
            close_after: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lorekeeper::transfer::{TransferPhase, TransferSummary};

    #[test]
    fn progress_and_errors_use_separate_events() {
        let started = ServerMessage::from_event(&TransferEvent::RecordStarted {
            operation: TransferOperation::Import,
            phase: TransferPhase::Assets,
            id: 12,
        });
        assert_eq!(started.event, "import");
        assert_eq!(started.data, "start asset 12");

        let failed = ServerMessage::from_event(&TransferEvent::RecordFailed {
            operation: TransferOperation::Import,
            phase: TransferPhase::Assets,
            id: 12,
            error: "Invalid id list 'x'".to_string(),
        });
        assert_eq!(failed.event, "import_error");
        assert_eq!(failed.data, "Invalid id list 'x'");
        assert!(!failed.close_after);
    }

    #[test]
    fn only_a_finished_export_closes_the_socket() {
        let export_done = ServerMessage::from_event(&TransferEvent::RunFinished {
            operation: TransferOperation::Export,
            summary: TransferSummary::default(),
        });
        assert_eq!(export_done.data, "finished");
        assert!(export_done.close_after);

        let import_done = ServerMessage::from_event(&TransferEvent::RunFinished {
            operation: TransferOperation::Import,
            summary: TransferSummary::default(),
        });
        assert!(!import_done.close_after);
    }

    #[test]
    fn wire_format_has_event_and_data_only() {
        let message = ServerMessage::error(TransferOperation::Export, "export already in progress");
        assert_eq!(
            serde_json::to_value(&message).unwrap(),
            serde_json::json!({"event": "export_error", "data": "export already in progress"})
        );
    }

    #[test]
    fn client_commands_parse_with_optional_directory() {
        let message: ClientMessage =
            serde_json::from_str(r#"{"event":"import","data":"  /srv/backup "}"#).unwrap();
        assert_eq!(message.operation(), Ok(TransferOperation::Import));
        assert_eq!(message.directory(), Some("/srv/backup"));

        let message: ClientMessage = serde_json::from_str(r#"{"event":"export"}"#).unwrap();
        assert_eq!(message.directory(), None);

        let message: ClientMessage = serde_json::from_str(r#"{"event":"wipe"}"#).unwrap();
        assert!(message.operation().is_err());
    }
}
