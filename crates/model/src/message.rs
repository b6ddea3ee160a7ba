use serde::{Deserialize, Serialize};

/// Severity of a validation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Error,
    Warning,
    Info,
}

/// A validation message addressed to one property, row, or cell.
///
/// `Info` messages are never stored: writing one clears whatever message is
/// at that address. `validation_id` ties a message to the condition that
/// produced it so a later passing evaluation clears only its own message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorMessage {
    #[serde(rename = "type")]
    pub kind: MessageKind,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_id: Option<String>,
}

impl ErrorMessage {
    pub fn error(text: impl Into<String>) -> Self {
        ErrorMessage {
            kind: MessageKind::Error,
            text: text.into(),
            validation_id: None,
        }
    }

    pub fn warning(text: impl Into<String>) -> Self {
        ErrorMessage {
            kind: MessageKind::Warning,
            text: text.into(),
            validation_id: None,
        }
    }

    pub fn with_validation_id(mut self, id: impl Into<String>) -> Self {
        self.validation_id = Some(id.into());
        self
    }
}
