//! Structured error types for folio.
//!
//! Every public operation returns [`Result`]. The variants follow the three
//! failure classes a caller can meet: bad configuration, malformed input
//! containers, and misuse of the document state machine. I/O and JSON
//! failures are wrapped as-is.

use thiserror::Error;

/// The unified error type returned by all public folio functions.
#[derive(Debug, Error)]
pub enum FolioError {
    /// Bad unit, page size, orientation, rotation, font name or display mode.
    /// Raised before any state is changed.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A malformed or unsupported PNG, TrueType, JPEG or GIF container.
    #[error("Format error: {0}")]
    Format(String),

    /// The document was used out of order.
    #[error(transparent)]
    State(#[from] StateError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON input failed to parse as a folio document script.
    #[error("Failed to parse document: {source}{}", hint_suffix(.hint))]
    Parse {
        source: serde_json::Error,
        hint: String,
    },
}

/// Programming misuse of the document lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
    #[error("No page has been added yet")]
    NoActivePage,
    #[error("The document is closed")]
    DocumentClosed,
    #[error("No font has been selected")]
    NoFontSelected,
    #[error("Internal link {0} has no destination")]
    UnresolvedLink(usize),
}

pub type Result<T> = std::result::Result<T, FolioError>;

impl FolioError {
    pub(crate) fn format(msg: impl Into<String>) -> Self {
        FolioError::Format(msg.into())
    }

    pub(crate) fn config(msg: impl Into<String>) -> Self {
        FolioError::Configuration(msg.into())
    }
}

fn hint_suffix(hint: &str) -> String {
    if hint.is_empty() {
        String::new()
    } else {
        format!("\n  Hint: {}", hint)
    }
}

impl From<serde_json::Error> for FolioError {
    fn from(e: serde_json::Error) -> Self {
        let hint = match e.classify() {
            serde_json::error::Category::Syntax => {
                "Check for trailing commas, missing quotes, or unescaped characters.".to_string()
            }
            serde_json::error::Category::Data => {
                "The JSON is valid but doesn't match the folio script schema. Check field names and op tags.".to_string()
            }
            serde_json::error::Category::Eof => "Unexpected end of input. Is the JSON truncated?".to_string(),
            serde_json::error::Category::Io => String::new(),
        };
        FolioError::Parse { source: e, hint }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_error_converts() {
        let err: FolioError = StateError::NoActivePage.into();
        assert!(matches!(err, FolioError::State(StateError::NoActivePage)));
        assert_eq!(err.to_string(), "No page has been added yet");
    }

    #[test]
    fn test_parse_error_carries_hint() {
        let err: FolioError = serde_json::from_str::<serde_json::Value>("{\"a\": 1,}")
            .unwrap_err()
            .into();
        let msg = err.to_string();
        assert!(msg.starts_with("Failed to parse document"));
        assert!(msg.contains("Hint: Check for trailing commas"));
    }
}
