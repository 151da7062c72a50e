//! Host-editor collaborator surface for the carve engine.
//!
//! The engine is a pure function over text and configuration; the host
//! editor owns the buffer, the selection model, the name prompt, and
//! edit application. These traits are the whole contract between the
//! two. Name prompting is the one inherently asynchronous step in the
//! surrounding system, so `EditorHost` is an async trait; the engine
//! awaits it exactly once, before its pipeline begins.

use async_trait::async_trait;
use carve_foundation::TextEdit;
use serde_json::Value;

/// Result type for host API operations.
pub type ApiResult<T> = Result<T, HostApiError>;

/// Errors that can cross the host boundary.
#[derive(Debug, Clone, thiserror::Error)]
pub enum HostApiError {
    /// The source file could not be parsed or resolved.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// The host rejected or failed to apply the produced edits.
    #[error("edit application failed: {message}")]
    EditRejected { message: String },

    /// Anything else.
    #[error("internal error: {message}")]
    Internal { message: String },
}

impl HostApiError {
    /// Create a new parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    /// Create a new edit-rejected error.
    pub fn edit_rejected(message: impl Into<String>) -> Self {
        Self::EditRejected {
            message: message.into(),
        }
    }

    /// Create a new internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

impl From<carve_foundation::ExtractError> for HostApiError {
    fn from(err: carve_foundation::ExtractError) -> Self {
        match err {
            carve_foundation::ExtractError::Parse { message } => Self::Parse { message },
            other => Self::Internal {
                message: other.to_string(),
            },
        }
    }
}

/// Read-only view of the document being refactored.
pub trait EditorDocument: Send + Sync {
    /// Full text of the document.
    fn text(&self) -> &str;

    /// File name, used to pick the dialect (`.ts`/`.tsx` are typed;
    /// `.tsx`/`.jsx` enable JSX parsing).
    fn file_name(&self) -> &str;

    /// Number of lines in the document.
    fn line_count(&self) -> u32 {
        self.text().lines().count() as u32
    }

    /// Text of a single line, without its terminator.
    fn line_text(&self, line: u32) -> Option<&str> {
        self.text().lines().nth(line as usize)
    }
}

/// The host editor's side of an extraction request.
#[async_trait]
pub trait EditorHost: Send + Sync {
    /// Prompt the user for the new component's name. `Ok(None)` means
    /// the prompt was cancelled or cleared; the request becomes a
    /// no-op, not an error.
    async fn prompt_for_name(&self, default: &str) -> ApiResult<Option<String>>;

    /// Apply the produced edits. Returns `false` (or an error) when the
    /// host could not apply them; the engine never retries.
    async fn apply_edits(&self, edits: &[TextEdit]) -> ApiResult<bool>;

    /// Read the host's configuration bag for a namespace. Unrecognized
    /// or malformed values are fine; they fall back to defaults when
    /// the bag is validated into a `GenerationConfig`.
    fn read_configuration(&self, namespace: &str) -> Value;
}

/// Minimal in-memory document, convenient for hosts and tests.
#[derive(Debug, Clone)]
pub struct InMemoryDocument {
    text: String,
    file_name: String,
}

impl InMemoryDocument {
    pub fn new(text: impl Into<String>, file_name: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            file_name: file_name.into(),
        }
    }
}

impl EditorDocument for InMemoryDocument {
    fn text(&self) -> &str {
        &self.text
    }

    fn file_name(&self) -> &str {
        &self.file_name
    }
}
