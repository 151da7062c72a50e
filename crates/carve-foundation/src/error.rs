//! Error taxonomy for one extraction run.

use thiserror::Error;

/// Result type for engine operations.
pub type ExtractResult<T> = Result<T, ExtractError>;

/// Errors the engine can report across its boundary.
///
/// A cancelled name prompt is a no-op, not an error, and a
/// type-resolution shortfall degrades to `"any"`; neither appears
/// here. The only error a host is expected to surface to the user is
/// `Parse` (the source file could not be resolved into a tree).
#[derive(Debug, Clone, Error)]
pub enum ExtractError {
    /// The selection is not one or more complete markup elements.
    /// Callers typically react by not offering the refactor at all.
    #[error("selection is not a complete JSX fragment")]
    InvalidSelection,

    /// The source file could not be parsed; fatal for the request.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Invariant breakage inside the engine.
    #[error("internal error: {message}")]
    Internal { message: String },
}

impl ExtractError {
    /// Create a new parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
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
