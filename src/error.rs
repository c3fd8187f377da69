//! Error types for binlang.
//!
//! Only failures that abort a detection surface here. Structural parse
//! failures inside a known container are folded into the result's evidence
//! by the analyzers and never reach the caller.

use thiserror::Error;

/// Main error type for binlang operations.
#[derive(Debug, Error)]
pub enum BinlangError {
    /// File I/O errors: open, header read, or seek failures
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl BinlangError {
    /// True when the error came from the underlying byte source.
    pub fn is_io(&self) -> bool {
        matches!(self, Self::Io(_))
    }
}

/// Result type alias for binlang operations
pub type Result<T> = std::result::Result<T, BinlangError>;
