//! Error types module
//!
//! Adapter failures are typed per concern (`ConversionError`,
//! `CompressionError`, `DocumentError`); the dispatcher folds them into
//! `DispatchError`, whose `category()` feeds the machine-readable outcome
//! taxonomy. Cleanup failures are deliberately absent here: failing to
//! delete an original or a partial artifact is logged and never changes a
//! reported outcome.

use std::io;

/// Failure of a format conversion (external transcoder or in-process
/// document surgery).
#[derive(Debug, thiserror::Error)]
pub enum ConversionError {
    /// The external tool exited non-zero. `detail` carries the last line of
    /// its diagnostic stream, which is the only structured information the
    /// tool provides.
    #[error("{tool} failed: {detail}")]
    ToolFailed { tool: String, detail: String },

    /// The tool exited zero but the artifact is not on disk.
    #[error("output not produced")]
    OutputMissing,

    #[error("invalid document: {0}")]
    InvalidDocument(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Failure of a compression operation.
#[derive(Debug, thiserror::Error)]
pub enum CompressionError {
    #[error("{tool} failed: {detail}")]
    ToolFailed { tool: String, detail: String },

    #[error("output not produced")]
    OutputMissing,

    /// The level payload does not fit the adapter (wrong kind, or a CRF
    /// outside the encoder's 0-51 range).
    #[error("unsupported compression level: {0}")]
    UnsupportedLevel(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Failure of an in-process PDF page operation (split/merge).
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("invalid page range: {0}")]
    PageOutOfRange(String),

    #[error("invalid document: {0}")]
    Malformed(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Dispatcher-level error taxonomy. Every variant maps to a stable category
/// string surfaced in `ActionResult`; the dispatcher itself never lets one
/// of these escape as a raw error.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// Unknown action family, malformed action parameters, or no handler
    /// registered for the file's extension.
    #[error("{0}")]
    UnsupportedAction(String),

    /// Missing or unreadable input, or input constraints not met.
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Conversion(#[from] ConversionError),

    #[error(transparent)]
    Compression(#[from] CompressionError),
}

impl DispatchError {
    /// Stable machine-readable category for result reporting.
    pub fn category(&self) -> &'static str {
        match self {
            DispatchError::UnsupportedAction(_) => "unsupported_action",
            DispatchError::Validation(_) => "validation",
            DispatchError::Conversion(_) => "conversion",
            DispatchError::Compression(_) => "compression",
        }
    }
}
