use std::path::PathBuf;
use thiserror::Error;

use crate::models::ExportFormat;

/// All errors produced while turning a chat export into a recap.
#[derive(Error, Debug)]
pub enum RecapError {
    /// No adapter fingerprint matched any document in the export.
    #[error("Unrecognized export format: no conversation list with a known layout was found")]
    UnrecognizedFormat,

    /// The format was recognised but no conversation could be parsed.
    #[error("Export contains no usable conversations ({format} format)")]
    EmptyExport { format: ExportFormat },

    /// A single conversation or message could not be decoded.
    ///
    /// Adapters absorb this locally and count it; it never aborts a run.
    #[error("Malformed record in {context}: {reason}")]
    MalformedRecord { context: String, reason: String },

    /// A run option is structurally invalid.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A JSON document could not be parsed.
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// The export directory does not exist.
    #[error("Export path not found: {0}")]
    ExportPathNotFound(PathBuf),

    /// No JSON files were found under the given directory.
    #[error("No JSON files found in {0}")]
    NoExportFiles(PathBuf),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl RecapError {
    /// Build a [`RecapError::MalformedRecord`] from any displayable cause.
    pub fn malformed(context: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::MalformedRecord {
            context: context.into(),
            reason: reason.to_string(),
        }
    }
}

/// Convenience alias used throughout the recap crates.
pub type Result<T> = std::result::Result<T, RecapError>;
