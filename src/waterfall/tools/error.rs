use std::path::PathBuf;

use thiserror::Error;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, ToolError>;

/// Error type covering the different failure cases that can occur when the
/// tool ingests an uploaded sheet or renders its flows.
///
/// Every variant is terminal for the current load attempt. Malformed rows are
/// not represented here: they are dropped during ingestion.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Raised when the file name carries neither a CSV nor an Excel suffix.
    #[error("unsupported file type '{0}': please upload a CSV or Excel file")]
    UnsupportedFileType(String),

    /// Raised when the source holds no data rows at all.
    #[error("file appears to be empty")]
    EmptySource,

    /// Raised when the header row lacks one of the required columns.
    #[error("missing required columns {}: file must contain columns Utility, Source, Target, Value", .0.join(", "))]
    MissingColumns(Vec<String>),

    /// Raised when every data row was rejected by the record filter.
    #[error("no valid data found: ensure columns Utility, Source, Target, Value are populated")]
    NoValidRows,

    /// Raised when a spreadsheet arrives but no decoder was configured.
    #[error("Excel parsing support is not available in this build")]
    LibraryUnavailable,

    /// Wrapper for unexpected failures while decoding the file content.
    #[error("error parsing file: {0}")]
    ParseFailure(String),

    /// Wrapper for IO failures such as reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised when JSON serialization fails.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Raised when the user provides a path that does not exist.
    #[error("input file not found: {0}")]
    MissingInput(PathBuf),

    /// Raised when an explicitly requested utility is absent from the dataset.
    #[error("utility '{0}' not found in the loaded data")]
    UnknownUtility(String),

    /// Raised when the tracing subscriber fails to initialise.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}
