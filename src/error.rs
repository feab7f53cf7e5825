//! Error types for ingestion, reconfiguration and export.

use thiserror::Error;

/// Errors raised by the tracer engine and its collaborators.
#[derive(Error, Debug)]
pub enum TracerError {
    /// A line whose required numeric fields do not parse.
    #[error("malformed line: {0:?}")]
    MalformedLine(String),

    /// A record with the wrong number of values reached the store.
    #[error("record has {got} values, store has {expected} columns")]
    ShapeMismatch { expected: usize, got: usize },

    /// A file source ended without a single numeric line.
    #[error("No data were found in {source_name} !")]
    NoDataFound { source_name: String },

    /// Read failure on the input descriptor.
    #[error("read error on input: {0}")]
    Descriptor(#[source] std::io::Error),

    /// Invalid band or rate coming from the UI.
    #[error("bad entry: {0}")]
    ReconfigureRejected(String),

    /// Invalid command line or config file values.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The native window could not be started.
    #[error("viewer error: {0}")]
    Viewer(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, TracerError>;
