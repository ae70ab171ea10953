use thiserror::Error;

/// Failure taxonomy for a single ingestion run.
///
/// `NotFound` is reported through the status sink and never escapes as a
/// crash; `Format` and `Processing` are surfaced to the caller so it can
/// tell "this was not a light-field capture" apart from "this was a
/// capture but something downstream broke".
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("file not found: {0}")]
    NotFound(String),

    #[error("file type not recognized: {0}")]
    Format(String),

    #[error("capture processing failed: {0}")]
    Processing(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, IngestError>;
