use thiserror::Error;

/// Failure to ingest a form document.
#[derive(Error, Debug)]
pub enum FormError {
    #[error("malformed form document: {0}")]
    Parse(#[from] serde_json::Error),
}
