//! Error types shared by every front end.

use thiserror::Error;

/// Banner text used when nothing more specific is available.
pub const GENERIC_SUBMIT_MESSAGE: &str = "Error processing files";

/// Banner text for a failed clear.
pub const CLEAR_FAILED_MESSAGE: &str = "Failed to clear records.";

/// Banner text for a failed `GET /records`.
pub const FETCH_FAILED_MESSAGE: &str = "Failed to fetch records. Please check the server.";

/// Common error type
#[derive(Error, Debug)]
pub enum Error {
    /// Missing required input. Raised before any request is built.
    #[error("{0}")]
    Validation(String),

    #[error("a submission is already in progress")]
    Busy,

    #[error("Network error: {0}")]
    Network(String),

    #[error("request timed out after {0} seconds")]
    Timeout(u64),

    /// Non-2xx response. `message` is the `error` field of the body, if any.
    #[error("server returned {status}: {}", message.as_deref().unwrap_or(GENERIC_SUBMIT_MESSAGE))]
    Remote { status: u16, message: Option<String> },

    #[error("Failed to clear records: {0}")]
    Clear(Box<Error>),

    #[error("nothing to export: the record list is empty")]
    NothingToExport,

    #[error("Export error: {0}")]
    Export(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// The single message shown to the user for this error.
    pub fn user_message(&self) -> String {
        match self {
            Error::Validation(msg) => msg.clone(),
            Error::Remote { message: Some(msg), .. } if !msg.trim().is_empty() => msg.clone(),
            Error::Clear(_) => CLEAR_FAILED_MESSAGE.to_string(),
            Error::NothingToExport => "No records to export.".to_string(),
            _ => GENERIC_SUBMIT_MESSAGE.to_string(),
        }
    }

    /// Whether the failure happened in transport rather than on the server.
    pub fn is_network(&self) -> bool {
        matches!(self, Error::Network(_) | Error::Timeout(_))
    }
}

/// Result alias
pub type Result<T> = std::result::Result<T, Error>;
