use thiserror::Error;

#[derive(Error, Debug)]
pub enum MatcherError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Invalid export directory: {0}")]
    InvalidExportDir(String),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] gazette_matcher_common::Error),
}

impl MatcherError {
    /// Banner text for errors that came from the session layer.
    pub fn user_message(&self) -> String {
        match self {
            MatcherError::Common(e) => e.user_message(),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, MatcherError>;
