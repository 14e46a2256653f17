use deepsite_scanner::ScanError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error("No readable content found for this URL: {0}")]
    NoReadableContent(String),

    #[error("Unknown session {0}. Please summarize a site first.")]
    UnknownSession(String),

    #[error("Answer engine request failed: {0}")]
    Engine(String),

    #[error("Invalid configuration for {key}: {reason}")]
    InvalidConfig { key: String, reason: String },
}

impl From<reqwest::Error> for CoreError {
    fn from(err: reqwest::Error) -> Self {
        CoreError::Engine(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
