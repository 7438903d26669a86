use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Missing or invalid credentials/settings. Fatal, nothing is attempted.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The search provider answered with a non-success status.
    #[error("Provider error ({status}): {body}")]
    Provider { status: u16, body: String },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl Error {
    pub fn storage(context: &str, err: impl std::fmt::Display) -> Self {
        Self::Storage(format!("{}: {}", context, err))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
