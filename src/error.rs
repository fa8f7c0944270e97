use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Request to {url} failed: {source}")]
    Http {
        url: String,
        source: reqwest::Error,
    },

    #[error("{message}")]
    UnexpectedStatus {
        url: String,
        status: reqwest::StatusCode,
        message: String,
    },

    #[error("Cannot decode response: {0}")]
    Decode(String),

    #[error("Store error: {0}")]
    Store(String),
}

pub type Result<T> = std::result::Result<T, RegistrationError>;
