use thiserror::Error;

/// Application error types.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("External API error: {0}")]
    ExternalApi(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("No data: {0}")]
    NoData(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),

    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// Whether retrying the same request could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            AppError::ExternalApi(_) => true,
            AppError::Reqwest(e) => !e.is_decode(),
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
