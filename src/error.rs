// Error types for apicmd.
// Separates transport failures, malformed bodies, API-level rejections and cache I/O.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Malformed response: {0}")]
    MalformedResponse(#[from] serde_json::Error),

    /// The API answered with `success: false`. Carries the `error` field verbatim.
    #[error("{0}")]
    Business(String),

    #[error("Cache IO error: {0}")]
    CacheIo(#[from] std::io::Error),
}

impl ApiError {
    /// Whether this error came from the API envelope rather than the plumbing.
    pub fn is_business(&self) -> bool {
        matches!(self, ApiError::Business(_))
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
