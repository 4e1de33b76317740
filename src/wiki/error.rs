//! Error types for article source operations.

use thiserror::Error;

/// Result type for article source operations.
pub type SourceResult<T> = Result<T, SourceError>;

/// Errors that can occur while talking to the article source.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The request could not be sent or the response body could not be read.
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    Status {
        /// Status code returned by the service.
        status: u16,
        /// Endpoint that was called.
        url: String,
    },

    /// The response body did not have the expected shape.
    #[error("unexpected response: {message}")]
    Decode {
        /// Description of what was wrong with the body.
        message: String,
    },
}

impl SourceError {
    /// Creates a decode error.
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }
}
