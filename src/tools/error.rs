//! Error types for tool operations.
//!
//! Every variant renders to the human-readable message that is sent back
//! to the caller as an error tool result.

use thiserror::Error;

use super::context::ContextError;
use crate::wiki::SourceError;

/// Result type for tool operations.
pub type ToolResult<T> = Result<T, ToolError>;

/// Errors that can occur while running a tool.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Input was empty or out of range. Raised before any external call.
    #[error("{0}")]
    InvalidArgument(String),

    /// The article source has no page with this title.
    #[error("Article '{title}' not found on Wikipedia")]
    NotFound {
        /// Title as requested by the caller.
        title: String,
    },

    /// The page exists but the requested field is empty.
    #[error("No {field} available for article '{title}'")]
    NoContent {
        /// Which field was empty ("summary" or "content").
        field: &'static str,
        /// Title as requested by the caller.
        title: String,
    },

    /// The article source failed (network, HTTP status, bad body).
    #[error("Failed to {operation}: {source}")]
    External {
        /// What the tool was doing, e.g. "search Wikipedia".
        operation: &'static str,
        /// The underlying source error.
        #[source]
        source: SourceError,
    },

    /// A disambiguation answer matched no candidate.
    #[error("Invalid selection '{input}'. Please enter a title name or number 1-{count}.")]
    InvalidSelection {
        /// The caller's answer.
        input: String,
        /// Number of candidates offered.
        count: usize,
    },

    /// Talking back to the client (sampling, elicitation) failed.
    #[error(transparent)]
    Context(#[from] ContextError),
}

impl ToolError {
    /// Creates an invalid-argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Creates a not-found error.
    pub fn not_found(title: impl Into<String>) -> Self {
        Self::NotFound {
            title: title.into(),
        }
    }

    /// Returns a closure that wraps a source error for `operation`.
    pub fn external(operation: &'static str) -> impl FnOnce(SourceError) -> Self {
        move |source| Self::External { operation, source }
    }
}
