//! Callbacks from a running tool to the client that invoked it.
//!
//! Some tools need more than their arguments: they log to the client,
//! report progress, ask the client's LLM to generate text (sampling), or
//! ask the user a question (elicitation). The MCP server implements
//! [`ToolContext`] on top of its transport; tests use scripted fakes.

use async_trait::async_trait;
use thiserror::Error;

/// Outcome of an elicitation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Elicitation {
    /// The user answered.
    Accept(String),
    /// The user explicitly declined to answer.
    Decline,
    /// The prompt was dismissed without an answer.
    Cancel,
}

/// Errors that can occur while calling back into the client.
#[derive(Debug, Error)]
pub enum ContextError {
    /// The client did not advertise the capability during initialisation.
    #[error("Client does not support {0}")]
    Unsupported(&'static str),

    /// The client went away while a response was pending.
    #[error("Client connection closed while waiting for {0} response")]
    Closed(&'static str),

    /// No response arrived in time.
    #[error("Timed out waiting for client {0} response")]
    Timeout(&'static str),

    /// The server was told to stop while waiting.
    #[error("Server is shutting down")]
    ShuttingDown,

    /// The client answered with a JSON-RPC error.
    #[error("Client rejected {method}: {message}")]
    Rejected {
        /// The request method.
        method: &'static str,
        /// Error message from the client.
        message: String,
    },

    /// The client's answer did not have the expected shape.
    #[error("Malformed client response: {0}")]
    Protocol(String),

    /// Reading or writing the transport failed.
    #[error("Transport error: {0}")]
    Io(#[from] std::io::Error),
}

/// Callbacks available to a tool while it runs.
#[async_trait]
pub trait ToolContext: Send {
    /// Sends an info-level log message to the client. Best effort.
    async fn info(&mut self, message: &str);

    /// Reports progress to the client, if it asked for progress. Best effort.
    async fn report_progress(&mut self, progress: u32, total: u32);

    /// Asks the client's language model to complete `prompt`.
    async fn sample(&mut self, prompt: &str, max_tokens: u32) -> Result<String, ContextError>;

    /// Asks the user a free-text question.
    async fn elicit(&mut self, message: &str) -> Result<Elicitation, ContextError>;
}
