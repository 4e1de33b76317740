//! Error types for the chat client.

use thiserror::Error;

use crate::mcp::ClientError;

/// Errors from the Chat Completions endpoint.
#[derive(Debug, Error)]
pub enum LlmError {
    /// The HTTP request failed (connection, timeout, bad body).
    #[error("LLM request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The endpoint answered with a non-success status.
    #[error("LLM endpoint returned HTTP {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, possibly truncated.
        body: String,
    },

    /// The response had no choices.
    #[error("LLM returned no choices")]
    EmptyResponse,
}

/// Errors while answering one user message.
#[derive(Debug, Error)]
pub enum AgentError {
    /// The language model failed.
    #[error(transparent)]
    Llm(#[from] LlmError),

    /// The MCP session failed.
    #[error(transparent)]
    Mcp(#[from] ClientError),

    /// The model kept calling tools without producing an answer.
    #[error("Gave up after {0} rounds of tool calls without an answer")]
    TooManyToolRounds(u32),
}

/// Errors that end a chat session.
#[derive(Debug, Error)]
pub enum ChatError {
    /// The language model client could not be built.
    #[error("Cannot set up the language model client: {0}")]
    Llm(#[from] LlmError),

    /// The MCP server could not be started, initialised or listed.
    #[error("Cannot use the MCP server: {0}")]
    Mcp(#[from] ClientError),

    /// The terminal could not be read or written.
    #[error("Terminal I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// The environment is not set up for a chat session.
#[derive(Debug, Error)]
#[error("{}", .problems.join("\n"))]
pub struct EnvironmentError {
    /// Every problem found, in check order.
    pub problems: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn environment_error_lists_every_problem() {
        let err = EnvironmentError {
            problems: vec!["first".to_string(), "second".to_string()],
        };
        assert_eq!(err.to_string(), "first\nsecond");
    }

    #[test]
    fn chat_error_names_the_failing_part() {
        let spawn = ChatError::from(ClientError::Spawn {
            command: "/opt/wiki/wikipedia-mcp".to_string(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        });
        assert!(spawn
            .to_string()
            .starts_with("Cannot use the MCP server: Failed to start MCP server '/opt/wiki/wikipedia-mcp'"));

        let llm = ChatError::from(LlmError::EmptyResponse);
        assert_eq!(
            llm.to_string(),
            "Cannot set up the language model client: LLM returned no choices"
        );

        let io = ChatError::from(std::io::Error::from(std::io::ErrorKind::BrokenPipe));
        assert!(io.to_string().starts_with("Terminal I/O failed: "));
    }

    #[test]
    fn tool_round_limit_display() {
        assert_eq!(
            AgentError::TooManyToolRounds(8).to_string(),
            "Gave up after 8 rounds of tool calls without an answer"
        );
    }
}
