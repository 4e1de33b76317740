//! Research-assistant chat client.
//!
//! The `wiki-chat` binary wires these pieces together:
//!
//! - [`llm`] — OpenAI-compatible Chat Completions client and provider selection
//! - [`agent`] — [`ToolAgent`], which lets the model call MCP tools, and
//!   [`AssistantHandler`], which answers the server's sampling and
//!   elicitation requests
//! - [`session`] — the interactive loop and its commands
//! - [`transcript`] — conversation history
//! - [`console`] — terminal input shared by the loop and elicitation prompts
//! - [`prompts`] — fixed text
//! - [`error`] — error types

pub mod agent;
pub mod console;
pub mod error;
pub mod llm;
pub mod prompts;
pub mod session;
pub mod transcript;

pub use agent::{Agent, AssistantHandler, ToolAgent};
pub use console::LineInput;
pub use error::{AgentError, ChatError, EnvironmentError, LlmError};
pub use llm::{ChatMessage, ChatModel, LlmClient, LlmSettings, Provider};
pub use session::{ChatSession, Command, SessionState};
pub use transcript::{Role, Transcript, Turn};
