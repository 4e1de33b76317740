//! OpenAI-compatible Chat Completions client.
//!
//! Works against OpenAI itself or any server exposing the same API under
//! `/v1` (Ollama, LM Studio). Provider selection comes from the
//! environment; see [`LlmSettings::from_lookup`].

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::error::{EnvironmentError, LlmError};
use crate::config::ChatConfig;
use crate::mcp::ToolDefinition;

/// Default OpenAI endpoint.
pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
/// Default OpenAI model.
pub const OPENAI_DEFAULT_MODEL: &str = "gpt-4o-mini";
/// Shortest API key that is not obviously a placeholder.
const MIN_API_KEY_LEN: usize = 10;
/// Longest error body kept in [`LlmError::Status`].
const MAX_ERROR_BODY: usize = 500;

/// Which backend the settings point at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    /// api.openai.com with an API key.
    OpenAi,
    /// A local Ollama server.
    Ollama,
}

/// Resolved connection settings for the language model.
#[derive(Clone, PartialEq, Eq)]
pub struct LlmSettings {
    /// The backend.
    pub provider: Provider,
    /// Base URL including `/v1`.
    pub base_url: String,
    /// Model name.
    pub model: String,
    /// Bearer token, if the backend needs one.
    pub api_key: Option<String>,
}

impl std::fmt::Debug for LlmSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmSettings")
            .field("provider", &self.provider)
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl LlmSettings {
    /// Resolves settings from the process environment.
    ///
    /// # Errors
    ///
    /// Returns every problem found if no usable provider is configured.
    pub fn from_env(chat: &ChatConfig) -> Result<Self, EnvironmentError> {
        Self::from_lookup(|name| std::env::var(name).ok(), chat)
    }

    /// Resolves settings using `lookup` for environment variables.
    ///
    /// `OPENAI_API_KEY` selects OpenAI. Without it, `OLLAMA_MODEL` and
    /// `OLLAMA_BASE_URL` select Ollama at `{OLLAMA_BASE_URL}/v1`. The chat
    /// config's `model` and `base_url` override either.
    ///
    /// # Errors
    ///
    /// Returns every problem found if no usable provider is configured.
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
        chat: &ChatConfig,
    ) -> Result<Self, EnvironmentError> {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(api_key) = var("OPENAI_API_KEY") {
            if api_key.trim().len() < MIN_API_KEY_LEN {
                return Err(EnvironmentError {
                    problems: vec!["OPENAI_API_KEY appears to be invalid (too short)".to_string()],
                });
            }
            return Ok(Self {
                provider: Provider::OpenAi,
                base_url: chat
                    .base_url
                    .clone()
                    .unwrap_or_else(|| OPENAI_BASE_URL.to_string()),
                model: chat
                    .model
                    .clone()
                    .unwrap_or_else(|| OPENAI_DEFAULT_MODEL.to_string()),
                api_key: Some(api_key.trim().to_string()),
            });
        }

        match (var("OLLAMA_MODEL"), var("OLLAMA_BASE_URL")) {
            (Some(model), Some(base_url)) => Ok(Self {
                provider: Provider::Ollama,
                base_url: chat.base_url.clone().unwrap_or_else(|| {
                    format!("{}/v1", base_url.trim().trim_end_matches('/'))
                }),
                model: chat.model.clone().unwrap_or(model),
                api_key: None,
            }),
            _ => Err(EnvironmentError {
                problems: vec![
                    "OLLAMA_MODEL and OLLAMA_BASE_URL environment variables are not set"
                        .to_string(),
                    "OPENAI_API_KEY environment variable is not set".to_string(),
                ],
            }),
        }
    }
}

/// One message in a Chat Completions conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// "system", "user", "assistant" or "tool".
    pub role: String,
    /// Text content. `None` for assistant messages that only call tools.
    #[serde(default)]
    pub content: Option<String>,
    /// Tool calls requested by the assistant.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    /// For role "tool": which call this answers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl ChatMessage {
    fn text(role: &str, content: impl Into<String>) -> Self {
        Self {
            role: role.to_string(),
            content: Some(content.into()),
            tool_calls: Vec::new(),
            tool_call_id: None,
        }
    }

    /// A system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::text("system", content)
    }

    /// A user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::text("user", content)
    }

    /// An assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::text("assistant", content)
    }

    /// A tool result answering `call_id`.
    pub fn tool(call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            tool_call_id: Some(call_id.into()),
            ..Self::text("tool", content)
        }
    }
}

/// A function call requested by the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Call identifier, echoed back in the tool message.
    pub id: String,
    /// Always "function".
    #[serde(rename = "type", default = "function_type")]
    pub kind: String,
    /// The function and its JSON-encoded arguments.
    pub function: FunctionCall,
}

fn function_type() -> String {
    "function".to_string()
}

/// Function name and arguments of a [`ToolCall`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionCall {
    /// Function (tool) name.
    pub name: String,
    /// Arguments as a JSON string.
    pub arguments: String,
}

/// Converts an MCP tool definition into a Chat Completions function tool.
#[must_use]
pub fn function_tool(tool: &ToolDefinition) -> Value {
    json!({
        "type": "function",
        "function": {
            "name": tool.name,
            "description": tool.description.clone().unwrap_or_default(),
            "parameters": tool.input_schema,
        }
    })
}

/// A language model that can answer a conversation.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Model name, reported back in sampling responses.
    fn model_name(&self) -> &str;

    /// Completes the conversation, optionally offering `tools`.
    async fn complete(
        &self,
        messages: &[ChatMessage],
        tools: &[Value],
        max_tokens: Option<u32>,
    ) -> Result<ChatMessage, LlmError>;
}

/// HTTP client for `/chat/completions`.
#[derive(Debug, Clone)]
pub struct LlmClient {
    http: reqwest::Client,
    settings: LlmSettings,
}

impl LlmClient {
    /// Creates a client with a per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(settings: LlmSettings, timeout: Duration) -> Result<Self, LlmError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http, settings })
    }

    /// Returns the resolved settings.
    #[must_use]
    pub const fn settings(&self) -> &LlmSettings {
        &self.settings
    }
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    message: ChatMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[async_trait]
impl ChatModel for LlmClient {
    fn model_name(&self) -> &str {
        &self.settings.model
    }

    async fn complete(
        &self,
        messages: &[ChatMessage],
        tools: &[Value],
        max_tokens: Option<u32>,
    ) -> Result<ChatMessage, LlmError> {
        let url = format!(
            "{}/chat/completions",
            self.settings.base_url.trim_end_matches('/')
        );

        let mut body = json!({
            "model": self.settings.model,
            "messages": messages,
        });
        if let Some(obj) = body.as_object_mut() {
            if !tools.is_empty() {
                obj.insert("tools".into(), Value::Array(tools.to_vec()));
            }
            if let Some(max) = max_tokens {
                obj.insert("max_tokens".into(), max.into());
            }
        }

        tracing::debug!(
            model = %self.settings.model,
            messages = messages.len(),
            tools = tools.len(),
            "Chat completion request"
        );

        let mut request = self.http.post(&url).json(&body);
        if let Some(key) = &self.settings.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(LlmError::Status {
                status: status.as_u16(),
                body: text.chars().take(MAX_ERROR_BODY).collect(),
            });
        }

        let data: CompletionResponse = response.json().await?;
        let choice = data
            .choices
            .into_iter()
            .next()
            .ok_or(LlmError::EmptyResponse)?;

        tracing::debug!(
            finish_reason = choice.finish_reason.as_deref().unwrap_or("none"),
            tool_calls = choice.message.tool_calls.len(),
            "Chat completion response"
        );
        Ok(choice.message)
    }
}
