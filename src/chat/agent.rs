//! The research agent: a language model driving the MCP tools.

use std::sync::Arc;

use async_trait::async_trait;
use rmcp::model::{
    ClientInfo, CreateElicitationRequestParams, CreateElicitationResult,
    CreateMessageRequestParams, CreateMessageResult, ErrorData,
};
use rmcp::service::{RequestContext, RoleClient};
use rmcp::ClientHandler;
use serde_json::{json, Value};

use super::console::{prompt_choice, LineInput};
use super::error::AgentError;
use super::llm::{function_tool, ChatMessage, ChatModel, ToolCall};
use super::transcript::{Role, Turn};
use crate::mcp::client::client_info;
use crate::mcp::{ClientError, McpClient};
use crate::tools::Elicitation;

/// Something that answers a user message given the conversation so far.
#[async_trait]
pub trait Agent: Send {
    /// Produces the assistant's reply to `input`.
    async fn respond(&mut self, history: &[Turn], input: &str) -> Result<String, AgentError>;
}

/// An agent that lets the model call MCP tools until it can answer.
pub struct ToolAgent<M, H: ClientHandler> {
    model: Arc<M>,
    mcp: McpClient<H>,
    tools: Vec<Value>,
    system_prompt: String,
    max_tool_rounds: u32,
}

impl<M, H> ToolAgent<M, H>
where
    M: ChatModel,
    H: ClientHandler,
{
    /// Builds the agent from a connected MCP session, listing its tools.
    ///
    /// # Errors
    ///
    /// Returns an error if the tool list cannot be fetched.
    pub async fn connect(
        model: Arc<M>,
        mut mcp: McpClient<H>,
        system_prompt: String,
        max_tool_rounds: u32,
    ) -> Result<Self, ClientError> {
        let definitions = mcp.list_tools().await?;
        tracing::info!(
            tools = ?definitions.iter().map(|t| t.name.as_str()).collect::<Vec<_>>(),
            "Discovered MCP tools"
        );

        Ok(Self {
            model,
            tools: definitions.iter().map(function_tool).collect(),
            mcp,
            system_prompt,
            max_tool_rounds,
        })
    }

    /// Number of tools offered to the model.
    #[must_use]
    pub fn tool_count(&self) -> usize {
        self.tools.len()
    }

    /// Returns the MCP session, e.g. for shutdown.
    pub fn into_client(self) -> McpClient<H> {
        self.mcp
    }

    async fn run_tool(&mut self, call: &ToolCall) -> String {
        let arguments = if call.function.arguments.trim().is_empty() {
            Value::Object(serde_json::Map::new())
        } else {
            match serde_json::from_str::<Value>(&call.function.arguments) {
                Ok(arguments) => arguments,
                Err(e) => return format!("Error: arguments are not valid JSON: {e}"),
            }
        };

        tracing::info!(tool = %call.function.name, %arguments, "Calling tool");
        match self.mcp.call_tool(&call.function.name, arguments).await {
            Ok(result) if result.is_error => format!("Error: {}", result.joined_text()),
            Ok(result) => result.joined_text(),
            Err(e) => format!("Error: {e}"),
        }
    }
}

#[async_trait]
impl<M, H> Agent for ToolAgent<M, H>
where
    M: ChatModel,
    H: ClientHandler,
{
    async fn respond(&mut self, history: &[Turn], input: &str) -> Result<String, AgentError> {
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(ChatMessage::system(self.system_prompt.clone()));
        messages.extend(history.iter().map(|turn| match turn.role {
            Role::User => ChatMessage::user(turn.content.clone()),
            Role::Assistant => ChatMessage::assistant(turn.content.clone()),
        }));
        messages.push(ChatMessage::user(input));

        for round in 0..=self.max_tool_rounds {
            let reply = self.model.complete(&messages, &self.tools, None).await?;

            if reply.tool_calls.is_empty() {
                return Ok(reply.content.unwrap_or_default());
            }
            if round == self.max_tool_rounds {
                break;
            }

            let calls = reply.tool_calls.clone();
            messages.push(reply);
            for call in &calls {
                let output = self.run_tool(call).await;
                messages.push(ChatMessage::tool(call.id.clone(), output));
            }
        }

        Err(AgentError::TooManyToolRounds(self.max_tool_rounds))
    }
}

/// Answers the server's sampling and elicitation requests.
///
/// Sampling goes to the same model the agent uses; elicitation asks the
/// person at the terminal.
pub struct AssistantHandler<M> {
    model: Arc<M>,
    input: LineInput,
}

impl<M: ChatModel> AssistantHandler<M> {
    /// Creates a handler.
    pub const fn new(model: Arc<M>, input: LineInput) -> Self {
        Self { model, input }
    }
}

impl<M: ChatModel + 'static> ClientHandler for AssistantHandler<M> {
    async fn create_message(
        &self,
        params: CreateMessageRequestParams,
        _context: RequestContext<RoleClient>,
    ) -> Result<CreateMessageResult, ErrorData> {
        let messages = sampling_messages(&params)?;
        let reply = self
            .model
            .complete(&messages, &[], Some(params.max_tokens))
            .await
            .map_err(|e| ErrorData::internal_error(e.to_string(), None))?;

        sampling_result(self.model.model_name(), reply.content.unwrap_or_default())
    }

    async fn create_elicitation(
        &self,
        request: CreateElicitationRequestParams,
        _context: RequestContext<RoleClient>,
    ) -> Result<CreateElicitationResult, ErrorData> {
        let message = elicitation_message(&request)?;
        let mut stdout = std::io::stdout();
        let choice = prompt_choice(&self.input, &mut stdout, &message)
            .await
            .map_err(|e| ErrorData::internal_error(e.to_string(), None))?;

        elicitation_result(choice)
    }

    fn get_info(&self) -> ClientInfo {
        client_info()
    }
}

/// Converts a sampling request into chat messages, keeping text content.
///
/// # Errors
///
/// Returns `invalid_params` if no message carries text.
fn sampling_messages(params: &CreateMessageRequestParams) -> Result<Vec<ChatMessage>, ErrorData> {
    let wire = serde_json::to_value(params)
        .map_err(|e| ErrorData::internal_error(e.to_string(), None))?;

    let mut messages = Vec::with_capacity(params.messages.len() + 1);
    if let Some(system) = &params.system_prompt {
        messages.push(ChatMessage::system(system.clone()));
    }

    let mut has_text = false;
    for message in wire["messages"].as_array().into_iter().flatten() {
        let Some(text) = content_text(&message["content"]) else {
            continue;
        };
        has_text = true;
        messages.push(if message["role"] == "assistant" {
            ChatMessage::assistant(text)
        } else {
            ChatMessage::user(text)
        });
    }

    if !has_text {
        return Err(ErrorData::invalid_params(
            "sampling request has no text messages",
            None,
        ));
    }
    Ok(messages)
}

/// Text of a content block, or of the text blocks in a list of them.
fn content_text(content: &Value) -> Option<String> {
    let blocks = match content {
        Value::Array(blocks) => blocks.as_slice(),
        single => std::slice::from_ref(single),
    };
    let texts: Vec<&str> = blocks
        .iter()
        .filter(|block| block["type"] == "text")
        .filter_map(|block| block["text"].as_str())
        .collect();

    (!texts.is_empty()).then(|| texts.join("\n"))
}

fn sampling_result(model: &str, text: String) -> Result<CreateMessageResult, ErrorData> {
    serde_json::from_value(json!({
        "model": model,
        "stopReason": "endTurn",
        "role": "assistant",
        "content": { "type": "text", "text": text },
    }))
    .map_err(|e| ErrorData::internal_error(e.to_string(), None))
}

fn elicitation_message(request: &CreateElicitationRequestParams) -> Result<String, ErrorData> {
    let wire = serde_json::to_value(request)
        .map_err(|e| ErrorData::internal_error(e.to_string(), None))?;
    wire["message"]
        .as_str()
        .map(ToString::to_string)
        .ok_or_else(|| ErrorData::invalid_params("elicitation request has no message", None))
}

/// The answer to an `elicitation/create` request, as the server's
/// single-field `value` schema expects it.
fn elicitation_result(choice: Elicitation) -> Result<CreateElicitationResult, ErrorData> {
    let wire = match choice {
        Elicitation::Accept(value) => json!({ "action": "accept", "content": { "value": value } }),
        Elicitation::Decline => json!({ "action": "decline" }),
        Elicitation::Cancel => json!({ "action": "cancel" }),
    };
    serde_json::from_value(wire).map_err(|e| ErrorData::internal_error(e.to_string(), None))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::chat::llm::FunctionCall;

    fn sampling_params(wire: Value) -> CreateMessageRequestParams {
        serde_json::from_value(wire).unwrap()
    }

    #[test]
    fn sampling_keeps_roles_and_system_prompt() {
        let params = sampling_params(json!({
            "messages": [
                { "role": "user", "content": { "type": "text", "text": "Make it short" } },
                { "role": "assistant", "content": { "type": "text", "text": "How short?" } }
            ],
            "systemPrompt": "You edit encyclopedia summaries.",
            "maxTokens": 800
        }));

        let messages = sampling_messages(&params).unwrap();
        assert_eq!(
            messages,
            vec![
                ChatMessage::system("You edit encyclopedia summaries."),
                ChatMessage::user("Make it short"),
                ChatMessage::assistant("How short?"),
            ]
        );
        assert_eq!(params.max_tokens, 800);
    }

    #[test]
    fn sampling_without_text_is_rejected() {
        let params = sampling_params(json!({
            "messages": [
                { "role": "user", "content": { "type": "image", "data": "AAAA", "mimeType": "image/png" } }
            ],
            "maxTokens": 10
        }));
        assert!(sampling_messages(&params).is_err());
    }

    #[test]
    fn sampling_result_is_assistant_text() {
        let result = sampling_result("scripted", "Short.".to_string()).unwrap();
        let wire = serde_json::to_value(result).unwrap();
        assert_eq!(wire["model"], "scripted");
        assert_eq!(wire["role"], "assistant");
        assert_eq!(wire["content"]["text"], "Short.");
    }

    #[test]
    fn elicitation_answers_match_the_value_schema() {
        let accept = serde_json::to_value(
            elicitation_result(Elicitation::Accept("2".to_string())).unwrap(),
        )
        .unwrap();
        assert_eq!(accept["action"], "accept");
        assert_eq!(accept["content"]["value"], "2");

        let decline = serde_json::to_value(elicitation_result(Elicitation::Decline).unwrap()).unwrap();
        assert_eq!(decline["action"], "decline");

        let cancel = serde_json::to_value(elicitation_result(Elicitation::Cancel).unwrap()).unwrap();
        assert_eq!(cancel["action"], "cancel");
    }

    #[test]
    fn content_lists_are_joined() {
        let content = json!([
            { "type": "text", "text": "first" },
            { "type": "image", "data": "AAAA", "mimeType": "image/png" },
            { "type": "text", "text": "second" }
        ]);
        assert_eq!(content_text(&content).as_deref(), Some("first\nsecond"));
        assert_eq!(content_text(&json!({ "type": "audio" })), None);
    }

    #[test]
    fn tool_call_shape_matches_wire() {
        let call = ToolCall {
            id: "c1".to_string(),
            kind: "function".to_string(),
            function: FunctionCall {
                name: "search_wikipedia".to_string(),
                arguments: "{}".to_string(),
            },
        };
        let json = serde_json::to_value(&call).unwrap();
        assert_eq!(json["type"], "function");
    }
}
