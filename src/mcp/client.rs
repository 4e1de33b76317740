//! MCP client for the chat binary, built on `rmcp`.
//!
//! [`McpClient`] wraps an `rmcp` running service. `rmcp` owns the child
//! process, the initialize handshake and request routing; requests the
//! server sends back (sampling, elicitation) reach the [`ClientHandler`]
//! the client was started with.

use std::path::Path;
use std::time::Duration;

use rmcp::model::{
    CallToolRequestParams, CallToolResult, ClientCapabilities, ClientInfo, ProtocolVersion, Tool,
};
use rmcp::service::{ClientInitializeError, RoleClient, RunningService, ServiceError};
use rmcp::transport::{IntoTransport, TokioChildProcess};
use rmcp::{ClientHandler, ServiceExt};
use serde_json::Value;
use thiserror::Error;
use tokio::process::Command;

use crate::mcp::protocol::{ToolCallResult, ToolContent, ToolDefinition};

/// Name the client reports in `initialize`.
pub const CLIENT_NAME: &str = "wiki-chat";

/// Errors that can occur in the MCP client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The server process could not be started.
    #[error("Failed to start MCP server '{command}': {source}")]
    Spawn {
        /// The command that was run.
        command: String,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The initialize handshake failed.
    #[error("MCP handshake failed: {0}")]
    Initialize(#[from] ClientInitializeError),

    /// A request to the server failed.
    #[error("MCP {method} failed: {source}")]
    Service {
        /// The request method.
        method: &'static str,
        /// The underlying error.
        #[source]
        source: ServiceError,
    },

    /// The server did not answer in time.
    #[error("Timed out waiting for MCP server ({0})")]
    Timeout(&'static str),

    /// Tool arguments were not a JSON object.
    #[error("MCP tool arguments must be a JSON object, got {0}")]
    Arguments(Value),
}

/// The `initialize` parameters the chat client sends.
///
/// Advertises sampling and elicitation so the advanced tools can call back.
#[must_use]
pub fn client_info() -> ClientInfo {
    let mut capabilities = ClientCapabilities::default();
    capabilities.sampling = Some(Default::default());
    capabilities.elicitation = Some(Default::default());

    let mut info = ClientInfo::default();
    info.protocol_version = ProtocolVersion::V_2025_06_18;
    info.capabilities = capabilities;
    info.client_info.name = CLIENT_NAME.to_string();
    info.client_info.version = env!("CARGO_PKG_VERSION").to_string();
    info
}

/// A live MCP session.
pub struct McpClient<H: ClientHandler> {
    service: RunningService<RoleClient, H>,
    timeout: Duration,
}

impl<H: ClientHandler> McpClient<H> {
    /// Launches `command` and runs the handshake over its stdio.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be started or the handshake
    /// fails or takes longer than `timeout`.
    pub async fn spawn(
        command: &Path,
        args: &[String],
        handler: H,
        timeout: Duration,
    ) -> Result<Self, ClientError> {
        let mut cmd = Command::new(command);
        cmd.args(args);

        let transport = TokioChildProcess::new(cmd).map_err(|source| ClientError::Spawn {
            command: command.display().to_string(),
            source,
        })?;
        tracing::debug!(command = %command.display(), "Started MCP server");

        Self::connect(handler, transport, timeout).await
    }

    /// Runs the handshake over an existing transport.
    ///
    /// # Errors
    ///
    /// Returns an error if the handshake fails or takes longer than `timeout`.
    pub async fn connect<T, E, A>(
        handler: H,
        transport: T,
        timeout: Duration,
    ) -> Result<Self, ClientError>
    where
        T: IntoTransport<RoleClient, E, A>,
        E: std::error::Error + Send + Sync + 'static,
    {
        let service = tokio::time::timeout(timeout, handler.serve(transport))
            .await
            .map_err(|_| ClientError::Timeout("initialize"))??;

        if let Some(info) = service.peer().peer_info() {
            tracing::info!(
                server = %info.server_info.name,
                version = %info.server_info.version,
                protocol = ?info.protocol_version,
                "Connected to MCP server"
            );
        }

        Ok(Self { service, timeout })
    }

    /// Name the server reported in its `initialize` result.
    #[must_use]
    pub fn server_name(&self) -> Option<&str> {
        self.service
            .peer()
            .peer_info()
            .map(|info| info.server_info.name.as_str())
    }

    /// Lists every tool the server offers.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or times out.
    pub async fn list_tools(&mut self) -> Result<Vec<ToolDefinition>, ClientError> {
        let tools = tokio::time::timeout(self.timeout, self.service.peer().list_all_tools())
            .await
            .map_err(|_| ClientError::Timeout("tools/list"))?
            .map_err(|source| ClientError::Service {
                method: "tools/list",
                source,
            })?;

        Ok(tools.into_iter().map(tool_definition).collect())
    }

    /// Calls a tool. `arguments` must be a JSON object or `null`.
    ///
    /// Not bounded by the client timeout: the tool may be waiting on the
    /// user through elicitation. The server bounds its own waits.
    ///
    /// # Errors
    ///
    /// Returns an error if the arguments are not an object or the request
    /// fails. A tool that fails still yields `Ok` with `is_error` set.
    pub async fn call_tool(
        &mut self,
        name: &str,
        arguments: Value,
    ) -> Result<ToolCallResult, ClientError> {
        let arguments = match arguments {
            Value::Null => None,
            Value::Object(map) => Some(map),
            other => return Err(ClientError::Arguments(other)),
        };

        let result = self
            .service
            .peer()
            .call_tool(CallToolRequestParams {
                meta: None,
                name: name.to_owned().into(),
                arguments,
                task: None,
            })
            .await
            .map_err(|source| ClientError::Service {
                method: "tools/call",
                source,
            })?;

        Ok(tool_call_result(result))
    }

    /// Closes the session and stops the server process.
    pub async fn shutdown(self) {
        match self.service.cancel().await {
            Ok(reason) => tracing::debug!(?reason, "MCP session closed"),
            Err(e) => tracing::warn!(error = %e, "MCP session did not shut down cleanly"),
        }
    }
}

fn tool_definition(tool: Tool) -> ToolDefinition {
    ToolDefinition {
        name: tool.name.to_string(),
        description: tool.description.map(|d| d.to_string()),
        input_schema: Value::Object((*tool.input_schema).clone()),
    }
}

fn tool_call_result(result: CallToolResult) -> ToolCallResult {
    let content = result
        .content
        .iter()
        .filter_map(|item| item.as_text())
        .map(|text| ToolContent::Text {
            text: text.text.clone(),
        })
        .collect();

    ToolCallResult {
        content,
        is_error: result.is_error.unwrap_or(false),
    }
}
