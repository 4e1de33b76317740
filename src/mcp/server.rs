//! MCP server implementation for the Wikipedia tools.
//!
//! This module implements the MCP server lifecycle:
//!
//! 1. **Initialisation**: Capability negotiation and version agreement
//! 2. **Operation**: Handling tool calls and other requests
//! 3. **Shutdown**: Graceful connection termination
//!
//! # Architecture
//!
//! The server owns the transport and a [`WikiTools`] instance. Tool calls
//! are handled one at a time; a tool that needs the client (sampling,
//! elicitation) borrows the transport through a [`PeerContext`] until it
//! finishes.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::config::ServerConfig;
use crate::mcp::peer::{ClientCapabilities, PeerContext};
use crate::mcp::protocol::{
    negotiate_version, parse_message, ErrorCode, IncomingMessage, JsonRpcError,
    JsonRpcErrorData, JsonRpcNotification, JsonRpcRequest, JsonRpcResponse, RequestId,
    ToolCallParams, ToolCallResult, SERVER_NAME,
};
use crate::mcp::registry::{self, ToolKind};
use crate::mcp::transport::{LineTransport, StdioTransport};
use crate::tools::WikiTools;
use crate::wiki::ArticleSource;

/// Server state in the MCP lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    /// Waiting for initialize request.
    AwaitingInit,
    /// Initialize received, waiting for initialized notification.
    Initialising,
    /// Ready for normal operation.
    Running,
    /// Shutdown in progress.
    ShuttingDown,
}

/// Server capabilities advertised during initialisation.
#[derive(Debug, Clone, Serialize)]
pub struct ServerCapabilities {
    /// Tool-related capabilities.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<ToolCapabilities>,

    /// Present because the server sends `notifications/message`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logging: Option<Value>,
}

impl Default for ServerCapabilities {
    fn default() -> Self {
        Self {
            tools: Some(ToolCapabilities::default()),
            logging: Some(json!({})),
        }
    }
}

/// Tool-specific capabilities.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ToolCapabilities {
    /// Whether the tool list can change during the session.
    #[serde(rename = "listChanged", skip_serializing_if = "is_false")]
    pub list_changed: bool,
}

#[allow(clippy::trivially_copy_pass_by_ref)] // serde's skip_serializing_if requires a predicate fn(&T) -> bool, so we must take &bool here
const fn is_false(b: &bool) -> bool {
    !*b
}

/// Server information for initialisation response.
#[derive(Debug, Clone, Serialize)]
pub struct ServerInfo {
    /// Server name.
    pub name: String,
    /// Server version.
    pub version: String,
}

impl Default for ServerInfo {
    fn default() -> Self {
        Self {
            name: SERVER_NAME.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Client information received during initialisation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientInfo {
    /// Client name.
    pub name: String,
    /// Client version.
    #[serde(default)]
    pub version: Option<String>,
}

/// Parameters for the initialize request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeParams {
    /// Protocol version requested by client.
    pub protocol_version: String,
    /// Client capabilities.
    #[serde(default)]
    pub capabilities: ClientCapabilities,
    /// Client information.
    #[serde(default)]
    pub client_info: Option<ClientInfo>,
}

/// The MCP server for the Wikipedia tools.
pub struct McpServer<S, R, W> {
    /// Current server state.
    state: ServerState,
    /// The transport layer.
    transport: LineTransport<R, W>,
    /// Negotiated protocol version (set after initialisation).
    protocol_version: Option<String>,
    /// What the client said it can do.
    client_capabilities: ClientCapabilities,
    /// The tool implementations.
    tools: WikiTools<S>,
    /// Tools exposed in this session.
    catalogue: Vec<ToolKind>,
    /// Bound on each wait for a client response.
    peer_timeout: Duration,
    /// Counter for server-initiated request IDs.
    next_request_id: u64,
    /// Turns `true` when the server should stop.
    shutdown: watch::Receiver<bool>,
}

impl<S: ArticleSource> McpServer<S, tokio::io::Stdin, tokio::io::Stdout> {
    /// Creates a server on process stdin/stdout.
    #[must_use]
    pub fn stdio(tools: WikiTools<S>, config: &ServerConfig) -> Self {
        Self::new(tools, StdioTransport::stdio(), config)
    }
}

impl<S, R, W> McpServer<S, R, W>
where
    S: ArticleSource,
    R: AsyncRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    /// Creates a new MCP server over the given transport.
    pub fn new(tools: WikiTools<S>, transport: LineTransport<R, W>, config: &ServerConfig) -> Self {
        Self {
            state: ServerState::AwaitingInit,
            transport,
            protocol_version: None,
            client_capabilities: ClientCapabilities::default(),
            tools,
            catalogue: ToolKind::enabled(config.advanced_tools),
            peer_timeout: config.peer_timeout(),
            next_request_id: 0,
            shutdown: watch::channel(false).1,
        }
    }

    /// Returns the current server state.
    #[must_use]
    pub const fn state(&self) -> ServerState {
        self.state
    }

    /// Returns the negotiated protocol version, once initialised.
    #[must_use]
    pub fn protocol_version(&self) -> Option<&str> {
        self.protocol_version.as_deref()
    }

    /// Runs the MCP server main loop with graceful shutdown handling.
    ///
    /// SIGINT and SIGTERM (Ctrl+C on Windows) stop the loop, including a
    /// tool that is waiting on the client.
    ///
    /// # Errors
    ///
    /// Returns an error if the signal handlers cannot be installed or
    /// transport I/O fails.
    pub async fn run(&mut self) -> std::io::Result<()> {
        let (stop, shutdown) = watch::channel(false);
        let listener = listen_for_signals(stop)?;
        let result = self.serve_until(shutdown).await;
        listener.abort();
        result
    }

    /// Runs the main loop until the client closes the connection.
    ///
    /// # Errors
    ///
    /// Returns an error if transport I/O fails.
    pub async fn serve(&mut self) -> std::io::Result<()> {
        let (_stop, shutdown) = watch::channel(false);
        self.serve_until(shutdown).await
    }

    /// Runs the main loop until the client closes the connection or
    /// `shutdown` turns `true`.
    ///
    /// # Errors
    ///
    /// Returns an error if transport I/O fails.
    pub async fn serve_until(&mut self, shutdown: watch::Receiver<bool>) -> std::io::Result<()> {
        self.shutdown = shutdown;

        loop {
            if *self.shutdown.borrow_and_update() {
                tracing::info!("Shutdown requested, stopping server");
                self.state = ServerState::ShuttingDown;
                return Ok(());
            }

            tokio::select! {
                Ok(()) = self.shutdown.changed() => {}

                line_result = self.transport.read_line() => {
                    if self.handle_transport_result(line_result).await? {
                        return Ok(());
                    }
                }
            }
        }
    }

    /// Handles the result from transport read.
    ///
    /// Returns `true` if the server should shut down.
    async fn handle_transport_result(
        &mut self,
        line_result: std::io::Result<Option<String>>,
    ) -> std::io::Result<bool> {
        let Some(line) = line_result? else {
            tracing::info!("Client closed the connection");
            self.state = ServerState::ShuttingDown;
            return Ok(true);
        };

        if line.trim().is_empty() {
            return Ok(false);
        }

        self.handle_line(&line).await?;

        Ok(self.state == ServerState::ShuttingDown)
    }

    /// Handles a single line of input.
    async fn handle_line(&mut self, line: &str) -> std::io::Result<()> {
        match parse_message(line) {
            Ok(msg) => self.handle_message(msg).await,
            Err(error) => {
                tracing::warn!(code = error.error.code, "Rejected malformed message");
                self.transport.write_error(&error).await
            }
        }
    }

    /// Handles a parsed incoming message.
    async fn handle_message(&mut self, msg: IncomingMessage) -> std::io::Result<()> {
        match msg {
            IncomingMessage::Request(req) => self.handle_request(req).await,
            IncomingMessage::Notification(ref notif) => {
                self.handle_notification(notif);
                Ok(())
            }
            IncomingMessage::Response(resp) => {
                tracing::warn!(id = %resp.id, "Ignoring response outside a tool call");
                Ok(())
            }
        }
    }

    /// Handles an incoming request.
    async fn handle_request(&mut self, req: JsonRpcRequest) -> std::io::Result<()> {
        tracing::debug!(method = %req.method, id = %req.id, "Handling request");

        let response = match req.method.as_str() {
            "initialize" => self.handle_initialize(&req),
            "tools/list" => self.handle_tools_list(&req),
            "tools/call" => self.handle_tools_call(&req).await,
            "ping" => Ok(Self::handle_ping(&req)),
            _ => Err(JsonRpcError::method_not_found(req.id.clone(), &req.method)),
        };

        match response {
            Ok(resp) => self.transport.write_response(&resp).await,
            Err(error) => self.transport.write_error(&error).await,
        }
    }

    /// Handles an incoming notification.
    fn handle_notification(&mut self, notif: &JsonRpcNotification) {
        match notif.method.as_str() {
            "notifications/initialized" if self.state == ServerState::Initialising => {
                tracing::info!("Client initialised, server running");
                self.state = ServerState::Running;
            }
            method => tracing::debug!(method, "Ignoring notification"),
        }
    }

    /// Handles the initialize request.
    fn handle_initialize(&mut self, req: &JsonRpcRequest) -> Result<JsonRpcResponse, JsonRpcError> {
        if self.state != ServerState::AwaitingInit {
            return Err(JsonRpcError::new(
                Some(req.id.clone()),
                JsonRpcErrorData::with_message(
                    ErrorCode::InvalidRequest,
                    "Server already initialised",
                ),
            ));
        }

        let params: InitializeParams = decode_params(req, "initialize")?;

        let negotiated_version = negotiate_version(&params.protocol_version).to_string();
        tracing::info!(
            client = params.client_info.as_ref().map_or("unknown", |c| c.name.as_str()),
            requested = %params.protocol_version,
            negotiated = %negotiated_version,
            sampling = params.capabilities.sampling.is_some(),
            elicitation = params.capabilities.elicitation.is_some(),
            "Initialising session"
        );

        self.protocol_version = Some(negotiated_version.clone());
        self.client_capabilities = params.capabilities;
        self.state = ServerState::Initialising;

        let result = json!({
            "protocolVersion": negotiated_version,
            "capabilities": ServerCapabilities::default(),
            "serverInfo": ServerInfo::default(),
        });

        Ok(JsonRpcResponse::success(req.id.clone(), result))
    }

    /// Handles the tools/list request.
    fn handle_tools_list(&self, req: &JsonRpcRequest) -> Result<JsonRpcResponse, JsonRpcError> {
        self.require_running(&req.id)?;

        let tools: Vec<_> = self.catalogue.iter().map(|kind| kind.definition()).collect();

        let result = json!({
            "tools": tools,
        });

        Ok(JsonRpcResponse::success(req.id.clone(), result))
    }

    /// Handles the tools/call request.
    async fn handle_tools_call(
        &mut self,
        req: &JsonRpcRequest,
    ) -> Result<JsonRpcResponse, JsonRpcError> {
        self.require_running(&req.id)?;

        let params: ToolCallParams = decode_params(req, "tool call")?;

        let result = match ToolKind::from_name(&params.name).filter(|k| self.catalogue.contains(k))
        {
            Some(kind) => {
                tracing::info!(tool = kind.name(), "Calling tool");
                let mut ctx = PeerContext::new(
                    &mut self.transport,
                    &self.client_capabilities,
                    req.progress_token().cloned(),
                    self.peer_timeout,
                    &mut self.next_request_id,
                    self.shutdown.clone(),
                );
                registry::dispatch(&self.tools, kind, params.arguments, &mut ctx).await
            }
            None => ToolCallResult::error(format!("Unknown tool: {}", params.name)),
        };

        let result_value = serde_json::to_value(&result).map_err(|e| {
            tracing::error!(error = %e, "Failed to serialise tool call result");
            JsonRpcError::internal_error(req.id.clone(), "Internal error: failed to serialise result")
        })?;

        Ok(JsonRpcResponse::success(req.id.clone(), result_value))
    }

    /// Handles the ping request.
    fn handle_ping(req: &JsonRpcRequest) -> JsonRpcResponse {
        JsonRpcResponse::success(req.id.clone(), json!({}))
    }

    /// Ensures the server is in the Running state.
    fn require_running(&self, id: &RequestId) -> Result<(), JsonRpcError> {
        if self.state != ServerState::Running {
            return Err(JsonRpcError::new(
                Some(id.clone()),
                JsonRpcErrorData::with_message(ErrorCode::InvalidRequest, "Server not initialised"),
            ));
        }
        Ok(())
    }
}

/// Decodes the params object of a request, which must be present.
fn decode_params<T: serde::de::DeserializeOwned>(
    req: &JsonRpcRequest,
    what: &str,
) -> Result<T, JsonRpcError> {
    req.params
        .as_ref()
        .map(|p| serde_json::from_value(p.clone()))
        .transpose()
        .map_err(|e| JsonRpcError::invalid_params(req.id.clone(), format!("Invalid {what} params: {e}")))?
        .ok_or_else(|| JsonRpcError::invalid_params(req.id.clone(), format!("Missing {what} params")))
}

/// Flips `stop` on SIGINT or SIGTERM.
#[cfg(unix)]
fn listen_for_signals(stop: watch::Sender<bool>) -> std::io::Result<JoinHandle<()>> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;

    Ok(tokio::spawn(async move {
        tokio::select! {
            _ = sigint.recv() => {
                tracing::info!("Received SIGINT, initiating graceful shutdown");
            }

            _ = sigterm.recv() => {
                tracing::info!("Received SIGTERM, initiating graceful shutdown");
            }
        }
        stop.send_replace(true);
    }))
}

/// Flips `stop` on Ctrl+C.
#[cfg(windows)]
fn listen_for_signals(stop: watch::Sender<bool>) -> std::io::Result<JoinHandle<()>> {
    Ok(tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
            stop.send_replace(true);
        }
    }))
}
