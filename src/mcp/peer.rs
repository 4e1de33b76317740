//! Server-to-client callbacks during a tool call.
//!
//! [`PeerContext`] implements [`ToolContext`] on top of the server's
//! transport. Requests to the client (sampling, elicitation) block the tool
//! until the matching response arrives, the deadline passes or the server
//! is told to stop. Meanwhile `ping` is answered and other traffic is
//! turned away.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::watch;
use tokio::time::Instant;

use crate::mcp::protocol::{
    parse_message, ErrorCode, IncomingMessage, JsonRpcError, JsonRpcErrorData, JsonRpcRequest,
    JsonRpcResponse, OutgoingNotification, OutgoingRequest, RequestId, SERVER_NAME,
};
use crate::mcp::transport::LineTransport;
use crate::tools::{ContextError, Elicitation, ToolContext};

/// Capabilities the client advertised in `initialize`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClientCapabilities {
    /// Present if the client can run `sampling/createMessage`.
    #[serde(default)]
    pub sampling: Option<Value>,

    /// Present if the client can run `elicitation/create`.
    #[serde(default)]
    pub elicitation: Option<Value>,
}

/// Tool callbacks routed over the MCP connection.
pub struct PeerContext<'a, R, W> {
    transport: &'a mut LineTransport<R, W>,
    capabilities: &'a ClientCapabilities,
    progress_token: Option<Value>,
    timeout: Duration,
    next_id: &'a mut u64,
    shutdown: watch::Receiver<bool>,
}

impl<'a, R, W> PeerContext<'a, R, W>
where
    R: AsyncRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    /// Creates a context for one tool call.
    ///
    /// A pending request is abandoned once `shutdown` turns `true`.
    pub fn new(
        transport: &'a mut LineTransport<R, W>,
        capabilities: &'a ClientCapabilities,
        progress_token: Option<Value>,
        timeout: Duration,
        next_id: &'a mut u64,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            transport,
            capabilities,
            progress_token,
            timeout,
            next_id,
            shutdown,
        }
    }

    /// Sends a request to the client and waits for its response.
    async fn request(&mut self, method: &'static str, params: Value) -> Result<Value, ContextError> {
        if *self.shutdown.borrow_and_update() {
            return Err(ContextError::ShuttingDown);
        }

        *self.next_id += 1;
        let id = RequestId::String(format!("srv-{}", self.next_id));

        self.transport
            .write_request(&OutgoingRequest::new(id.clone(), method, Some(params)))
            .await?;
        tracing::debug!(method, %id, "Sent request to client");

        let deadline = Instant::now() + self.timeout;
        loop {
            let line = tokio::select! {
                Ok(()) = self.shutdown.changed() => {
                    tracing::info!(method, "Abandoning client request for shutdown");
                    return Err(ContextError::ShuttingDown);
                }
                line = tokio::time::timeout_at(deadline, self.transport.read_line()) => line
                    .map_err(|_| ContextError::Timeout(method))??
                    .ok_or(ContextError::Closed(method))?,
            };

            if line.trim().is_empty() {
                continue;
            }

            match parse_message(&line) {
                Ok(IncomingMessage::Response(response)) if response.id == id => {
                    return response.into_result().map_err(|e| ContextError::Rejected {
                        method,
                        message: e.message,
                    });
                }
                Ok(IncomingMessage::Response(response)) => {
                    tracing::warn!(id = %response.id, "Ignoring response to unknown request");
                }
                Ok(IncomingMessage::Request(req)) => self.answer_while_busy(req).await?,
                Ok(IncomingMessage::Notification(notif)) => {
                    tracing::debug!(method = %notif.method, "Ignoring notification during tool call");
                }
                Err(error) => self.transport.write_error(&error).await?,
            }
        }
    }

    /// Handles a client request that arrives while a tool is waiting.
    async fn answer_while_busy(&mut self, req: JsonRpcRequest) -> Result<(), ContextError> {
        if req.method == "ping" {
            let response = JsonRpcResponse::success(req.id, json!({}));
            self.transport.write_response(&response).await?;
            return Ok(());
        }

        tracing::warn!(method = %req.method, "Rejecting request while a tool call is in progress");
        let error = JsonRpcError::new(
            Some(req.id),
            JsonRpcErrorData::with_message(
                ErrorCode::InvalidRequest,
                "Server is busy waiting for a client response",
            ),
        );
        self.transport.write_error(&error).await?;
        Ok(())
    }

    async fn notify(&mut self, notification: &OutgoingNotification) {
        if let Err(e) = self.transport.write_notification(notification).await {
            tracing::warn!(error = %e, method = %notification.method, "Failed to send notification");
        }
    }
}

#[async_trait]
impl<R, W> ToolContext for PeerContext<'_, R, W>
where
    R: AsyncRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    async fn info(&mut self, message: &str) {
        tracing::info!("{message}");
        self.notify(&OutgoingNotification::log("info", SERVER_NAME, message))
            .await;
    }

    async fn report_progress(&mut self, progress: u32, total: u32) {
        let Some(token) = self.progress_token.clone() else {
            return;
        };
        self.notify(&OutgoingNotification::progress(&token, progress, Some(total)))
            .await;
    }

    async fn sample(&mut self, prompt: &str, max_tokens: u32) -> Result<String, ContextError> {
        if self.capabilities.sampling.is_none() {
            return Err(ContextError::Unsupported("sampling"));
        }

        let params = json!({
            "messages": [{
                "role": "user",
                "content": { "type": "text", "text": prompt }
            }],
            "maxTokens": max_tokens,
        });
        let result = self.request("sampling/createMessage", params).await?;

        result
            .pointer("/content/text")
            .and_then(Value::as_str)
            .map(ToString::to_string)
            .ok_or_else(|| ContextError::Protocol("sampling result has no text content".to_string()))
    }

    async fn elicit(&mut self, message: &str) -> Result<Elicitation, ContextError> {
        if self.capabilities.elicitation.is_none() {
            return Err(ContextError::Unsupported("elicitation"));
        }

        let params = json!({
            "message": message,
            "requestedSchema": {
                "type": "object",
                "properties": {
                    "value": { "type": "string", "description": "Your answer" }
                },
                "required": ["value"]
            }
        });
        let result = self.request("elicitation/create", params).await?;

        match result.get("action").and_then(Value::as_str) {
            Some("accept") => result
                .pointer("/content/value")
                .and_then(Value::as_str)
                .map(|v| Elicitation::Accept(v.to_string()))
                .ok_or_else(|| {
                    ContextError::Protocol("accepted elicitation has no string value".to_string())
                }),
            Some("decline") => Ok(Elicitation::Decline),
            Some("cancel") => Ok(Elicitation::Cancel),
            other => Err(ContextError::Protocol(format!(
                "unknown elicitation action: {other:?}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

    use super::*;

    fn running() -> watch::Receiver<bool> {
        watch::channel(false).1
    }

    fn capabilities() -> ClientCapabilities {
        ClientCapabilities {
            sampling: Some(json!({})),
            elicitation: Some(json!({})),
        }
    }

    #[tokio::test]
    async fn unsupported_capabilities_fail_fast() {
        let mut transport = LineTransport::new(tokio::io::empty(), Vec::new());
        let caps = ClientCapabilities::default();
        let mut next_id = 0;
        let mut ctx = PeerContext::new(
            &mut transport,
            &caps,
            None,
            Duration::from_secs(1),
            &mut next_id,
            running(),
        );

        assert!(matches!(
            ctx.sample("hi", 10).await,
            Err(ContextError::Unsupported("sampling"))
        ));
        assert!(matches!(
            ctx.elicit("pick").await,
            Err(ContextError::Unsupported("elicitation"))
        ));
        drop(ctx);
        assert!(transport_output(transport).is_empty());
    }

    fn transport_output<R>(transport: LineTransport<R, Vec<u8>>) -> String
    where
        R: AsyncRead + Unpin + Send,
    {
        let (_, writer) = transport.into_parts();
        String::from_utf8(writer).unwrap()
    }

    #[tokio::test]
    async fn progress_requires_token() {
        let mut transport = LineTransport::new(tokio::io::empty(), Vec::new());
        let caps = capabilities();
        let mut next_id = 0;
        let mut ctx = PeerContext::new(
            &mut transport,
            &caps,
            None,
            Duration::from_secs(1),
            &mut next_id,
            running(),
        );
        ctx.report_progress(50, 100).await;
        drop(ctx);
        assert!(transport_output(transport).is_empty());

        let mut transport = LineTransport::new(tokio::io::empty(), Vec::new());
        let mut ctx = PeerContext::new(
            &mut transport,
            &caps,
            Some(json!("tok")),
            Duration::from_secs(1),
            &mut next_id,
            running(),
        );
        ctx.report_progress(50, 100).await;
        drop(ctx);
        let out = transport_output(transport);
        assert!(out.contains(r#""progressToken":"tok""#));
        assert!(out.contains(r#""progress":50"#));
    }

    #[tokio::test]
    async fn elicitation_round_trip_answers_ping() {
        let (server_side, client_side) = tokio::io::duplex(4096);
        let (server_read, server_write) = tokio::io::split(server_side);
        let (client_read, mut client_write) = tokio::io::split(client_side);

        let client = tokio::spawn(async move {
            let mut lines = BufReader::new(client_read).lines();
            let request: Value =
                serde_json::from_str(&lines.next_line().await.unwrap().unwrap()).unwrap();
            assert_eq!(request["method"], "elicitation/create");

            client_write
                .write_all(b"{\"jsonrpc\":\"2.0\",\"id\":77,\"method\":\"ping\"}\n")
                .await
                .unwrap();
            let pong: Value =
                serde_json::from_str(&lines.next_line().await.unwrap().unwrap()).unwrap();
            assert_eq!(pong["id"], 77);

            let answer = json!({
                "jsonrpc": "2.0",
                "id": request["id"],
                "result": {"action": "accept", "content": {"value": "2"}}
            });
            client_write
                .write_all(format!("{answer}\n").as_bytes())
                .await
                .unwrap();
        });

        let mut transport = LineTransport::new(server_read, server_write);
        let caps = capabilities();
        let mut next_id = 0;
        let mut ctx = PeerContext::new(
            &mut transport,
            &caps,
            None,
            Duration::from_secs(5),
            &mut next_id,
            running(),
        );

        let outcome = ctx.elicit("Which one?").await.unwrap();
        assert_eq!(outcome, Elicitation::Accept("2".to_string()));
        client.await.unwrap();
        assert_eq!(next_id, 1);
    }

    #[tokio::test]
    async fn closed_connection_is_reported() {
        let mut transport = LineTransport::new(tokio::io::empty(), Vec::new());
        let caps = capabilities();
        let mut next_id = 0;
        let mut ctx = PeerContext::new(
            &mut transport,
            &caps,
            None,
            Duration::from_secs(1),
            &mut next_id,
            running(),
        );
        let err = ctx.sample("hello", 5).await.unwrap_err();
        assert!(matches!(err, ContextError::Closed("sampling/createMessage")));
    }

    #[tokio::test(start_paused = true)]
    async fn silent_client_times_out() {
        let (server_side, _client_side) = tokio::io::duplex(4096);
        let (server_read, server_write) = tokio::io::split(server_side);
        let mut transport = LineTransport::new(server_read, server_write);
        let caps = capabilities();
        let mut next_id = 0;
        let mut ctx = PeerContext::new(
            &mut transport,
            &caps,
            None,
            Duration::from_secs(3),
            &mut next_id,
            running(),
        );
        let err = ctx.elicit("anyone?").await.unwrap_err();
        assert!(matches!(err, ContextError::Timeout("elicitation/create")));
    }

    #[tokio::test]
    async fn shutdown_abandons_pending_request() {
        let (server_side, _client_side) = tokio::io::duplex(4096);
        let (server_read, server_write) = tokio::io::split(server_side);
        let mut transport = LineTransport::new(server_read, server_write);
        let caps = capabilities();
        let mut next_id = 0;
        let (stop, shutdown) = watch::channel(false);
        let mut ctx = PeerContext::new(
            &mut transport,
            &caps,
            None,
            Duration::from_secs(300),
            &mut next_id,
            shutdown,
        );

        let (outcome, ()) = tokio::join!(ctx.elicit("Which one?"), async {
            tokio::task::yield_now().await;
            stop.send_replace(true);
        });
        assert!(matches!(outcome, Err(ContextError::ShuttingDown)));
    }

    #[tokio::test]
    async fn no_request_is_sent_after_shutdown() {
        let mut transport = LineTransport::new(tokio::io::empty(), Vec::new());
        let caps = capabilities();
        let mut next_id = 0;
        let (stop, shutdown) = watch::channel(false);
        stop.send_replace(true);
        let mut ctx = PeerContext::new(
            &mut transport,
            &caps,
            None,
            Duration::from_secs(1),
            &mut next_id,
            shutdown,
        );

        let err = ctx.sample("hello", 5).await.unwrap_err();
        assert!(matches!(err, ContextError::ShuttingDown));
        drop(ctx);
        assert!(transport_output(transport).is_empty());
        assert_eq!(next_id, 0);
    }
}
