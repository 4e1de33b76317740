//! Newline-delimited transport for MCP.
//!
//! This module implements the stdio transport as specified by MCP:
//!
//! - Messages are UTF-8 encoded JSON-RPC
//! - Messages are delimited by newlines
//! - Messages must not contain embedded newlines
//! - stdin: receives messages from the peer
//! - stdout: sends messages to the peer
//! - stderr: may be used for logging (not MCP messages)
//!
//! The transport is generic over its reader and writer so the same framing
//! serves process stdio and the in-memory duplex streams used in tests.

use std::io;

use serde::Serialize;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};

use crate::mcp::protocol::{JsonRpcError, JsonRpcResponse, OutgoingNotification, OutgoingRequest};

/// A line-framed MCP transport over any async byte streams.
pub struct LineTransport<R, W> {
    /// Buffered reader for incoming messages.
    reader: BufReader<R>,
    /// Sink for outgoing messages.
    writer: W,
}

/// The server's transport: process stdin and stdout.
pub type StdioTransport = LineTransport<tokio::io::Stdin, tokio::io::Stdout>;

impl StdioTransport {
    /// Creates a new stdio transport.
    #[must_use]
    pub fn stdio() -> Self {
        Self::new(tokio::io::stdin(), tokio::io::stdout())
    }
}

impl<R, W> LineTransport<R, W>
where
    R: AsyncRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    /// Creates a transport over a reader and writer.
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader: BufReader::new(reader),
            writer,
        }
    }

    /// Splits the transport back into its reader and writer.
    pub fn into_parts(self) -> (BufReader<R>, W) {
        (self.reader, self.writer)
    }

    /// Reads the next message line.
    ///
    /// Returns `None` if the stream is closed (EOF).
    ///
    /// # Errors
    ///
    /// Returns an error if reading fails.
    pub async fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        let bytes_read = self.reader.read_line(&mut line).await?;

        if bytes_read == 0 {
            return Ok(None);
        }

        // Remove the trailing newline
        if line.ends_with('\n') {
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
        }

        Ok(Some(line))
    }

    /// Writes a JSON-RPC response.
    ///
    /// # Errors
    ///
    /// Returns an error if serialisation or writing fails.
    pub async fn write_response(&mut self, response: &JsonRpcResponse) -> io::Result<()> {
        self.write_message(response).await
    }

    /// Writes a JSON-RPC error.
    ///
    /// # Errors
    ///
    /// Returns an error if serialisation or writing fails.
    pub async fn write_error(&mut self, error: &JsonRpcError) -> io::Result<()> {
        self.write_message(error).await
    }

    /// Writes a JSON-RPC notification.
    ///
    /// # Errors
    ///
    /// Returns an error if serialisation or writing fails.
    pub async fn write_notification(
        &mut self,
        notification: &OutgoingNotification,
    ) -> io::Result<()> {
        self.write_message(notification).await
    }

    /// Writes a JSON-RPC request to the peer.
    ///
    /// # Errors
    ///
    /// Returns an error if serialisation or writing fails.
    pub async fn write_request(&mut self, request: &OutgoingRequest) -> io::Result<()> {
        self.write_message(request).await
    }

    async fn write_message<T: Serialize + Sync>(&mut self, message: &T) -> io::Result<()> {
        let json = serde_json::to_string(message)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        self.write_raw(&json).await
    }

    /// Writes a raw JSON string with newline termination.
    async fn write_raw(&mut self, json: &str) -> io::Result<()> {
        debug_assert!(
            !json.contains('\n'),
            "JSON message must not contain embedded newlines"
        );

        self.writer.write_all(json.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        self.writer.flush().await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mcp::protocol::RequestId;

    #[tokio::test]
    async fn reads_lines_and_strips_crlf() {
        let input: &[u8] = b"{\"a\":1}\r\n{\"b\":2}\n";
        let mut transport = LineTransport::new(input, Vec::new());

        assert_eq!(transport.read_line().await.unwrap().unwrap(), "{\"a\":1}");
        assert_eq!(transport.read_line().await.unwrap().unwrap(), "{\"b\":2}");
        assert!(transport.read_line().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn writes_one_message_per_line() {
        let mut transport = LineTransport::new(tokio::io::empty(), Vec::new());
        let response = JsonRpcResponse::success(
            RequestId::Number(1),
            serde_json::json!({
                "message": "hello\nworld",
                "nested": {"key": "value"}
            }),
        );
        transport.write_response(&response).await.unwrap();
        transport
            .write_notification(&OutgoingNotification::log("info", "wikipedia", "hi"))
            .await
            .unwrap();

        let written = String::from_utf8(transport.writer).unwrap();
        let lines: Vec<&str> = written.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains(r#""id":1"#));
        assert!(lines[1].contains("notifications/message"));
    }

    #[tokio::test]
    async fn request_over_duplex() {
        let (client, server) = tokio::io::duplex(1024);
        let (client_read, client_write) = tokio::io::split(client);
        let (server_read, server_write) = tokio::io::split(server);
        let mut client = LineTransport::new(client_read, client_write);
        let mut server = LineTransport::new(server_read, server_write);

        client
            .write_request(&OutgoingRequest::new(RequestId::Number(9), "ping", None))
            .await
            .unwrap();
        let line = server.read_line().await.unwrap().unwrap();
        assert_eq!(line, r#"{"jsonrpc":"2.0","id":9,"method":"ping"}"#);
    }
}
