//! Model Context Protocol (MCP) implementation.
//!
//! This module implements the MCP specification for exposing the Wikipedia
//! tools to AI assistants. The server speaks newline-delimited JSON-RPC 2.0
//! over stdio. The chat binary's client in [`client`] runs on `rmcp`.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         MCP Server                          │
//! │                                                             │
//! │   ┌─────────────┐    ┌─────────────┐    ┌─────────────┐    │
//! │   │  Transport  │───▶│   Server    │───▶│  Registry   │    │
//! │   │   (stdio)   │    │ (lifecycle) │    │ (dispatch)  │    │
//! │   └─────────────┘    └─────────────┘    └─────────────┘    │
//! │          ▲                  │                  │            │
//! │          │                  ▼                  ▼            │
//! │   ┌─────────────┐    ┌─────────────────────────────────┐   │
//! │   │    Peer     │◀───│   WikiTools (sampling,          │   │
//! │   │  (callbacks)│    │   elicitation, progress)        │   │
//! │   └─────────────┘    └─────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Protocol Version
//!
//! This implementation targets MCP protocol version 2025-06-18 and accepts
//! 2025-03-26 and 2024-11-05.

pub mod client;
pub mod peer;
pub mod protocol;
pub mod registry;
pub mod server;
pub mod transport;

pub use client::{ClientError, McpClient};
pub use protocol::{
    JsonRpcError, JsonRpcRequest, JsonRpcResponse, ToolCallResult, ToolDefinition,
    MCP_PROTOCOL_VERSION,
};
pub use registry::ToolKind;
pub use server::McpServer;
pub use transport::{LineTransport, StdioTransport};
