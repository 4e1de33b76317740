//! wikipedia-mcp: Wikipedia tools for AI assistants over MCP
//!
//! This library provides an MCP server that lets an AI assistant search and
//! read Wikipedia, and a terminal chat client that drives it with a language
//! model.
//!
//! # Architecture
//!
//! The server exposes small, single-purpose tools. The model decides which
//! to call:
//!
//! - **Search**: find article titles for a query
//! - **Retrieval**: summaries, sentence-bounded truncated content, metadata
//! - **Client callbacks**: summaries rewritten through MCP sampling,
//!   disambiguation through MCP elicitation, progress notifications
//!
//! # Modules
//!
//! - [`config`] — Configuration loading and validation
//! - [`error`] — Configuration error types
//! - [`wiki`] — Wikipedia article source and text helpers
//! - [`tools`] — The tool operations, independent of MCP
//! - [`mcp`] — MCP protocol, server, and client
//! - [`chat`] — The `wiki-chat` research assistant

pub mod chat;
pub mod config;
pub mod error;
pub mod mcp;
pub mod tools;
pub mod wiki;
