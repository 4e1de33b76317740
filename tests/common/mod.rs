//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::io::{duplex, DuplexStream};

use wikipedia_mcp::config::ServerConfig;
use wikipedia_mcp::mcp::{LineTransport, McpServer};
use wikipedia_mcp::tools::WikiTools;
use wikipedia_mcp::wiki::{Article, ArticleSource, SourceResult};

/// In-memory encyclopedia.
#[derive(Debug, Default)]
pub struct FakeWiki {
    pages: BTreeMap<String, Article>,
}

impl FakeWiki {
    pub fn with_page(mut self, title: &str, summary: &str, body: &str) -> Self {
        self.pages.insert(
            title.to_string(),
            Article {
                title: title.to_string(),
                url: format!("https://en.wikipedia.org/wiki/{}", title.replace(' ', "_")),
                summary: summary.to_string(),
                text: format!("{summary}\n\n{body}"),
                categories: vec!["Category:Test pages".to_string()],
            },
        );
        self
    }

    /// Three "Python" pages and one long "Rust" page.
    pub fn standard() -> Self {
        Self::default()
            .with_page(
                "Python (programming language)",
                "Python is a high-level programming language. It was created by Guido van Rossum. It emphasises readability. It is popular.",
                "History\nPython was conceived in the late 1980s.",
            )
            .with_page(
                "Python (mythology)",
                "In Greek mythology, Python was a serpent. It lived at Delphi.",
                "Apollo slew Python.",
            )
            .with_page(
                "Python (snake)",
                "Pythons are nonvenomous snakes. They are found in Africa, Asia, and Australia.",
                "Pythons are constrictors.",
            )
            .with_page(
                "Rust (programming language)",
                "Rust is a general-purpose programming language. It emphasises performance and memory safety.",
                &"Rust has an ownership model that is checked at compile time. ".repeat(40),
            )
    }
}

#[async_trait]
impl ArticleSource for FakeWiki {
    async fn search(&self, query: &str, limit: u8) -> SourceResult<Vec<String>> {
        let needle = query.to_lowercase();
        Ok(self
            .pages
            .keys()
            .filter(|title| title.to_lowercase().contains(&needle))
            .take(limit.into())
            .cloned()
            .collect())
    }

    async fn page(&self, title: &str) -> SourceResult<Option<Article>> {
        Ok(self.pages.get(title).cloned())
    }

    async fn link_count(&self, _title: &str) -> SourceResult<usize> {
        Ok(42)
    }
}

/// A server wired to in-memory pipes.
pub type TestServer = McpServer<FakeWiki, DuplexStream, DuplexStream>;

/// Builds a server and returns the client's ends of the pipes: the reader
/// of server output and the writer of server input.
pub fn server_pair(config: &ServerConfig) -> (TestServer, DuplexStream, DuplexStream) {
    let (client_out, server_in) = duplex(64 * 1024);
    let (server_out, client_in) = duplex(64 * 1024);
    let server = McpServer::new(
        WikiTools::new(FakeWiki::standard()),
        LineTransport::new(server_in, server_out),
        config,
    );
    (server, client_in, client_out)
}
