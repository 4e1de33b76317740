//! Wikipedia article source.
//!
//! The tools never talk to Wikipedia directly; they go through the
//! [`ArticleSource`] trait so that the HTTP client can be swapped for an
//! in-memory fake in tests.
//!
//! - [`client`] — [`WikipediaClient`], the `reqwest` implementation
//! - [`text`] — sentence limiting and content truncation
//! - [`error`] — [`SourceError`]

pub mod client;
pub mod error;
pub mod text;

pub use client::WikipediaClient;
pub use error::{SourceError, SourceResult};

use async_trait::async_trait;

/// A resolved Wikipedia page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Article {
    /// Canonical title after redirects.
    pub title: String,
    /// Full URL of the page.
    pub url: String,
    /// Lead section text (everything before the first heading).
    pub summary: String,
    /// Full plain text, including the summary.
    pub text: String,
    /// Category titles in the order returned by the API.
    pub categories: Vec<String>,
}

/// Something that can look up encyclopedia articles.
#[async_trait]
pub trait ArticleSource: Send + Sync {
    /// Searches for pages matching `query`, returning at most `limit` titles.
    async fn search(&self, query: &str, limit: u8) -> SourceResult<Vec<String>>;

    /// Fetches a page by title. Returns `Ok(None)` if the page does not exist.
    async fn page(&self, title: &str) -> SourceResult<Option<Article>>;

    /// Counts the outgoing wiki links of a page.
    async fn link_count(&self, title: &str) -> SourceResult<usize>;
}
