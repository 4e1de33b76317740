//! Wikipedia tool operations.
//!
//! [`WikiTools`] holds an injected [`ArticleSource`] and implements every
//! tool the server exposes. Validation happens before any external call;
//! each tool issues its lookups strictly one after another.
//!
//! These functions know nothing about MCP. The server's registry decodes
//! arguments, calls into here, and turns the result into a tool response.

pub mod context;
pub mod disambiguation;
pub mod error;

pub use context::{ContextError, Elicitation, ToolContext};
pub use error::{ToolError, ToolResult};

use serde::Serialize;

use crate::wiki::text::{limit_sentences, truncate_content};
use crate::wiki::{Article, ArticleSource};

/// Default number of search results.
pub const DEFAULT_SEARCH_LIMIT: i64 = 5;
/// Default number of summary sentences.
pub const DEFAULT_SENTENCES: i64 = 3;
/// Default content budget in characters.
pub const DEFAULT_MAX_LENGTH: i64 = 2000;
/// Number of candidates offered by `interactive_search`.
pub const INTERACTIVE_SEARCH_LIMIT: i64 = 8;
/// Token budget for `smart_summarize`.
pub const SMART_SUMMARY_MAX_TOKENS: u32 = 800;
/// Maximum number of categories returned by `get_article_info`.
pub const MAX_INFO_CATEGORIES: usize = 10;

const SMART_SUMMARY_INSTRUCTION: &str =
    "Make this Wikipedia summary more concise and engaging while preserving key facts:";

/// Metadata returned by `get_article_info`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArticleInfo {
    /// Canonical title.
    pub title: String,
    /// Full page URL.
    pub url: String,
    /// Summary length in characters.
    pub summary_length: usize,
    /// Full text length in characters.
    pub content_length: usize,
    /// At most [`MAX_INFO_CATEGORIES`] category titles.
    pub categories: Vec<String>,
    /// Number of outgoing wiki links.
    pub links_count: usize,
}

/// The Wikipedia tool set over an article source.
#[derive(Debug, Clone)]
pub struct WikiTools<S> {
    source: S,
}

impl<S: ArticleSource> WikiTools<S> {
    /// Creates the tool set.
    pub const fn new(source: S) -> Self {
        Self { source }
    }

    /// Returns the underlying article source.
    pub const fn source(&self) -> &S {
        &self.source
    }

    /// Searches article titles.
    ///
    /// # Errors
    ///
    /// Invalid argument for an empty query or a limit outside 1..=10;
    /// external failure if the search request fails.
    pub async fn search(&self, query: &str, limit: i64) -> ToolResult<Vec<String>> {
        let query = require_non_empty(query, "Query cannot be empty")?;
        let limit = u8::try_from(limit)
            .ok()
            .filter(|l| (1..=10).contains(l))
            .ok_or_else(|| ToolError::invalid_argument("Limit must be between 1 and 10"))?;

        let titles = self
            .source
            .search(query, limit)
            .await
            .map_err(ToolError::external("search Wikipedia"))?;

        tracing::info!(query, count = titles.len(), "Search finished");
        Ok(titles)
    }

    /// Returns the first `sentences` sentences of an article's summary.
    ///
    /// # Errors
    ///
    /// Invalid argument, not found, no content, or external failure.
    pub async fn summary(&self, title: &str, sentences: i64) -> ToolResult<String> {
        require_non_empty(title, "Article title cannot be empty")?;
        let count = usize::try_from(sentences)
            .ok()
            .filter(|n| (1..=10).contains(n))
            .ok_or_else(|| ToolError::invalid_argument("Sentences must be between 1 and 10"))?;

        let article = self.resolve(title, "get article summary").await?;
        if article.summary.is_empty() {
            return Err(ToolError::NoContent {
                field: "summary",
                title: title.to_string(),
            });
        }

        tracing::info!(title, "Retrieved summary");
        Ok(limit_sentences(&article.summary, count))
    }

    /// Returns an article's full text, truncated to `max_length` characters.
    ///
    /// # Errors
    ///
    /// Invalid argument, not found, no content, or external failure.
    pub async fn content(&self, title: &str, max_length: i64) -> ToolResult<String> {
        let max_length = validate_content_request(title, max_length)?;
        let article = self.resolve(title, "get article content").await?;
        let text = require_content(&article, title)?;

        let content = truncate_content(text, max_length);
        tracing::info!(title, chars = content.chars().count(), "Retrieved content");
        Ok(content)
    }

    /// Returns metadata about an article.
    ///
    /// # Errors
    ///
    /// Invalid argument, not found, or external failure.
    pub async fn info(&self, title: &str) -> ToolResult<ArticleInfo> {
        require_non_empty(title, "Article title cannot be empty")?;
        let article = self.resolve(title, "get article info").await?;
        let links_count = self
            .source
            .link_count(&article.title)
            .await
            .map_err(ToolError::external("get article info"))?;

        tracing::info!(title, "Retrieved info");
        Ok(ArticleInfo {
            summary_length: article.summary.chars().count(),
            content_length: article.text.chars().count(),
            categories: article
                .categories
                .into_iter()
                .take(MAX_INFO_CATEGORIES)
                .collect(),
            title: article.title,
            url: article.url,
            links_count,
        })
    }

    /// Asks the client's LLM to rewrite an article's text.
    ///
    /// The generated text is returned verbatim.
    ///
    /// # Errors
    ///
    /// Invalid argument, not found, external failure, or a sampling failure.
    pub async fn smart_summarize(
        &self,
        title: &str,
        ctx: &mut dyn ToolContext,
    ) -> ToolResult<String> {
        require_non_empty(title, "Article title cannot be empty")?;
        ctx.info(&format!("Creating enhanced summary for: {title}"))
            .await;

        let article = self.resolve(title, "get article text").await?;
        let prompt = format!("{SMART_SUMMARY_INSTRUCTION}\n\n{}", article.text);
        let enhanced = ctx.sample(&prompt, SMART_SUMMARY_MAX_TOKENS).await?;

        ctx.info(&format!("Enhanced summary created for: {title}"))
            .await;
        Ok(enhanced)
    }

    /// Searches and lets the user pick one result, then returns its summary.
    ///
    /// A single hit is summarised without asking.
    ///
    /// # Errors
    ///
    /// Invalid argument, external failure, invalid selection, or an
    /// elicitation failure.
    pub async fn interactive_search(
        &self,
        query: &str,
        ctx: &mut dyn ToolContext,
    ) -> ToolResult<String> {
        require_non_empty(query, "Query cannot be empty")?;
        ctx.info(&format!("Interactive search for: {query}")).await;

        let candidates = self.search(query, INTERACTIVE_SEARCH_LIMIT).await?;

        match candidates.as_slice() {
            [] => return Ok(format!("No Wikipedia articles found for '{query}'")),
            [only] => {
                ctx.info("Only one result found, retrieving summary...")
                    .await;
                return self.summary(only, DEFAULT_SENTENCES).await;
            }
            _ => {}
        }

        let question = disambiguation::format_options(query, &candidates);
        let answer = match ctx.elicit(&question).await? {
            Elicitation::Accept(answer) => answer,
            Elicitation::Decline | Elicitation::Cancel => {
                return Ok("Search cancelled or invalid selection.".to_string());
            }
        };

        let answer = answer.trim();
        let Some(selected) = disambiguation::resolve_selection(answer, &candidates) else {
            return Err(ToolError::InvalidSelection {
                input: answer.to_string(),
                count: candidates.len(),
            });
        };

        ctx.info(&format!("User selected: {selected}")).await;
        self.summary(selected, DEFAULT_SENTENCES).await
    }

    /// [`Self::content`] with progress and log notifications.
    ///
    /// # Errors
    ///
    /// Same as [`Self::content`].
    pub async fn content_with_progress(
        &self,
        title: &str,
        max_length: i64,
        ctx: &mut dyn ToolContext,
    ) -> ToolResult<String> {
        let max_length = validate_content_request(title, max_length)?;

        ctx.info(&format!("Retrieving content for: {title}")).await;
        ctx.report_progress(0, 100).await;

        let article = self.resolve(title, "get article content").await?;
        ctx.report_progress(25, 100).await;

        let text = require_content(&article, title)?;
        ctx.report_progress(50, 100).await;

        let length = text.chars().count();
        if length > max_length {
            ctx.info(&format!(
                "Content is {length} chars, truncating to {max_length}"
            ))
            .await;
            ctx.report_progress(75, 100).await;
        }
        let content = truncate_content(text, max_length);

        ctx.report_progress(100, 100).await;
        ctx.info(&format!(
            "Retrieved content for: {title} ({} chars)",
            content.chars().count()
        ))
        .await;
        Ok(content)
    }

    /// Looks up a page, mapping absence to [`ToolError::NotFound`].
    async fn resolve(&self, title: &str, operation: &'static str) -> ToolResult<Article> {
        self.source
            .page(title.trim())
            .await
            .map_err(ToolError::external(operation))?
            .ok_or_else(|| ToolError::not_found(title))
    }
}

/// Trims `value`, failing with `message` if nothing is left.
fn require_non_empty<'a>(value: &'a str, message: &str) -> ToolResult<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ToolError::invalid_argument(message));
    }
    Ok(trimmed)
}

/// Shared argument checks for the two content tools.
fn validate_content_request(title: &str, max_length: i64) -> ToolResult<usize> {
    require_non_empty(title, "Article title cannot be empty")?;
    usize::try_from(max_length)
        .ok()
        .filter(|n| (100..=10_000).contains(n))
        .ok_or_else(|| ToolError::invalid_argument("max_length must be between 100 and 10000"))
}

fn require_content<'a>(article: &'a Article, title: &str) -> ToolResult<&'a str> {
    if article.text.is_empty() {
        return Err(ToolError::NoContent {
            field: "content",
            title: title.to_string(),
        });
    }
    Ok(&article.text)
}
