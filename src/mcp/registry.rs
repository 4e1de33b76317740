//! The static tool table.
//!
//! Every tool the server can expose is a [`ToolKind`]. Names, descriptions
//! and input schemas live here; [`dispatch`] decodes arguments and calls
//! into [`WikiTools`].

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::mcp::protocol::{ToolCallResult, ToolDefinition};
use crate::tools::{
    ToolContext, ToolError, ToolResult, WikiTools, DEFAULT_MAX_LENGTH, DEFAULT_SEARCH_LIMIT,
    DEFAULT_SENTENCES,
};
use crate::wiki::ArticleSource;

/// A tool exposed by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolKind {
    /// Keyword search over article titles.
    Search,
    /// First N sentences of an article's summary.
    Summary,
    /// Full article text with truncation.
    Content,
    /// Article metadata.
    Info,
    /// Summary rewritten by the client's LLM.
    SmartSummarize,
    /// Search with a disambiguation prompt.
    InteractiveSearch,
    /// Content retrieval with progress notifications.
    ContentWithProgress,
}

impl ToolKind {
    /// Every tool, in listing order.
    pub const ALL: [Self; 7] = [
        Self::Search,
        Self::Summary,
        Self::Content,
        Self::Info,
        Self::SmartSummarize,
        Self::InteractiveSearch,
        Self::ContentWithProgress,
    ];

    /// Returns the wire name of the tool.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Search => "search_wikipedia",
            Self::Summary => "get_article_summary",
            Self::Content => "get_article_content",
            Self::Info => "get_article_info",
            Self::SmartSummarize => "smart_summarize",
            Self::InteractiveSearch => "interactive_search",
            Self::ContentWithProgress => "get_article_with_progress",
        }
    }

    /// Looks up a tool by wire name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// Whether the tool calls back into the client.
    #[must_use]
    pub const fn is_advanced(self) -> bool {
        matches!(
            self,
            Self::SmartSummarize | Self::InteractiveSearch | Self::ContentWithProgress
        )
    }

    /// Returns the tools enabled by the `advanced_tools` setting.
    #[must_use]
    pub fn enabled(advanced_tools: bool) -> Vec<Self> {
        Self::ALL
            .into_iter()
            .filter(|kind| advanced_tools || !kind.is_advanced())
            .collect()
    }

    /// Returns the tools/list entry for this tool.
    #[must_use]
    pub fn definition(self) -> ToolDefinition {
        let (description, input_schema) = match self {
            Self::Search => (
                "Search Wikipedia articles by keyword. Returns a JSON array of \
                 matching article titles, best match first.",
                json!({
                    "type": "object",
                    "properties": {
                        "query": {
                            "type": "string",
                            "description": "Search query string"
                        },
                        "limit": {
                            "type": "integer",
                            "minimum": 1,
                            "maximum": 10,
                            "description": "Maximum number of results to return (default: 5, max: 10)"
                        }
                    },
                    "required": ["query"]
                }),
            ),
            Self::Summary => (
                "Get a brief summary of a Wikipedia article: the first few \
                 sentences of its introduction.",
                json!({
                    "type": "object",
                    "properties": {
                        "title": {
                            "type": "string",
                            "description": "Wikipedia article title"
                        },
                        "sentences": {
                            "type": "integer",
                            "minimum": 1,
                            "maximum": 10,
                            "description": "Number of sentences to return (default: 3, max: 10)"
                        }
                    },
                    "required": ["title"]
                }),
            ),
            Self::Content => (
                "Get the full text of a Wikipedia article, truncated at a sentence or \
                 paragraph boundary if longer than max_length characters.",
                content_schema(),
            ),
            Self::Info => (
                "Get basic information about a Wikipedia article: canonical title, URL, \
                 summary and content lengths, categories, and number of links.",
                title_schema(),
            ),
            Self::SmartSummarize => (
                "Get an AI-enhanced summary of a Wikipedia article. Uses the client's \
                 language model to make the text more concise and engaging.",
                title_schema(),
            ),
            Self::InteractiveSearch => (
                "Search Wikipedia and ask the user which result they meant, then return \
                 a summary of the chosen article.",
                json!({
                    "type": "object",
                    "properties": {
                        "query": {
                            "type": "string",
                            "description": "Search query string"
                        }
                    },
                    "required": ["query"]
                }),
            ),
            Self::ContentWithProgress => (
                "Get the full text of a Wikipedia article with progress reporting. \
                 Same truncation rules as get_article_content.",
                content_schema(),
            ),
        };

        ToolDefinition {
            name: self.name().to_string(),
            description: Some(description.to_string()),
            input_schema,
        }
    }
}

fn title_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "title": {
                "type": "string",
                "description": "Wikipedia article title"
            }
        },
        "required": ["title"]
    })
}

fn content_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "title": {
                "type": "string",
                "description": "Wikipedia article title"
            },
            "max_length": {
                "type": "integer",
                "minimum": 100,
                "maximum": 10000,
                "description": "Maximum content length in characters (default: 2000, max: 10000)"
            }
        },
        "required": ["title"]
    })
}

#[derive(Debug, Deserialize)]
struct SearchArgs {
    query: String,
    #[serde(default = "default_search_limit")]
    limit: i64,
}

#[derive(Debug, Deserialize)]
struct SummaryArgs {
    title: String,
    #[serde(default = "default_sentences")]
    sentences: i64,
}

#[derive(Debug, Deserialize)]
struct ContentArgs {
    title: String,
    #[serde(default = "default_max_length")]
    max_length: i64,
}

#[derive(Debug, Deserialize)]
struct TitleArgs {
    title: String,
}

#[derive(Debug, Deserialize)]
struct QueryArgs {
    query: String,
}

const fn default_search_limit() -> i64 {
    DEFAULT_SEARCH_LIMIT
}

const fn default_sentences() -> i64 {
    DEFAULT_SENTENCES
}

const fn default_max_length() -> i64 {
    DEFAULT_MAX_LENGTH
}

/// Decodes tool arguments. A missing arguments object counts as empty.
fn decode<T: DeserializeOwned>(kind: ToolKind, arguments: Value) -> ToolResult<T> {
    let arguments = if arguments.is_null() {
        json!({})
    } else {
        arguments
    };
    serde_json::from_value(arguments).map_err(|e| {
        ToolError::invalid_argument(format!("Invalid arguments for {}: {e}", kind.name()))
    })
}

fn to_pretty_json<T: serde::Serialize>(value: &T) -> ToolResult<String> {
    serde_json::to_string_pretty(value)
        .map_err(|e| ToolError::invalid_argument(format!("Failed to serialise result: {e}")))
}

/// Runs a tool and converts the outcome into a tool result.
///
/// Tool failures become `isError` results carrying the error message; they
/// never fail the JSON-RPC request itself.
pub async fn dispatch<S: ArticleSource>(
    tools: &WikiTools<S>,
    kind: ToolKind,
    arguments: Value,
    ctx: &mut dyn ToolContext,
) -> ToolCallResult {
    match run(tools, kind, arguments, ctx).await {
        Ok(text) => ToolCallResult::text(text),
        Err(e) => {
            tracing::warn!(tool = kind.name(), error = %e, "Tool call failed");
            ToolCallResult::error(e.to_string())
        }
    }
}

async fn run<S: ArticleSource>(
    tools: &WikiTools<S>,
    kind: ToolKind,
    arguments: Value,
    ctx: &mut dyn ToolContext,
) -> ToolResult<String> {
    match kind {
        ToolKind::Search => {
            let args: SearchArgs = decode(kind, arguments)?;
            let titles = tools.search(&args.query, args.limit).await?;
            to_pretty_json(&titles)
        }
        ToolKind::Summary => {
            let args: SummaryArgs = decode(kind, arguments)?;
            tools.summary(&args.title, args.sentences).await
        }
        ToolKind::Content => {
            let args: ContentArgs = decode(kind, arguments)?;
            tools.content(&args.title, args.max_length).await
        }
        ToolKind::Info => {
            let args: TitleArgs = decode(kind, arguments)?;
            let info = tools.info(&args.title).await?;
            to_pretty_json(&info)
        }
        ToolKind::SmartSummarize => {
            let args: TitleArgs = decode(kind, arguments)?;
            tools.smart_summarize(&args.title, ctx).await
        }
        ToolKind::InteractiveSearch => {
            let args: QueryArgs = decode(kind, arguments)?;
            tools.interactive_search(&args.query, ctx).await
        }
        ToolKind::ContentWithProgress => {
            let args: ContentArgs = decode(kind, arguments)?;
            tools
                .content_with_progress(&args.title, args.max_length, ctx)
                .await
        }
    }
}
