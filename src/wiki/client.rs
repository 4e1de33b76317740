//! HTTP client for the Wikipedia APIs.
//!
//! Two endpoints are used:
//!
//! - the Wikimedia Core REST search endpoint for keyword search
//! - the MediaWiki Action API (`action=query`, `formatversion=2`) for page
//!   text, URL, categories, and links
//!
//! Page text is requested as plain text with `== Heading ==` section markers
//! so the lead section can be split off as the summary.

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::config::WikipediaConfig;

use super::error::{SourceError, SourceResult};
use super::{Article, ArticleSource};

/// Upper bound on `continue` round trips when counting links.
const MAX_CONTINUATIONS: usize = 100;

/// Wikipedia client backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct WikipediaClient {
    http: reqwest::Client,
    api_url: String,
    search_url: String,
}

impl WikipediaClient {
    /// Creates a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built
    /// (for example when the User-Agent is not a valid header value).
    pub fn new(config: &WikipediaConfig) -> SourceResult<Self> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout())
            .build()?;

        Ok(Self {
            http,
            api_url: config.api_url(),
            search_url: config.search_url(),
        })
    }

    /// Sends a GET request and decodes the JSON body.
    async fn get_json<T>(&self, url: &str, query: &[(&str, &str)]) -> SourceResult<T>
    where
        T: for<'de> Deserialize<'de>,
    {
        let response = self
            .http
            .get(url)
            .query(query)
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        Ok(response.json::<T>().await?)
    }

    /// Runs an `action=query` request and surfaces API-level errors.
    async fn query(&self, params: &[(&str, &str)]) -> SourceResult<QueryResponse> {
        let mut full: Vec<(&str, &str)> = vec![
            ("action", "query"),
            ("format", "json"),
            ("formatversion", "2"),
            ("redirects", "1"),
        ];
        full.extend_from_slice(params);

        let response: QueryResponse = self.get_json(&self.api_url, &full).await?;
        if let Some(err) = &response.error {
            return Err(SourceError::decode(format!("{}: {}", err.code, err.info)));
        }
        Ok(response)
    }
}

#[async_trait]
impl ArticleSource for WikipediaClient {
    async fn search(&self, query: &str, limit: u8) -> SourceResult<Vec<String>> {
        let limit = limit.to_string();
        let response: SearchResponse = self
            .get_json(&self.search_url, &[("q", query), ("limit", limit.as_str())])
            .await?;

        let titles: Vec<String> = response.pages.into_iter().map(|p| p.title).collect();
        tracing::debug!(query, count = titles.len(), "Search completed");
        Ok(titles)
    }

    async fn page(&self, title: &str) -> SourceResult<Option<Article>> {
        let response = self
            .query(&[
                ("titles", title),
                ("prop", "extracts|info|categories"),
                ("explaintext", "1"),
                ("exsectionformat", "wiki"),
                ("inprop", "url"),
                ("cllimit", "max"),
            ])
            .await?;

        let Some(page) = response.query.and_then(|q| q.pages.into_iter().next()) else {
            return Ok(None);
        };

        if page.missing || page.invalid {
            tracing::debug!(title, "Page does not exist");
            return Ok(None);
        }

        let (summary, text) = split_extract(page.extract.as_deref().unwrap_or_default());

        Ok(Some(Article {
            url: page.fullurl.unwrap_or_default(),
            title: page.title,
            summary,
            text,
            categories: page.categories.into_iter().map(|c| c.title).collect(),
        }))
    }

    async fn link_count(&self, title: &str) -> SourceResult<usize> {
        let mut count = 0;
        let mut continuation: Vec<(String, String)> = Vec::new();

        for _ in 0..MAX_CONTINUATIONS {
            let mut params: Vec<(&str, &str)> =
                vec![("titles", title), ("prop", "links"), ("pllimit", "max")];
            params.extend(
                continuation
                    .iter()
                    .map(|(k, v)| (k.as_str(), v.as_str())),
            );

            let response = self.query(&params).await?;

            count += response
                .query
                .iter()
                .flat_map(|q| q.pages.iter())
                .map(|p| p.links.len())
                .sum::<usize>();

            match response.continuation {
                Some(next) => continuation = continuation_params(&next),
                None => return Ok(count),
            }
        }

        tracing::warn!(title, count, "Link count stopped after too many continuations");
        Ok(count)
    }
}

/// Converts a `continue` object into query parameters for the next request.
fn continuation_params(next: &Map<String, Value>) -> Vec<(String, String)> {
    next.iter()
        .filter_map(|(k, v)| match v {
            Value::String(s) => Some((k.clone(), s.clone())),
            Value::Number(n) => Some((k.clone(), n.to_string())),
            _ => None,
        })
        .collect()
}

/// Returns the heading text if `line` is a `== Heading ==` marker.
fn heading_title(line: &str) -> Option<&str> {
    let t = line.trim();
    if t.len() >= 4 && t.starts_with("==") && t.ends_with("==") {
        Some(t.trim_matches('=').trim())
    } else {
        None
    }
}

/// Splits a raw extract into `(summary, text)`.
///
/// The summary is everything before the first section heading. In the text,
/// headings are rendered as plain lines and runs of blank lines collapse to
/// one.
fn split_extract(raw: &str) -> (String, String) {
    let mut text = String::with_capacity(raw.len());
    let mut summary_end = None;
    let mut previous_blank = false;

    for line in raw.lines() {
        let blank = line.trim().is_empty();
        if blank && previous_blank {
            continue;
        }
        previous_blank = blank;

        match heading_title(line) {
            Some(heading) => {
                summary_end.get_or_insert(text.len());
                text.push_str(heading);
            }
            None => text.push_str(line),
        }
        text.push('\n');
    }

    let summary = summary_end
        .map_or(text.as_str(), |end| &text[..end])
        .trim()
        .to_string();
    (summary, text.trim().to_string())
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    pages: Vec<SearchPage>,
}

#[derive(Debug, Deserialize)]
struct SearchPage {
    title: String,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    query: Option<QueryBody>,
    #[serde(rename = "continue", default)]
    continuation: Option<Map<String, Value>>,
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    code: String,
    #[serde(default)]
    info: String,
}

#[derive(Debug, Deserialize)]
struct QueryBody {
    #[serde(default)]
    pages: Vec<PageEntry>,
}

#[derive(Debug, Deserialize)]
struct PageEntry {
    #[serde(default)]
    title: String,
    #[serde(default)]
    missing: bool,
    #[serde(default)]
    invalid: bool,
    #[serde(default)]
    extract: Option<String>,
    #[serde(default)]
    fullurl: Option<String>,
    #[serde(default)]
    categories: Vec<TitleEntry>,
    #[serde(default)]
    links: Vec<TitleEntry>,
}

#[derive(Debug, Deserialize)]
struct TitleEntry {
    title: String,
}
