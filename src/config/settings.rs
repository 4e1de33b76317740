//! Configuration structures for deserialisation.
//!
//! These structures map directly to the JSON configuration file format.
//! Every section is optional; missing fields fall back to the defaults below.

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

/// Root configuration structure.
///
/// This is the top-level structure that matches the JSON config file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Optional JSON schema reference (ignored during parsing).
    #[serde(rename = "$schema", default)]
    _schema: Option<String>,

    /// Optional comment field (ignored during parsing).
    #[serde(rename = "_comment", default)]
    _comment: Option<String>,

    /// Wikipedia API settings.
    #[serde(default)]
    pub wikipedia: WikipediaConfig,

    /// MCP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Chat client settings.
    #[serde(default)]
    pub chat: ChatConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any validation checks fail.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let language = &self.wikipedia.language;
        if language.is_empty()
            || !language
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-')
        {
            return Err(ConfigError::InvalidLanguage {
                code: language.clone(),
            });
        }

        if self.wikipedia.user_agent.trim().is_empty() {
            return Err(ConfigError::EmptyUserAgent);
        }

        for (field, value) in [
            ("wikipedia.timeout_secs", self.wikipedia.timeout_secs),
            ("server.peer_timeout_secs", self.server.peer_timeout_secs),
            ("chat.timeout_secs", self.chat.timeout_secs),
        ] {
            if value == 0 {
                return Err(ConfigError::ZeroTimeout { field });
            }
        }

        if self.chat.max_tool_rounds == 0 {
            return Err(ConfigError::NoToolRounds);
        }

        Ok(())
    }
}

/// Wikipedia API configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WikipediaConfig {
    /// Wikipedia language edition (subdomain), e.g. "en".
    #[serde(default = "default_language")]
    pub language: String,

    /// User-Agent sent with every request, as required by Wikimedia.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Per-request HTTP timeout in seconds.
    #[serde(default = "default_http_timeout")]
    pub timeout_secs: u64,

    /// Override for the MediaWiki Action API endpoint.
    #[serde(default)]
    pub api_url: Option<String>,

    /// Override for the Wikimedia Core search endpoint.
    #[serde(default)]
    pub search_url: Option<String>,
}

impl WikipediaConfig {
    /// Returns the MediaWiki Action API endpoint for the configured language.
    #[must_use]
    pub fn api_url(&self) -> String {
        self.api_url
            .clone()
            .unwrap_or_else(|| format!("https://{}.wikipedia.org/w/api.php", self.language))
    }

    /// Returns the page search endpoint for the configured language.
    #[must_use]
    pub fn search_url(&self) -> String {
        self.search_url.clone().unwrap_or_else(|| {
            format!(
                "https://api.wikimedia.org/core/v1/wikipedia/{}/search/page",
                self.language
            )
        })
    }

    /// Returns the HTTP timeout as a [`Duration`].
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for WikipediaConfig {
    fn default() -> Self {
        Self {
            language: default_language(),
            user_agent: default_user_agent(),
            timeout_secs: default_http_timeout(),
            api_url: None,
            search_url: None,
        }
    }
}

fn default_language() -> String {
    "en".to_string()
}

fn default_user_agent() -> String {
    format!(
        "wikipedia-mcp/{} (educational-purpose)",
        env!("CARGO_PKG_VERSION")
    )
}

const fn default_http_timeout() -> u64 {
    10
}

/// MCP server configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Expose the tools that call back into the client
    /// (`smart_summarize`, `interactive_search`, `get_article_with_progress`).
    #[serde(default = "default_true")]
    pub advanced_tools: bool,

    /// How long to wait for the client to answer a sampling or elicitation
    /// request, in seconds.
    #[serde(default = "default_peer_timeout")]
    pub peer_timeout_secs: u64,
}

impl ServerConfig {
    /// Returns the peer timeout as a [`Duration`].
    #[must_use]
    pub const fn peer_timeout(&self) -> Duration {
        Duration::from_secs(self.peer_timeout_secs)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            advanced_tools: default_true(),
            peer_timeout_secs: default_peer_timeout(),
        }
    }
}

const fn default_true() -> bool {
    true
}

const fn default_peer_timeout() -> u64 {
    300
}

/// Chat client configuration.
///
/// LLM credentials are never stored here; they come from the environment.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChatConfig {
    /// Model name override. Defaults to `gpt-4o-mini` for OpenAI or
    /// `$OLLAMA_MODEL` for Ollama.
    #[serde(default)]
    pub model: Option<String>,

    /// Chat Completions base URL override (including `/v1`).
    #[serde(default)]
    pub base_url: Option<String>,

    /// Command used to launch the MCP server. Defaults to the
    /// `wikipedia-mcp` binary next to the chat executable.
    #[serde(default)]
    pub server_command: Option<PathBuf>,

    /// Extra arguments passed to the server command.
    #[serde(default)]
    pub server_args: Vec<String>,

    /// Timeout in seconds for each wait on the MCP server and the LLM.
    #[serde(default = "default_chat_timeout")]
    pub timeout_secs: u64,

    /// Maximum number of LLM round trips with tool calls per user message.
    #[serde(default = "default_max_tool_rounds")]
    pub max_tool_rounds: u32,

    /// System prompt override.
    #[serde(default)]
    pub system_prompt: Option<String>,
}

impl ChatConfig {
    /// Returns the timeout as a [`Duration`].
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            model: None,
            base_url: None,
            server_command: None,
            server_args: Vec::new(),
            timeout_secs: default_chat_timeout(),
            max_tool_rounds: default_max_tool_rounds(),
            system_prompt: None,
        }
    }
}

const fn default_chat_timeout() -> u64 {
    30
}

const fn default_max_tool_rounds() -> u32 {
    8
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_minimal_config() {
        let json = r"{}";
        let config: Config = serde_json::from_str(json).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.wikipedia.language, "en");
        assert!(config.server.advanced_tools);
    }

    #[test]
    fn parse_full_config() {
        let json = r#"{
            "$schema": "https://json-schema.org/draft/2020-12/schema",
            "_comment": "Test config",
            "wikipedia": {
                "language": "de",
                "user_agent": "test-agent/1.0",
                "timeout_secs": 5,
                "api_url": "http://localhost:9000/w/api.php",
                "search_url": "http://localhost:9000/search"
            },
            "server": {
                "advanced_tools": false,
                "peer_timeout_secs": 60
            },
            "chat": {
                "model": "llama3.2",
                "base_url": "http://localhost:11434/v1",
                "server_command": "/usr/local/bin/wikipedia-mcp",
                "server_args": ["-v"],
                "timeout_secs": 45,
                "max_tool_rounds": 4,
                "system_prompt": "Be brief."
            },
            "logging": {
                "level": "debug"
            }
        }"#;

        let config: Config = serde_json::from_str(json).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.wikipedia.api_url(), "http://localhost:9000/w/api.php");
        assert_eq!(config.wikipedia.search_url(), "http://localhost:9000/search");
        assert_eq!(config.wikipedia.timeout(), Duration::from_secs(5));
        assert!(!config.server.advanced_tools);
        assert_eq!(config.server.peer_timeout(), Duration::from_secs(60));
        assert_eq!(config.chat.model.as_deref(), Some("llama3.2"));
        assert_eq!(
            config.chat.server_command,
            Some(PathBuf::from("/usr/local/bin/wikipedia-mcp"))
        );
        assert_eq!(config.chat.server_args, vec!["-v".to_string()]);
        assert_eq!(config.chat.max_tool_rounds, 4);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn wikipedia_config_defaults() {
        let config = WikipediaConfig::default();
        assert_eq!(config.api_url(), "https://en.wikipedia.org/w/api.php");
        assert_eq!(
            config.search_url(),
            "https://api.wikimedia.org/core/v1/wikipedia/en/search/page"
        );
        assert_eq!(config.timeout(), Duration::from_secs(10));
        assert!(config.user_agent.starts_with("wikipedia-mcp/"));
    }

    #[test]
    fn chat_config_defaults() {
        let config = ChatConfig::default();
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert_eq!(config.max_tool_rounds, 8);
        assert!(config.server_command.is_none());
    }

    #[test]
    fn logging_config_defaults() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, "warn");
    }

    #[test]
    fn reject_invalid_language() {
        let json = r#"{ "wikipedia": { "language": "en.evil.com/" } }"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidLanguage { code }) if code == "en.evil.com/"
        ));
    }

    #[test]
    fn reject_zero_timeout() {
        let json = r#"{ "chat": { "timeout_secs": 0 } }"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ZeroTimeout {
                field: "chat.timeout_secs"
            })
        ));
    }

    #[test]
    fn reject_zero_tool_rounds() {
        let json = r#"{ "chat": { "max_tool_rounds": 0 } }"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::NoToolRounds)));
    }

    #[test]
    fn reject_blank_user_agent() {
        let json = r#"{ "wikipedia": { "user_agent": "   " } }"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::EmptyUserAgent)));
    }

    #[test]
    fn reject_unknown_fields() {
        let json = r#"{
            "unknown_field": "value"
        }"#;

        let result: Result<Config, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }
}
