//! Configuration errors shared by `wikipedia-mcp` and `wiki-chat`.
//!
//! Errors raised by the article source, the tools, the MCP client and the
//! chat client live next to the code that produces them.

use std::path::PathBuf;

use thiserror::Error;

/// Why a configuration file was rejected.
///
/// Validation failures name the offending JSON field.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A config path was given on the command line but nothing is there.
    #[error("No config file at {path}")]
    Missing {
        /// The path that was given.
        path: PathBuf,
    },

    /// The file exists but could not be read.
    #[error("Cannot read config file {path}: {source}")]
    Unreadable {
        /// The config file.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The file is not JSON, or does not match the config layout.
    #[error("Config file {path} is invalid: {source}")]
    Malformed {
        /// The config file.
        path: PathBuf,
        /// The JSON error, with line and column.
        #[source]
        source: serde_json::Error,
    },

    /// `wikipedia.language` is not a Wikipedia subdomain.
    #[error("wikipedia.language '{code}' is not a language code like 'en' or 'zh-yue'")]
    InvalidLanguage {
        /// The rejected value.
        code: String,
    },

    /// `wikipedia.user_agent` is blank.
    #[error("wikipedia.user_agent cannot be empty")]
    EmptyUserAgent,

    /// A timeout field is zero.
    #[error("{field} must be greater than zero")]
    ZeroTimeout {
        /// Dotted path of the field.
        field: &'static str,
    },

    /// `chat.max_tool_rounds` is zero.
    #[error("chat.max_tool_rounds must be at least 1")]
    NoToolRounds,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_names_the_path() {
        let error = ConfigError::Missing {
            path: PathBuf::from("/etc/wikipedia-mcp/config.json"),
        };
        assert_eq!(
            error.to_string(),
            "No config file at /etc/wikipedia-mcp/config.json"
        );
    }

    #[test]
    fn malformed_file_includes_json_position() {
        let source = serde_json::from_str::<serde_json::Value>("{ nope").unwrap_err();
        let error = ConfigError::Malformed {
            path: PathBuf::from("config.json"),
            source,
        };
        let msg = error.to_string();
        assert!(msg.starts_with("Config file config.json is invalid: "));
        assert!(msg.contains("line 1"));
    }

    #[test]
    fn validation_errors_name_the_field() {
        assert_eq!(
            ConfigError::ZeroTimeout {
                field: "server.peer_timeout_secs"
            }
            .to_string(),
            "server.peer_timeout_secs must be greater than zero"
        );
        assert_eq!(
            ConfigError::InvalidLanguage {
                code: "en.evil.com/".to_string()
            }
            .to_string(),
            "wikipedia.language 'en.evil.com/' is not a language code like 'en' or 'zh-yue'"
        );
    }
}
