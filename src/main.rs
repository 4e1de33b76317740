//! wikipedia-mcp: MCP server exposing Wikipedia search and retrieval tools
//!
//! Speaks JSON-RPC over stdin/stdout. Logs go to stderr.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;

use wikipedia_mcp::config;
use wikipedia_mcp::mcp::server::McpServer;
use wikipedia_mcp::tools::WikiTools;
use wikipedia_mcp::wiki::WikipediaClient;

/// MCP server exposing Wikipedia search and retrieval tools.
///
/// Tools: search, summaries, full content, metadata, plus LLM-enhanced
/// summaries, interactive disambiguation, and progress-reporting retrieval.
#[derive(Parser, Debug)]
#[command(name = "wikipedia-mcp")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(value_name = "CONFIG_FILE")]
    config: Option<PathBuf>,

    /// Wikipedia language edition (overrides the config file)
    #[arg(short, long)]
    language: Option<String>,

    /// Only expose the basic tools (no sampling, elicitation, or progress)
    #[arg(long)]
    basic: bool,

    /// Increase logging verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Decrease logging verbosity (only show errors)
    #[arg(short, long)]
    quiet: bool,
}

/// Determines the log level from CLI arguments.
#[allow(clippy::match_same_arms)] // Explicit "warn" arm for clarity
fn get_log_level(verbose: u8, quiet: bool, config_level: &str) -> Level {
    if quiet {
        return Level::ERROR;
    }

    match verbose {
        0 => match config_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::WARN,
        },
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Initialises the tracing subscriber for logging.
fn init_tracing(level: Level) {
    let filter = EnvFilter::from_default_env().add_directive(level.into());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Entry point for the wikipedia-mcp server.
fn main() -> ExitCode {
    let args = Args::parse();

    // Load configuration
    let config_path = args.config.as_deref();
    let mut cfg = match config::load_config(config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            if config_path.is_none() {
                if let Some(default_path) = config::default_config_path() {
                    eprintln!("\nConfig file: {}", default_path.display());
                    eprintln!("See config/example-config.json for the format");
                }
            }
            return ExitCode::FAILURE;
        }
    };

    if let Some(language) = args.language {
        cfg.wikipedia.language = language;
    }
    if args.basic {
        cfg.server.advanced_tools = false;
    }
    if let Err(e) = cfg.validate() {
        eprintln!("Configuration error: {e}");
        return ExitCode::FAILURE;
    }

    // Initialise logging
    let log_level = get_log_level(args.verbose, args.quiet, &cfg.logging.level);
    init_tracing(log_level);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        language = %cfg.wikipedia.language,
        advanced_tools = cfg.server.advanced_tools,
        "Starting wikipedia-mcp server"
    );

    let client = match WikipediaClient::new(&cfg.wikipedia) {
        Ok(client) => client,
        Err(e) => {
            error!(error = %e, "Failed to create Wikipedia client");
            return ExitCode::FAILURE;
        }
    };

    // Create MCP server
    let mut server = McpServer::stdio(WikiTools::new(client), &cfg.server);

    info!("MCP server ready, waiting for client connection...");

    // Run the server
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("Failed to create Tokio runtime");

    let result = runtime.block_on(server.run());

    match result {
        Ok(()) => {
            info!("Server shut down gracefully");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Server error");
            ExitCode::FAILURE
        }
    }
}
