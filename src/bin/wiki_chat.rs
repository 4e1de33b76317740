//! wiki-chat: research-assistant chat client for the wikipedia-mcp server
//!
//! Launches the MCP server as a child process, lets a language model call
//! its tools, and runs an interactive session in the terminal.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Args as ClapArgs, Parser, Subcommand};
use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;

use wikipedia_mcp::chat::prompts::{self, ERROR_HELP, INFO};
use wikipedia_mcp::chat::{
    AssistantHandler, ChatError, ChatSession, EnvironmentError, LineInput, LlmClient, LlmSettings,
    ToolAgent,
};
use wikipedia_mcp::config::{self, Config};
use wikipedia_mcp::mcp::protocol::SERVER_NAME;
use wikipedia_mcp::mcp::McpClient;

/// Wikipedia research assistant.
#[derive(Parser, Debug)]
#[command(name = "wiki-chat")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start an interactive chat session
    Chat(ChatArgs),
    /// Show the available tools and commands
    Info,
}

/// Arguments for `wiki-chat chat`.
#[derive(ClapArgs, Debug)]
struct ChatArgs {
    /// Path to configuration file
    #[arg(value_name = "CONFIG_FILE")]
    config: Option<PathBuf>,

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

/// Returns the MCP server command: the configured one, or the
/// `wikipedia-mcp` binary installed next to this executable.
fn server_command(cfg: &Config) -> Option<PathBuf> {
    if let Some(command) = &cfg.chat.server_command {
        return Some(command.clone());
    }
    let exe = std::env::current_exe().ok()?;
    Some(
        exe.parent()?
            .join(format!("wikipedia-mcp{}", std::env::consts::EXE_SUFFIX)),
    )
}

/// Whether `command` names a file path (as opposed to a bare name looked up on `PATH`).
fn is_path(command: &Path) -> bool {
    command.components().count() > 1
}

/// Checks everything a session needs before starting one.
fn check_environment(cfg: &Config) -> Result<(LlmSettings, PathBuf), EnvironmentError> {
    let mut problems = Vec::new();

    let settings = match LlmSettings::from_env(&cfg.chat) {
        Ok(settings) => Some(settings),
        Err(e) => {
            problems.extend(e.problems);
            None
        }
    };

    let command = match server_command(cfg) {
        Some(command) if is_path(&command) && !command.exists() => {
            problems.push(format!(
                "MCP server not found at {}",
                command.display()
            ));
            None
        }
        Some(command) => Some(command),
        None => {
            problems.push("Cannot locate the wikipedia-mcp server binary".to_string());
            None
        }
    };

    match (settings, command) {
        (Some(settings), Some(command)) if problems.is_empty() => Ok((settings, command)),
        _ => Err(EnvironmentError { problems }),
    }
}

/// Runs one chat session against a freshly spawned server.
async fn run_chat(cfg: &Config, settings: LlmSettings, command: &Path) -> Result<(), ChatError> {
    let model = Arc::new(LlmClient::new(settings, cfg.chat.timeout())?);
    let input = LineInput::stdin();

    let handler = AssistantHandler::new(Arc::clone(&model), input.clone());
    let client = McpClient::spawn(
        command,
        &cfg.chat.server_args,
        handler,
        cfg.chat.timeout(),
    )
    .await?;
    let server_name = client.server_name().unwrap_or(SERVER_NAME).to_string();

    let system_prompt = cfg
        .chat
        .system_prompt
        .clone()
        .unwrap_or_else(|| prompts::SYSTEM_PROMPT.to_string());
    let agent = ToolAgent::connect(model, client, system_prompt, cfg.chat.max_tool_rounds).await?;
    info!(tools = agent.tool_count(), "Agent ready");

    println!("{}", prompts::welcome(&server_name));

    let mut session = ChatSession::new(agent, input, std::io::stdout());
    let outcome = session.run().await;

    session.into_agent().into_client().shutdown().await;
    Ok(outcome?)
}

fn chat(args: ChatArgs) -> ExitCode {
    // Load configuration
    let config_path = args.config.as_deref();
    let cfg = match config::load_config(config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };

    // Initialise logging
    let log_level = get_log_level(args.verbose, args.quiet, &cfg.logging.level);
    init_tracing(log_level);

    let (settings, command) = match check_environment(&cfg) {
        Ok(found) => found,
        Err(e) => {
            eprintln!("Environment check failed:\n{e}\n\n{ERROR_HELP}");
            return ExitCode::FAILURE;
        }
    };

    info!(
        version = env!("CARGO_PKG_VERSION"),
        provider = ?settings.provider,
        model = %settings.model,
        server = %command.display(),
        "Starting wiki-chat"
    );

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("Failed to create Tokio runtime");

    match runtime.block_on(run_chat(&cfg, settings, &command)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Chat session failed");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Entry point for the wiki-chat client.
fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    match Cli::parse().command {
        Commands::Chat(args) => chat(args),
        Commands::Info => {
            println!("{INFO}");
            ExitCode::SUCCESS
        }
    }
}
