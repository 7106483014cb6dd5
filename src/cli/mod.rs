//! Command-line interface parsing and handling
//!
//! This module handles parsing command-line arguments and executing the appropriate commands.

pub mod say;
pub mod tool_list;

use std::error::Error;
use std::fs::OpenOptions;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::api::gateway::{ApiGateway, HttpGateway};
use crate::core::config::{Config, ConfigKey, ResolvedConfig, BASE_URL_ENV};
use crate::core::message::Message;
use crate::core::session::{Completion, Session, SessionHandle};
use crate::ui::chat_loop::{run_chat, ChatOptions};
use crate::ui::text::{render_text, DEFAULT_WIDTH};

#[derive(Parser)]
#[command(name = "dqchat")]
#[command(about = "Chat with a data-quality agent from the terminal")]
#[command(
    long_about = "dqchat talks to a data-quality agent over its REST API. Ask questions in \
plain language; answers come back as text plus tables, charts and quick-action buttons, \
and every tool the agent ran is summarized with a success/warning/error badge.\n\n\
Configuration:\n\
  Use 'dqchat set <key> <value>' to store defaults (base-url, data-path, show-tool-results).\n\n\
Environment Variables:\n\
  DQCHAT_BASE_URL   Agent URL (overrides the config file, not --base-url)\n\
  RUST_LOG          Log filter, e.g. 'dqchat=debug'\n\n\
Commands (inside the chat):\n\
  /help             List commands\n\
  /upload <path>    Register a data file\n\
  /action <id>      Send a quick action, e.g. /action validate_data\n\
  /recover          Re-check the agent after an error\n\
  /quit             Leave"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Agent base URL (default http://localhost:8000)
    #[arg(short = 'u', long, global = true, value_name = "URL")]
    pub base_url: Option<String>,

    /// Data file to register before chatting
    #[arg(short = 'd', long = "data", global = true, value_name = "PATH")]
    pub data: Option<String>,

    /// Log debug details to stderr
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// Append logs to this file instead of stderr
    #[arg(long, global = true, value_name = "FILE")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the interactive chat (default)
    Chat,
    /// Send one message, print the reply, and exit
    Say {
        /// Message text (multiple words are joined with spaces)
        #[arg(trailing_var_arg = true, allow_hyphen_values = true, required = true)]
        prompt: Vec<String>,
    },
    /// Check whether the agent is reachable
    Health,
    /// Register a data file with the agent
    Upload {
        /// Path to the file, as seen by the agent
        path: String,
    },
    /// List the agent's analysis tools
    Tools,
    /// Run one tool directly
    Tool {
        /// Tool name
        name: String,
        /// Parameters as a JSON object
        #[arg(long, value_name = "JSON")]
        params: Option<String>,
    },
    /// Set configuration values, or show them when no key is given
    Set {
        /// Configuration key to set
        key: Option<String>,
        /// Value to set for the key
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        value: Option<Vec<String>>,
    },
    /// Unset configuration values
    Unset {
        /// Configuration key to unset
        key: String,
    },
    /// Show version and build details
    Version,
}

pub fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    init_tracing(args.verbose, args.log_file.as_deref())?;

    tokio::runtime::Runtime::new()?.block_on(async_main(args))
}

fn init_tracing(verbose: bool, log_file: Option<&Path>) -> Result<(), Box<dyn Error>> {
    let default_filter = if verbose { "warn,dqchat=debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    let installed = match log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).try_init()
        }
        None => builder.with_writer(std::io::stderr).try_init(),
    };
    installed.map_err(|err| -> Box<dyn Error> { err })
}

fn resolve_config(
    base_url: Option<&str>,
    data: Option<&str>,
) -> Result<ResolvedConfig, Box<dyn Error>> {
    let config = Config::load()?;
    let env_base_url = std::env::var(BASE_URL_ENV).ok();
    Ok(config.resolve(base_url, data, env_base_url.as_deref()))
}

pub(crate) fn connect_session(resolved: &ResolvedConfig) -> Result<SessionHandle, Box<dyn Error>> {
    let gateway: Arc<dyn ApiGateway> = Arc::new(HttpGateway::new(resolved.base_url.clone())?);
    Ok(SessionHandle::new(Session::new(gateway)))
}

pub(crate) fn terminal_width() -> usize {
    std::env::var("COLUMNS")
        .ok()
        .and_then(|value| value.trim().parse::<usize>().ok())
        .filter(|width| *width >= 20)
        .unwrap_or(DEFAULT_WIDTH)
}

/// Print agent messages appended since `seen`; returns the new log length.
pub(crate) async fn print_agent_messages(
    handle: &SessionHandle,
    seen: usize,
    show_tool_results: bool,
) -> usize {
    let fresh: Vec<Message> = handle.messages_since(seen).await;
    let width = terminal_width();
    for message in fresh.iter().filter(|message| message.is_agent()) {
        println!("{}\n", render_text(message, width, show_tool_results));
    }
    seen + fresh.len()
}

/// Exit non-zero when a one-shot operation did not succeed.
pub(crate) fn exit_on_failure(completion: &Completion) {
    if let Completion::Failed { error, .. } = completion {
        tracing::debug!(%error, "one-shot command failed");
        std::process::exit(1);
    }
}

async fn async_main(args: Args) -> Result<(), Box<dyn Error>> {
    let Args {
        command,
        base_url,
        data,
        ..
    } = args;

    match command.unwrap_or(Commands::Chat) {
        Commands::Set { key, value } => run_set(key, value),
        Commands::Unset { key } => run_unset(&key),
        Commands::Version => {
            print_version();
            Ok(())
        }
        command => {
            let resolved = resolve_config(base_url.as_deref(), data.as_deref())?;
            run_session_command(command, resolved).await
        }
    }
}

async fn run_session_command(
    command: Commands,
    resolved: ResolvedConfig,
) -> Result<(), Box<dyn Error>> {
    let handle = connect_session(&resolved)?;

    match command {
        Commands::Say { prompt } => say::run_say(&handle, &resolved, prompt).await,
        Commands::Health => {
            let completion = handle.connect().await?;
            match &completion {
                Completion::Succeeded(_) => {
                    println!("✅ Agent at {} is reachable", resolved.base_url)
                }
                Completion::Failed { error, .. } => {
                    eprintln!("❌ Agent at {}: {error}", resolved.base_url)
                }
            }
            exit_on_failure(&completion);
            Ok(())
        }
        Commands::Upload { path } => {
            let completion = handle.register_data_source(&path).await?;
            print_agent_messages(&handle, 0, resolved.show_tool_results).await;
            exit_on_failure(&completion);
            Ok(())
        }
        Commands::Tools => tool_list::list_tools(&handle).await,
        Commands::Tool { name, params } => {
            tool_list::run_tool(&handle, &name, params.as_deref()).await
        }
        _ => {
            let options = ChatOptions {
                base_url: resolved.base_url.clone(),
                data_path: resolved.data_path.clone(),
                show_tool_results: resolved.show_tool_results,
                width: terminal_width(),
                interactive: std::io::stdin().is_terminal(),
            };
            run_chat(handle, options).await
        }
    }
}

fn parse_key_or_exit(key: &str) -> ConfigKey {
    match key.parse() {
        Ok(key) => key,
        Err(message) => {
            eprintln!("❌ {message}");
            std::process::exit(1);
        }
    }
}

fn run_set(key: Option<String>, value: Option<Vec<String>>) -> Result<(), Box<dyn Error>> {
    let Some(key) = key else {
        Config::load()?.print_all();
        return Ok(());
    };
    let key = parse_key_or_exit(&key);
    let value = value.unwrap_or_default().join(" ");
    if value.trim().is_empty() {
        Config::load()?.print_all();
        return Ok(());
    }
    match Config::update(|config| config.set(key, &value)) {
        Ok(_) => println!("✅ Set {key} to: {}", value.trim()),
        Err(err) => {
            eprintln!("❌ {err}");
            std::process::exit(1);
        }
    }
    Ok(())
}

fn run_unset(key: &str) -> Result<(), Box<dyn Error>> {
    let key = parse_key_or_exit(key);
    Config::update(|config| {
        config.unset(key);
        Ok(())
    })?;
    println!("✅ Unset {key}");
    Ok(())
}

fn print_version() {
    println!("dqchat {}", env!("CARGO_PKG_VERSION"));
    println!(
        "  commit:     {}",
        option_env!("VERGEN_GIT_DESCRIBE").unwrap_or("unknown")
    );
    println!(
        "  sha:        {}",
        option_env!("VERGEN_GIT_SHA").unwrap_or("unknown")
    );
    println!(
        "  built:      {}",
        option_env!("VERGEN_BUILD_TIMESTAMP").unwrap_or("unknown")
    );
    println!(
        "  rustc:      {}",
        option_env!("VERGEN_RUSTC_SEMVER").unwrap_or("unknown")
    );
    println!(
        "  target:     {}",
        option_env!("VERGEN_CARGO_TARGET_TRIPLE").unwrap_or("unknown")
    );
}

#[cfg(test)]
mod tests;
