//! logcast - route logs in-process and broadcast them to live listeners
//!
//! # Usage
//!
//! ```bash
//! # Log a message through the providers in a config file
//! logcast emit --config logcast.toml --level warn --category disk "80% full"
//!
//! # Broadcast stdin lines on a channel once a listener is attached
//! tail -f app.log | logcast emit --channel app --wait-listeners 1
//!
//! # Watch a channel
//! logcast tail --channel app --level error
//! ```

mod cmd;

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};
use logcast_config::Config;
use logcast_pipeline::RouterLayer;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// logcast - route logs in-process and broadcast them to live listeners
#[derive(Parser, Debug)]
#[command(name = "logcast")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Path to configuration file (error if specified but not found)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level for logcast's own diagnostics. Overrides config file.
    #[arg(short, long, global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Log messages through the configured providers
    Emit(cmd::emit::EmitArgs),

    /// Print messages broadcast on a channel (Unix only)
    #[cfg(unix)]
    Tail(cmd::tail::TailArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let log_level = resolve_log_level(cli.log_level.as_deref(), cli.config.as_deref());

    match cli.command {
        Command::Emit(args) => {
            // Emit initializes logging once its router exists
            cmd::emit::run(args, cli.config.as_deref(), &log_level).await
        }
        #[cfg(unix)]
        Command::Tail(args) => {
            init_logging(&log_level, None)?;
            cmd::tail::run(args).await
        }
    }
}

/// Resolve log level: CLI flag > config file > default "info"
fn resolve_log_level(cli_level: Option<&str>, config_path: Option<&Path>) -> String {
    // CLI flag takes precedence
    if let Some(level) = cli_level {
        return level.to_string();
    }

    // Try to load from config file if specified
    if let Some(path) = config_path
        && path.exists()
        && let Ok(config) = Config::from_file(path)
    {
        return config.log.level.as_str().to_string();
    }

    "info".to_string()
}

/// Initialize the tracing subscriber for diagnostics
///
/// Diagnostics go to stderr so they never mix with routed output on stdout.
/// With a bridge, every diagnostic that passes the filter is also logged
/// through the router.
fn init_logging(level: &str, bridge: Option<RouterLayer>) -> Result<()> {
    let filter = EnvFilter::try_new(level)
        .or_else(|_| EnvFilter::try_new("info"))
        .map_err(|e| anyhow::anyhow!("invalid log level: {}", e))?;

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_ansi(atty::is(atty::Stream::Stderr)),
        )
        .with(bridge)
        .with(filter)
        .init();

    Ok(())
}
