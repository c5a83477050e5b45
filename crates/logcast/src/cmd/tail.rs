//! Tail command - print messages broadcast on a channel
//!
//! Connects to a running broadcast server and prints every message it
//! sends, one line each, until the server goes away or Ctrl+C.

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use logcast_pipeline::Provider;
use logcast_protocol::{LevelFilter, LogMessage};
use logcast_sinks::{ConsoleConfig, ConsoleProvider};
use logcast_tap::{Channel, DEFAULT_CHANNEL, TapClient};

/// Tail command arguments
#[derive(Args, Debug)]
pub struct TailArgs {
    /// Channel name or socket path to connect to
    #[arg(long, default_value = DEFAULT_CHANNEL)]
    channel: String,

    /// Only print messages at or above this level
    #[arg(long, default_value = "trace")]
    level: LevelFilter,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Don't prefix lines with the local time
    #[arg(long)]
    no_timestamps: bool,
}

/// Run the tail command
pub async fn run(args: TailArgs) -> Result<()> {
    let channel = Channel::new(args.channel)?;

    // Enable color only if: stdout is TTY AND --no-color not set
    let output = ConsoleProvider::new(ConsoleConfig {
        color: atty::is(atty::Stream::Stdout) && !args.no_color,
        timestamps: !args.no_timestamps,
    });

    let mut client = TapClient::connect(&channel).await.with_context(|| {
        format!(
            "failed to connect to channel '{}' at {}",
            channel,
            channel.socket_path().display()
        )
    })?;
    info!(channel = %channel, "connected, streaming messages (Ctrl+C to stop)");

    let mut printed = 0u64;
    loop {
        tokio::select! {
            result = client.recv() => {
                match result? {
                    Some(message) => {
                        if print(&output, args.level, &message)? {
                            printed += 1;
                        }
                    }
                    None => {
                        info!("server closed the channel");
                        break;
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                break;
            }
        }
    }

    info!(printed, skipped = client.skipped(), "tail finished");
    Ok(())
}

/// Print `message` if it passes `level`
fn print(output: &ConsoleProvider, level: LevelFilter, message: &LogMessage) -> Result<bool> {
    if !level.allows(message.level()) {
        return Ok(false);
    }
    output.log(message)?;
    Ok(true)
}
