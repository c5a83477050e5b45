//! Emit command - log messages through configured providers
//!
//! Builds a router from the configuration file, registers its providers in
//! order, then logs either the message given on the command line or every
//! line read from stdin.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Args;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};

use logcast_config::{Config, ConsoleProviderConfig, FileProviderConfig, ProviderConfig};
use logcast_pipeline::{Router, RouterLayer};
use logcast_protocol::{LevelFilter, LogLevel, LogMessage, MetricValue};
use logcast_sinks::{ConsoleConfig, ConsoleProvider, FileConfig, FileProvider};
#[cfg(unix)]
use logcast_tap::{BroadcastServer, BroadcastServerConfig, Channel};

/// Longest wait for listeners to drain before shutting a server down
#[cfg(unix)]
const FLUSH_TIMEOUT: Duration = Duration::from_secs(5);

/// Emit command arguments
#[derive(Args, Debug)]
pub struct EmitArgs {
    /// Broadcast on this channel (in addition to configured providers)
    #[arg(long, value_name = "NAME")]
    channel: Option<String>,

    /// Level of the emitted messages
    #[arg(long, default_value = "info")]
    level: LogLevel,

    /// Category of the emitted messages
    #[arg(long, default_value = "")]
    category: String,

    /// Global threshold. Overrides config file.
    #[arg(long, value_name = "LEVEL")]
    global_threshold: Option<LevelFilter>,

    /// Wait until this many listeners are connected before logging
    #[arg(long, value_name = "N")]
    wait_listeners: Option<usize>,

    /// Give up waiting for listeners after this many seconds
    #[arg(long, value_name = "SECS", default_value = "10")]
    wait_timeout: u64,

    /// Unit of the metric value
    #[arg(long, requires = "metric_value")]
    metric_unit: Option<String>,

    /// Attach a metric value (integer or decimal) to every message
    #[arg(long, value_name = "VALUE")]
    metric_value: Option<MetricValue>,

    /// Message text; read lines from stdin when omitted
    message: Vec<String>,
}

/// Shape of every message this run emits
struct Template {
    level: LogLevel,
    category: String,
    metric: Option<(String, MetricValue)>,
}

impl Template {
    fn message(&self, text: impl Into<String>) -> LogMessage {
        let message = LogMessage::new(self.level, self.category.clone(), text);
        match &self.metric {
            Some((unit, value)) => message.with_metric(unit.clone(), *value),
            None => message,
        }
    }
}

/// Run the emit command
pub async fn run(args: EmitArgs, config_path: Option<&Path>, log_level: &str) -> Result<()> {
    let config = match config_path {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => Config::default(),
    };

    let threshold = args.global_threshold.unwrap_or(config.router.threshold);
    let router = Arc::new(Router::with_global_threshold(threshold));

    let bridge = config
        .log
        .bridge
        .then(|| RouterLayer::new(Arc::clone(&router)));
    crate::init_logging(log_level, bridge)?;

    let outputs = Outputs::register(&router, &config, args.channel.as_deref()).await?;

    if let Some(wanted) = args.wait_listeners {
        outputs
            .wait_for_listeners(wanted, Duration::from_secs(args.wait_timeout))
            .await?;
    }

    let template = Template {
        level: args.level,
        category: args.category,
        metric: args
            .metric_value
            .map(|value| (args.metric_unit.unwrap_or_default(), value)),
    };

    let mut sent = 0usize;
    if args.message.is_empty() {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
            router.log(&template.message(line))?;
            sent += 1;
        }
    } else {
        router.log(&template.message(args.message.join(" ")))?;
        sent += 1;
    }

    outputs.close().await;

    let metrics = router.metrics().snapshot();
    info!(
        sent,
        delivered = metrics.deliveries,
        filtered = metrics.messages_filtered,
        "emit finished"
    );
    Ok(())
}

/// Providers registered for this run that need tearing down
struct Outputs {
    #[cfg(unix)]
    servers: Vec<Arc<BroadcastServer>>,
    files: Vec<Arc<FileProvider>>,
}

impl Outputs {
    /// Register configured providers, plus a broadcast for `channel`
    ///
    /// With nothing configured, messages go to a console provider.
    async fn register(router: &Router, config: &Config, channel: Option<&str>) -> Result<Self> {
        let mut outputs = Self {
            #[cfg(unix)]
            servers: Vec::new(),
            files: Vec::new(),
        };

        for provider in &config.providers {
            outputs.add(router, provider).await?;
        }

        if let Some(name) = channel {
            outputs.add_channel(router, name).await?;
        }

        if router.provider_count() == 0 {
            let console = console_provider(&ConsoleProviderConfig::default());
            router.add_provider(Arc::new(console), LevelFilter::Trace);
        }

        debug!(providers = ?router.providers(), "router ready");
        Ok(outputs)
    }

    async fn add(&mut self, router: &Router, provider: &ProviderConfig) -> Result<()> {
        let threshold = provider.threshold();

        match provider {
            ProviderConfig::Console(console) => {
                router.add_provider(Arc::new(console_provider(console)), threshold);
            }
            ProviderConfig::File(file) => {
                let file = Arc::new(file_provider(file)?);
                router.add_provider(file.clone(), threshold);
                self.files.push(file);
            }
            #[cfg(unix)]
            ProviderConfig::Broadcast(broadcast) => {
                let channel = Channel::new(&broadcast.channel)?;
                let config = BroadcastServerConfig::new(channel)
                    .with_queue_capacity(broadcast.queue_capacity)
                    .with_listener_queue_capacity(broadcast.listener_queue_capacity);
                let server = Arc::new(bind(config).await?);
                router.add_provider(server.clone(), threshold);
                self.servers.push(server);
            }
            #[cfg(not(unix))]
            ProviderConfig::Broadcast(_) => {
                bail!("broadcast providers need Unix domain sockets");
            }
        }
        Ok(())
    }

    #[cfg(unix)]
    async fn add_channel(&mut self, router: &Router, name: &str) -> Result<()> {
        let channel = Channel::new(name)?;
        if self.servers.iter().any(|s| s.channel() == &channel) {
            return Ok(());
        }

        let server = Arc::new(bind(BroadcastServerConfig::new(channel)).await?);
        router.add_provider(server.clone(), LevelFilter::Trace);
        self.servers.push(server);
        Ok(())
    }

    #[cfg(not(unix))]
    async fn add_channel(&mut self, _router: &Router, _name: &str) -> Result<()> {
        bail!("--channel needs Unix domain sockets")
    }

    fn listener_count(&self) -> usize {
        #[cfg(unix)]
        return self.servers.iter().map(|s| s.connection_count()).sum();
        #[cfg(not(unix))]
        return 0;
    }

    async fn wait_for_listeners(&self, wanted: usize, limit: Duration) -> Result<()> {
        info!(wanted, "waiting for listeners");

        let waited = tokio::time::timeout(limit, async {
            while self.listener_count() < wanted {
                tokio::time::sleep(Duration::from_millis(20)).await;
            }
        })
        .await;

        if waited.is_err() {
            bail!(
                "only {} of {} listeners connected within {}s",
                self.listener_count(),
                wanted,
                limit.as_secs()
            );
        }
        Ok(())
    }

    /// Deliver queued frames, then stop servers and flush files
    ///
    /// A listener that has stopped reading can hold a flush; after
    /// `FLUSH_TIMEOUT` the server is shut down regardless.
    async fn close(self) {
        #[cfg(unix)]
        for server in &self.servers {
            if tokio::time::timeout(FLUSH_TIMEOUT, server.flush()).await.is_err() {
                tracing::warn!(
                    channel = %server.channel(),
                    "listeners did not drain in time, closing anyway"
                );
            }
            server.shutdown().await;
        }

        for file in &self.files {
            if let Err(e) = file.flush() {
                tracing::warn!(path = %file.path().display(), error = %e, "failed to flush log file");
            }
        }
    }
}

fn console_provider(config: &ConsoleProviderConfig) -> ConsoleProvider {
    ConsoleProvider::new(ConsoleConfig {
        color: config.color && atty::is(atty::Stream::Stdout),
        timestamps: config.timestamps,
    })
}

fn file_provider(config: &FileProviderConfig) -> Result<FileProvider> {
    let file_config = FileConfig::new(&config.path)
        .with_retry_delay(Duration::from_millis(config.retry_delay_ms));
    FileProvider::new(file_config)
        .with_context(|| format!("invalid file provider for {}", config.path))
}

#[cfg(unix)]
async fn bind(config: BroadcastServerConfig) -> Result<BroadcastServer> {
    let path = config.channel.socket_path();
    BroadcastServer::bind(config)
        .await
        .with_context(|| format!("failed to listen on {}", path.display()))
}

#[cfg(test)]
#[path = "emit_test.rs"]
mod tests;
