use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use office_status::config;
use office_status::integrations::openclaw::{self, OpenClawCli};
use office_status::server;
use office_status::snapshot::{self, PollPaths};
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

#[derive(Parser, Debug)]
#[command(name = "office-status")]
#[command(about = "Poll OpenClaw sessions and write status.json for the office dashboard")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Keep refreshing every SECS seconds (default 30)
    #[arg(long = "loop", value_name = "SECS", num_args = 0..=1, default_missing_value = "30")]
    interval: Option<String>,

    /// Path to config file
    #[arg(long, short, global = true)]
    config: Option<std::path::PathBuf>,

    /// Path to the status file to write
    #[arg(long, short, global = true)]
    output: Option<std::path::PathBuf>,

    /// OpenClaw CLI binary
    #[arg(long, global = true)]
    openclaw: Option<String>,

    /// Seconds to wait for the session listing
    #[arg(long, default_value_t = 10, global = true)]
    timeout: u64,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the dashboard with /api/status and live WebSocket updates on /ws
    Serve {
        /// Port to listen on
        #[arg(long, env = "PORT", default_value_t = server::DEFAULT_PORT)]
        port: u16,

        /// Address to bind
        #[arg(long, default_value = "0.0.0.0")]
        host: IpAddr,

        /// Milliseconds between polls (default 10000)
        #[arg(long, env = "POLL_INTERVAL", value_name = "MS")]
        poll_interval: Option<String>,

        /// Directory with the dashboard files (defaults to the config directory)
        #[arg(long)]
        static_dir: Option<std::path::PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("office_status=info".parse()?),
        )
        .init();

    let defaults = PollPaths::default();
    let paths = PollPaths {
        config: args.config.unwrap_or(defaults.config),
        output: args.output.unwrap_or(defaults.output),
    };

    let source = OpenClawCli::new(args.openclaw.unwrap_or_else(openclaw::program))
        .with_timeout(Duration::from_secs(args.timeout));

    if let Some(Command::Serve {
        port,
        host,
        poll_interval,
        static_dir,
    }) = args.command
    {
        let poll_interval = server::parse_poll_interval(poll_interval.as_deref());
        let static_root = static_dir.unwrap_or_else(config::base_dir);
        let static_root = static_root
            .canonicalize()
            .with_context(|| format!("Dashboard directory {} not found", static_root.display()))?;

        return server::serve(
            SocketAddr::new(host, port),
            paths,
            Arc::new(source),
            poll_interval,
            static_root,
            shutdown_on_ctrl_c("stopping server"),
        )
        .await;
    }

    let Some(raw_interval) = args.interval else {
        snapshot::refresh(&paths, &source).await?;
        return Ok(());
    };

    let interval = snapshot::parse_interval(Some(&raw_interval));

    snapshot::run_loop(
        &paths,
        &source,
        interval,
        shutdown_on_ctrl_c("stopping after the current poll"),
    )
    .await
}

/// Flip the returned flag to true on Ctrl+C.
fn shutdown_on_ctrl_c(action: &'static str) -> watch::Receiver<bool> {
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("Received Ctrl+C, {}", action);
                let _ = shutdown_tx.send(true);
            }
            Err(e) => {
                tracing::warn!("Could not listen for Ctrl+C: {}", e);
                // Keep the sender alive so the loop keeps running
                std::future::pending::<()>().await;
            }
        }
    });
    shutdown_rx
}
