// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use tunnely::cloudflare::{CachedGateway, CloudflareClient, DryRunGateway, RemoteGateway};
use tunnely::config::Settings;
use tunnely::docker::{list_workloads, watch_events};
use tunnely::reconcilers::{handle_event, reconcile_containers};

/// Read Docker container labels and automatically publish hostnames and DNS
/// records to Cloudflare Zero Trust.
#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Set the log level (RUST_LOG overrides this when set)
    #[arg(short = 'l', long, value_enum, default_value = "info")]
    log_level: LogLevel,

    /// Don't run Cloudflare API calls that modify; log what would be done
    #[arg(short = 'd', long)]
    dry_run: bool,

    /// Log Cloudflare API request and response bodies
    #[arg(long)]
    api_debug: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn as_filter(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Build Tokio runtime with custom thread names
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .thread_name("tunnely")
        .enable_all()
        .build()?;

    runtime.block_on(async_main(args))
}

async fn async_main(args: Args) -> Result<()> {
    init_logging(&args);

    info!("Starting tunnely");

    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(err) => {
            error!("{err}");
            std::process::exit(1);
        }
    };

    let client = CloudflareClient::new(settings.api_token.clone(), args.api_debug);
    let gateway: Arc<dyn RemoteGateway> = if args.dry_run {
        info!("Dry run: Cloudflare mutations will be logged, not applied");
        Arc::new(DryRunGateway::new(client))
    } else {
        Arc::new(client)
    };

    let docker = bollard::Docker::connect_with_local_defaults()?;
    debug!("Docker client initialized");

    // Subscribe to events before the scan so containers starting during it
    // are replayed afterwards; the add path is idempotent either way.
    let (events_tx, mut events_rx) = mpsc::unbounded_channel();
    let watcher = tokio::spawn(watch_events(docker.clone(), events_tx));

    info!(
        "Using tunnel ID \"{}\" as default tunnel",
        settings.default_tunnel_id
    );

    let workloads = list_workloads(&docker).await?;
    let scan_gateway = CachedGateway::new(Arc::clone(&gateway));
    reconcile_containers(
        &scan_gateway,
        &settings.account_id,
        &settings.default_tunnel_id,
        &workloads,
    )
    .await;
    info!("Startup scan complete ({} containers)", workloads.len());

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown signal received");
                break;
            }
            received = events_rx.recv() => {
                let Some(event) = received else {
                    error!("docker event channel closed");
                    break;
                };
                // Each event is its own pass with a fresh cache.
                let event_gateway = CachedGateway::new(Arc::clone(&gateway));
                handle_event(
                    &event_gateway,
                    &settings.account_id,
                    &settings.default_tunnel_id,
                    &event,
                )
                .await;
            }
        }
    }

    watcher.abort();
    info!("tunnely stopped");
    Ok(())
}

/// Initialize tracing. `RUST_LOG` wins over `--log-level` when set, and
/// `RUST_LOG_FORMAT=json` switches to JSON output.
fn init_logging(args: &Args) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(args.log_level.as_filter()));

    let log_format = std::env::var("RUST_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    match log_format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .json()
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_ansi(true)
                .compact()
                .init();
        }
    }
}
