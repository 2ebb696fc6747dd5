#![forbid(unsafe_code)]

//! `shift-sentinel` — overtime shift escalation and dispatch service binary.
//!
//! Bootstraps configuration, wires the gateway clients and the escalation
//! engine, starts the periodic scan task, and serves the HTTP triggers.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use shift_sentinel::config::GlobalConfig;
use shift_sentinel::dispatch::{EndpointResolver, NotificationDispatcher};
use shift_sentinel::escalation::{scheduler, EscalationEngine};
use shift_sentinel::gateway::data::{DataGateway, HttpDataGateway};
use shift_sentinel::gateway::push::{HttpPushGateway, PushGateway};
use shift_sentinel::server::{self, AppState};
use shift_sentinel::{AppError, Result};

#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "shift-sentinel", about = "Overtime shift escalation and dispatch service", version, long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long)]
    config: PathBuf,

    /// Log output format (text or json).
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    /// Override the configured HTTP port.
    #[arg(long)]
    port: Option<u16>,
}

fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(args.log_format);
    info!("shift-sentinel server bootstrap");

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|err| AppError::Config(format!("failed to build tokio runtime: {err}")))?
        .block_on(run(args))
}

async fn run(args: Cli) -> Result<()> {
    // ── Load configuration ──────────────────────────────
    let mut config = GlobalConfig::load_from_path(&args.config)?;
    if let Some(port) = args.port {
        config.http_port = port;
    }
    config.load_credentials().await?;
    info!(
        http_port = config.http_port,
        scan_interval_seconds = config.scan.interval_seconds,
        ios = config.push.ios_application_arn.is_some(),
        android = config.push.android_application_arn.is_some(),
        "configuration loaded"
    );

    // ── Wire gateways and components ────────────────────
    let http = reqwest::Client::new();
    let data: Arc<dyn DataGateway> =
        Arc::new(HttpDataGateway::new(&config.data_gateway, http.clone()));
    let push: Arc<dyn PushGateway> = Arc::new(HttpPushGateway::new(&config.push, http));

    let resolver = EndpointResolver::new(
        Arc::clone(&data),
        Arc::clone(&push),
        config.push.clone(),
        config.dispatch.clone(),
    );
    let dispatcher = Arc::new(NotificationDispatcher::new(resolver, Arc::clone(&push)));
    let engine = Arc::new(EscalationEngine::new(
        Arc::clone(&data),
        Arc::clone(&dispatcher),
        config.scan.page_size,
        config.scan.max_postings,
    ));

    // ── Start the periodic scan ─────────────────────────
    let cancel = CancellationToken::new();
    let scan_task = if config.scan.enabled {
        Some(scheduler::spawn_scan_task(
            Arc::clone(&engine),
            Duration::from_secs(config.scan.interval_seconds),
            cancel.clone(),
        ))
    } else {
        info!("periodic scan disabled by configuration");
        None
    };

    // ── Shutdown on ctrl-c ──────────────────────────────
    let shutdown = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown signal received");
            shutdown.cancel();
        }
    });

    // ── Serve the HTTP triggers ─────────────────────────
    let state = AppState { dispatcher, engine };
    server::serve(state, config.http_port, cancel).await?;

    if let Some(task) = scan_task {
        let _ = task.await;
    }
    info!("shift-sentinel exited cleanly");
    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match format {
        LogFormat::Text => fmt().with_env_filter(filter).init(),
        LogFormat::Json => fmt().with_env_filter(filter).json().init(),
    }
}
