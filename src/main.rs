use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use axum_prometheus::PrometheusMetricLayer;
use candidate_tracker::config::AppConfig;
use candidate_tracker::error::AppError;
use candidate_tracker::telemetry;
use candidate_tracker::tracker::{
    tracker_router, CandidateService, JsonlCandidateStore, ReportRegenerator, TrackerState,
};
use clap::{Args, Parser, Subcommand};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::json;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
struct AppState {
    readiness: Arc<AtomicBool>,
    metrics: PrometheusHandle,
}

#[derive(Parser, Debug)]
#[command(
    name = "Candidate Tracker",
    about = "Track interview candidates, rank them per hiring domain, and serve the domain reports",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Operate on the per-domain report artifacts
    Reports {
        #[command(subcommand)]
        command: ReportsCommand,
    },
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    port: Option<u16>,
}

#[derive(Subcommand, Debug)]
enum ReportsCommand {
    /// Run one offline regeneration pass against the configured store
    Regenerate,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run_cli().await {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

async fn run_cli() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => run_server(args).await,
        Command::Reports {
            command: ReportsCommand::Regenerate,
        } => run_regenerate(),
    }
}

async fn run_server(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let state = AppState {
        readiness: readiness_flag.clone(),
        metrics: prometheus_handle,
    };

    let store = Arc::new(JsonlCandidateStore::open(&config.storage.data_file)?);
    let service = Arc::new(CandidateService::new(
        store,
        config.reports.output_dir.clone(),
    ));
    let tracker_state = TrackerState {
        service,
        auth: Arc::new(config.auth.clone()),
    };

    let app = Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .with_state(state)
        .merge(tracker_router(tracker_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "candidate tracker ready");

    axum::serve(listener, app).await?;
    Ok(())
}

fn run_regenerate() -> Result<(), AppError> {
    let config = AppConfig::load()?;

    let store = Arc::new(JsonlCandidateStore::open(&config.storage.data_file)?);
    let regenerator = ReportRegenerator::new(store, config.reports.output_dir.clone());
    let summary = regenerator.regenerate()?;

    println!("Report regeneration complete");
    println!("- candidates scanned: {}", summary.candidates);
    println!("- artifacts written: {}", summary.artifacts_written);
    println!("- artifacts failed: {}", summary.artifacts_failed);
    println!("- output directory: {}", config.reports.output_dir.display());

    Ok(())
}

async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn readiness_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

async fn metrics_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
