// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

use anyhow::Result;
use axum::{http::StatusCode, routing::get, Router};
use clap::Parser;
use futures::StreamExt;
use k8s_openapi::api::core::v1::Node;
use kube::{
    runtime::{controller::Action, watcher::Config as WatcherConfig, Controller},
    Api, Client, ResourceExt,
};
use nodedns::{
    config::Config,
    constants::{
        CONFLICT_REQUEUE_DURATION_SECS, ERROR_REQUEUE_DURATION_SECS, HEALTH_SERVER_PATH,
        KIND_NODE, METRICS_SERVER_PATH, TOKIO_WORKER_THREADS,
    },
    context::Context,
    dns_errors::DnsError,
    metrics,
    nodes::KubeNodeStore,
    reconcilers::{reconcile_node, ReconcileError, ReconcileOutcome},
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

fn main() -> Result<()> {
    // Configuration is read exactly once, before anything else starts
    let config = Config::parse();

    // Build Tokio runtime with custom thread names
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(TOKIO_WORKER_THREADS)
        .thread_name("nodedns-controller")
        .enable_all()
        .build()?;

    runtime.block_on(async_main(config))
}

async fn async_main(config: Config) -> Result<()> {
    // Initialize logging with custom format
    // Format: timestamp file:line LEVEL message
    //
    // Respects RUST_LOG environment variable if set, otherwise defaults to INFO level
    // Example: RUST_LOG=debug cargo run
    //
    // Respects RUST_LOG_FORMAT environment variable for output format
    // Example: RUST_LOG_FORMAT=json cargo run
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let log_format = std::env::var("RUST_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    match log_format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .json()
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .with_ansi(true)
                .compact()
                .init();
        }
    }

    info!("Starting node DNS controller");

    let provider_settings = config.provider_settings()?;
    info!(provider = ?provider_settings, "DNS provider configured");
    let dns = config.build_provider()?;

    debug!("Initializing Kubernetes client");
    let client = Client::try_default().await?;
    debug!("Kubernetes client initialized successfully");

    let ctx = Arc::new(Context::new(
        Arc::new(KubeNodeStore::new(client.clone())),
        dns,
        config.resync_interval(),
    ));

    tokio::select! {
        () = run_node_controller(client, ctx) => {
            info!("Node controller stopped");
            Ok(())
        }
        result = run_metrics_server(config.metrics_addr) => {
            error!("CRITICAL: metrics server exited unexpectedly: {:?}", result);
            result?;
            anyhow::bail!("Metrics server exited unexpectedly without error")
        }
    }
}

/// Run the `Node` controller until a shutdown signal is received.
///
/// On SIGTERM / Ctrl-C the controller stops scheduling and drops in-flight
/// reconciliations, which aborts their outstanding HTTP and API calls.
async fn run_node_controller(client: Client, ctx: Arc<Context>) {
    info!("Starting Node controller");

    let api = Api::<Node>::all(client);

    Controller::new(api, WatcherConfig::default())
        .shutdown_on_signal()
        .run(reconcile_node_wrapper, error_policy, ctx)
        .for_each(|_| futures::future::ready(()))
        .await;
}

/// Reconcile wrapper for `Node`
async fn reconcile_node_wrapper(
    node: Arc<Node>,
    ctx: Arc<Context>,
) -> Result<Action, ReconcileError> {
    let start = Instant::now();
    let name = node.name_any();

    debug!(node = %name, "Reconcile wrapper called for Node");

    match reconcile_node(&ctx, &name).await {
        Ok(ReconcileOutcome::Done) => {
            debug!("Successfully reconciled Node: {}", name);
            metrics::record_reconciliation_success(KIND_NODE, start.elapsed());
            Ok(Action::requeue(ctx.resync_interval))
        }
        Ok(ReconcileOutcome::Requeue) => {
            metrics::record_reconciliation_requeue(KIND_NODE, "conflict", start.elapsed());
            Ok(Action::requeue(Duration::from_secs(
                CONFLICT_REQUEUE_DURATION_SECS,
            )))
        }
        Err(e) => {
            if let ReconcileError::Dns(DnsError::ProviderProtocol { .. }) = &e {
                warn!(
                    node = %name,
                    provider = ctx.dns.provider_name(),
                    "DNS provider returned an unexpected payload; its API contract may have changed: {}",
                    e
                );
            } else {
                error!(node = %name, error_class = e.error_class(), "Failed to reconcile Node: {}", e);
            }
            metrics::record_reconciliation_error(KIND_NODE, e.error_class(), start.elapsed());
            Err(e)
        }
    }
}

/// Error policy for controller
fn error_policy(_node: Arc<Node>, _err: &ReconcileError, _ctx: Arc<Context>) -> Action {
    Action::requeue(Duration::from_secs(ERROR_REQUEUE_DURATION_SECS))
}

/// Serve Prometheus metrics and a liveness endpoint
async fn run_metrics_server(addr: SocketAddr) -> Result<()> {
    let app = Router::new()
        .route(METRICS_SERVER_PATH, get(metrics_handler))
        .route(HEALTH_SERVER_PATH, get(|| async { "ok" }));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Metrics server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

async fn metrics_handler() -> Result<String, (StatusCode, String)> {
    metrics::gather_metrics().map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
}
