use std::sync::Arc;

use anyhow::Context;
use axum::{
    Router,
    extract::State,
    http::{StatusCode, header},
    response::IntoResponse,
    routing::get,
};
use taskvisor::Subscribe;
use tracing::{error, info};

use tally_api::{HttpApi, OrchestratorAdapter};
use tally_core::{
    AgentRegistry, AgentTransport, CompletionPoller, DispatchMetrics, Dispatcher,
    OrchestratorConfig, SupervisorApi, TaskStore, dispatch_loop, hostname, init_uptime,
    platform, poll_loop,
};
use tally_discover::HttpAgentTransport;
use tally_observe::{LoggerConfig, TaskEvents, logger_init};
use tally_prometheus::PrometheusMetrics;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1) Logger
    logger_init(&LoggerConfig::from_env()?)?;
    init_uptime();

    // 2) Config
    let cfg = OrchestratorConfig::from_env().context("orchestrator config")?;
    info!(
        host = %hostname(),
        platform = platform(),
        policy = ?cfg.queue_policy,
        probe = cfg.probe_agents,
        "orchestrator starting"
    );

    // 3) Shared state
    let store = TaskStore::with_limit(cfg.max_active_tasks);
    let registry = AgentRegistry::new();
    let metrics = PrometheusMetrics::new()?;
    let handle: Arc<dyn DispatchMetrics> = Arc::new(metrics.clone());
    let transport: Arc<dyn AgentTransport> =
        Arc::new(HttpAgentTransport::new(cfg.request_timeout())?);

    // 4) Periodic loops
    let dispatcher = Arc::new(
        Dispatcher::new(store.clone(), registry.clone(), Arc::clone(&transport))
            .with_policy(cfg.queue_policy)
            .with_probe(cfg.probe_agents)
            .with_metrics(Arc::clone(&handle)),
    );
    let poller = Arc::new(
        CompletionPoller::new(store.clone(), registry.clone(), transport)
            .with_metrics(Arc::clone(&handle)),
    );

    let subscribers: Vec<Arc<dyn Subscribe>> = vec![Arc::new(TaskEvents)];
    let supervisor = SupervisorApi::new(subscribers).await?;
    for (task, policy) in [
        dispatch_loop(dispatcher, cfg.dispatch_interval()),
        poll_loop(poller, cfg.poll_interval()),
    ] {
        supervisor.submit(task, &policy).await?;
    }
    info!("dispatch and poll loops submitted");

    // 5) HTTP surface
    let adapter = OrchestratorAdapter::new(store, registry).with_metrics(handle);
    let app = HttpApi::new(Arc::new(adapter)).router().merge(
        Router::new()
            .route("/metrics", get(serve_metrics))
            .with_state(metrics),
    );

    let listener = tokio::net::TcpListener::bind(cfg.listen)
        .await
        .with_context(|| format!("bind {}", cfg.listen))?;
    info!("listening on {}", cfg.listen);
    info!("press Ctrl+C to stop");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("shutting down...");
    Ok(())
}

async fn serve_metrics(State(metrics): State<PrometheusMetrics>) -> impl IntoResponse {
    match metrics.encode() {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        ),
        Err(e) => {
            error!(error = %e, "failed to encode metrics");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [(header::CONTENT_TYPE, "text/plain")],
                e.to_string(),
            )
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for ctrl-c");
    }
}
