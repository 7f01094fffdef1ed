use std::sync::Arc;

use anyhow::Context;
use taskvisor::Subscribe;
use tracing::{error, info};

use tally_api::AgentHttpApi;
use tally_core::{SupervisorApi, hostname, init_uptime, platform};
use tally_discover::{RegisterConfig, register};
use tally_exec::{AgentConfig, ArithmeticEvaluator, LocalSolver};
use tally_observe::{LoggerConfig, TaskEvents, logger_init};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1) Logger
    logger_init(&LoggerConfig::from_env()?)?;
    init_uptime();

    // 2) Config
    let cfg = AgentConfig::from_env().context("agent config")?;
    info!(
        host = %hostname(),
        platform = platform(),
        capacity = cfg.max_concurrent_tasks,
        solve_delay_ms = cfg.solve_delay_ms,
        "agent starting"
    );

    // 3) Solver
    let solver = LocalSolver::new(Arc::new(ArithmeticEvaluator), cfg.max_concurrent_tasks)
        .with_delay(cfg.solve_delay());

    // 4) Bind before registering so the orchestrator can reach us right away
    let listener = tokio::net::TcpListener::bind(cfg.listen)
        .await
        .with_context(|| format!("bind {}", cfg.listen))?;
    info!("listening on {} as {}", cfg.listen, cfg.advertise_address);

    // 5) Registration
    let subscribers: Vec<Arc<dyn Subscribe>> = vec![Arc::new(TaskEvents)];
    let supervisor = SupervisorApi::new(subscribers).await?;
    let registered = solver.clone();
    let (task, policy) = register(
        RegisterConfig {
            endpoint: cfg.orchestrator_endpoint.clone(),
            address: cfg.advertise_address.clone(),
            retry_ms: cfg.register_retry_ms,
            timeout_ms: cfg.request_timeout_ms,
        },
        move |agent| registered.set_agent_id(agent.id),
    )?;
    supervisor.submit(task, &policy).await?;
    info!(orchestrator = %cfg.orchestrator_endpoint, "registration scheduled");
    info!("press Ctrl+C to stop");

    // 6) Serve
    axum::serve(listener, AgentHttpApi::new(solver).router())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("shutting down...");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for ctrl-c");
    }
}
