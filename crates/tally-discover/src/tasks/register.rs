use std::sync::Arc;

use taskvisor::{TaskError, TaskFn, TaskRef};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use tally_core::TaskPolicy;
use tally_model::{Agent, RegisterAgent};

use crate::config::RegisterConfig;
use crate::errors::DiscoverError;

const SLOT: &str = "tally-register";

/// Build the registration task for the supervisor.
///
/// A failed attempt is retried every `retry_ms`; the first success hands
/// the assigned identity to `on_registered` and the task ends.
pub fn register<F>(
    config: RegisterConfig,
    on_registered: F,
) -> Result<(TaskRef, TaskPolicy), DiscoverError>
where
    F: Fn(Agent) + Send + Sync + 'static,
{
    let client = reqwest::Client::builder()
        .timeout(config.timeout())
        .build()?;
    let policy = TaskPolicy::until_success(SLOT, config.retry()).with_timeout(config.timeout() * 2);
    let config = Arc::new(config);
    let on_registered = Arc::new(on_registered);

    let task: TaskRef = TaskFn::arc(SLOT, move |ctx: CancellationToken| {
        let client = client.clone();
        let config = Arc::clone(&config);
        let on_registered = Arc::clone(&on_registered);

        async move {
            if ctx.is_cancelled() {
                return Err(TaskError::Canceled);
            }
            debug!(endpoint = %config.endpoint, "sending registration request");

            match register_once(&client, &config).await {
                Ok(agent) => {
                    info!(agent = %agent.id, address = %agent.address, "registered with orchestrator");
                    on_registered(agent);
                    Ok(())
                }
                Err(e) => {
                    warn!("registration failed: {}", e);
                    Err(TaskError::Fail {
                        reason: format!("registration failed: {}", e),
                    })
                }
            }
        }
    });
    Ok((task, policy))
}

/// One registration round trip.
pub async fn register_once(
    client: &reqwest::Client,
    cfg: &RegisterConfig,
) -> Result<Agent, DiscoverError> {
    let request = RegisterAgent {
        address: cfg.address.clone(),
    };

    let response = client
        .post(format!("{}/api/v1/agents", cfg.endpoint.trim_end_matches('/')))
        .json(&request)
        .send()
        .await?;

    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(DiscoverError::Rejected {
            status: status.as_u16(),
            body,
        });
    }

    let agent: Agent = serde_json::from_str(&body).map_err(|e| {
        DiscoverError::InvalidResponse(format!("failed to parse response: {}, body: {}", e, body))
    })?;
    if !agent.id.is_assigned() {
        return Err(DiscoverError::InvalidResponse(format!(
            "orchestrator assigned no id: {}",
            body
        )));
    }
    Ok(agent)
}
