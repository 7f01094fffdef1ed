use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::trace;

use tally_core::{AgentTransport, Collection, Placement, TransportError};
use tally_model::{Agent, Liveness, Task, TaskId};

use crate::errors::DiscoverError;

/// [`AgentTransport`] over the agent HTTP surface.
///
/// Every request is bounded by the client timeout, so an unreachable agent
/// costs at most one timeout per call.
#[derive(Debug, Clone)]
pub struct HttpAgentTransport {
    client: reqwest::Client,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

impl HttpAgentTransport {
    pub fn new(timeout: Duration) -> Result<Self, DiscoverError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    fn unreachable(agent: &Agent, e: reqwest::Error) -> TransportError {
        TransportError::Unreachable {
            agent: agent.id,
            reason: e.to_string(),
        }
    }

    fn invalid(agent: &Agent, reason: impl Into<String>) -> TransportError {
        TransportError::InvalidResponse {
            agent: agent.id,
            reason: reason.into(),
        }
    }

    async fn error_text(response: reqwest::Response) -> String {
        let body = response.text().await.unwrap_or_default();
        serde_json::from_str::<ErrorBody>(&body)
            .map(|b| b.error)
            .unwrap_or(body)
    }
}

#[async_trait]
impl AgentTransport for HttpAgentTransport {
    async fn probe(&self, agent: &Agent) -> Result<(), TransportError> {
        let response = self
            .client
            .get(agent.url("/api/v1/alive"))
            .send()
            .await
            .map_err(|e| Self::unreachable(agent, e))?;

        if !response.status().is_success() {
            return Err(Self::invalid(agent, format!("status {}", response.status())));
        }
        let liveness: Liveness = response
            .json()
            .await
            .map_err(|e| Self::invalid(agent, e.to_string()))?;
        if !liveness.is_alive() {
            return Err(Self::invalid(agent, format!("status '{}'", liveness.status)));
        }
        Ok(())
    }

    async fn place(&self, agent: &Agent, task: &Task) -> Result<Placement, TransportError> {
        trace!(agent = %agent.id, task = %task.id, "offering task");
        let response = self
            .client
            .post(agent.url("/api/v1/tasks"))
            .json(task)
            .send()
            .await
            .map_err(|e| Self::unreachable(agent, e))?;

        match response.status() {
            StatusCode::OK | StatusCode::CREATED | StatusCode::ACCEPTED => {
                let accepted: Task = response
                    .json()
                    .await
                    .map_err(|e| Self::invalid(agent, e.to_string()))?;
                if accepted.id != task.id {
                    return Err(Self::invalid(
                        agent,
                        format!("accepted task {} instead of {}", accepted.id, task.id),
                    ));
                }
                Ok(Placement::Accepted(accepted))
            }
            StatusCode::SERVICE_UNAVAILABLE | StatusCode::BAD_REQUEST => {
                Ok(Placement::Rejected(Self::error_text(response).await))
            }
            other => Err(Self::invalid(agent, format!("status {}", other))),
        }
    }

    async fn collect(&self, agent: &Agent, id: TaskId) -> Result<Collection, TransportError> {
        let response = self
            .client
            .post(agent.url(&format!("/api/v1/tasks/{}/collect", id)))
            .send()
            .await
            .map_err(|e| Self::unreachable(agent, e))?;

        match response.status() {
            StatusCode::OK => {
                let task: Task = response
                    .json()
                    .await
                    .map_err(|e| Self::invalid(agent, e.to_string()))?;
                if task.id != id || !task.is_terminal() {
                    return Err(Self::invalid(
                        agent,
                        format!("task {} returned as {}", task.id, task.status),
                    ));
                }
                Ok(Collection::Ready(task))
            }
            StatusCode::CONFLICT => Ok(Collection::Running),
            StatusCode::NOT_FOUND => Ok(Collection::Missing),
            other => Err(Self::invalid(agent, format!("status {}", other))),
        }
    }
}
