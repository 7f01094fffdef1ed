//! In-memory agents for exercising the loops without a network.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use tally_model::{Agent, AgentId, Task, TaskId, TaskStatus};

use crate::{
    error::TransportError,
    transport::{AgentTransport, Collection, Placement},
};

#[derive(Default)]
struct FakeAgent {
    capacity: usize,
    down: bool,
    held: HashMap<TaskId, Task>,
    offers: usize,
}

#[derive(Clone, Default)]
pub struct FakeTransport {
    agents: Arc<Mutex<HashMap<AgentId, FakeAgent>>>,
}

impl FakeTransport {
    pub fn add(&self, id: AgentId, capacity: usize) {
        self.agents.lock().unwrap().insert(
            id,
            FakeAgent {
                capacity,
                ..Default::default()
            },
        );
    }

    pub fn set_down(&self, id: AgentId, down: bool) {
        self.agents.lock().unwrap().get_mut(&id).unwrap().down = down;
    }

    pub fn finish(&self, id: AgentId, task: TaskId, result: Option<f64>) {
        let mut agents = self.agents.lock().unwrap();
        let held = agents.get_mut(&id).unwrap().held.get_mut(&task).unwrap();
        match result {
            Some(r) => held.finish(r),
            None => held.fail(),
        }
    }

    pub fn held(&self, id: AgentId) -> Vec<TaskId> {
        let agents = self.agents.lock().unwrap();
        let mut ids: Vec<TaskId> = agents[&id].held.keys().copied().collect();
        ids.sort();
        ids
    }

    pub fn offers(&self, id: AgentId) -> usize {
        self.agents.lock().unwrap()[&id].offers
    }
}

fn unreachable(agent: &Agent) -> TransportError {
    TransportError::Unreachable {
        agent: agent.id,
        reason: "connection refused".into(),
    }
}

#[async_trait]
impl AgentTransport for FakeTransport {
    async fn probe(&self, agent: &Agent) -> Result<(), TransportError> {
        let agents = self.agents.lock().unwrap();
        match agents.get(&agent.id) {
            Some(a) if !a.down => Ok(()),
            _ => Err(unreachable(agent)),
        }
    }

    async fn place(&self, agent: &Agent, task: &Task) -> Result<Placement, TransportError> {
        let mut agents = self.agents.lock().unwrap();
        let a = match agents.get_mut(&agent.id) {
            Some(a) if !a.down => a,
            _ => return Err(unreachable(agent)),
        };
        a.offers += 1;
        if a.held.len() >= a.capacity {
            return Ok(Placement::Rejected("at capacity".into()));
        }
        let mut copy = task.clone();
        copy.status = TaskStatus::InProgress;
        copy.agent_id = agent.id;
        a.held.insert(copy.id, copy.clone());
        Ok(Placement::Accepted(copy))
    }

    async fn collect(&self, agent: &Agent, id: TaskId) -> Result<Collection, TransportError> {
        let mut agents = self.agents.lock().unwrap();
        let a = match agents.get_mut(&agent.id) {
            Some(a) if !a.down => a,
            _ => return Err(unreachable(agent)),
        };
        let status = a.held.get(&id).map(|t| t.status);
        match status {
            None => Ok(Collection::Missing),
            Some(s) if !s.is_terminal() => Ok(Collection::Running),
            Some(_) => Ok(a.held.remove(&id).map_or(Collection::Missing, Collection::Ready)),
        }
    }
}
