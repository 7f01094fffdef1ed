use std::{
    collections::BTreeMap,
    sync::{Arc, PoisonError, RwLock},
};

use tally_model::{Agent, AgentId};
use tracing::debug;

use crate::error::CoreError;

/// Append-only set of agents known to the orchestrator.
///
/// There is no removal: an agent that goes away stays registered and is
/// skipped by the dispatch loop when it fails liveness or rejects work.
#[derive(Clone, Default)]
pub struct AgentRegistry {
    inner: Arc<RwLock<RegistryInner>>,
}

#[derive(Default)]
struct RegistryInner {
    agents: BTreeMap<AgentId, Agent>,
    last_id: u64,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a new agent under the next free id.
    ///
    /// The same address may register more than once; each call yields a distinct agent.
    pub fn register(&self, address: &str) -> Result<Agent, CoreError> {
        Agent::validate_address(address)?;

        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        inner.last_id += 1;
        let agent = Agent::new(AgentId(inner.last_id), address.trim());
        inner.agents.insert(agent.id, agent.clone());

        debug!(agent = %agent.id, address = %agent.address, "agent registered");
        Ok(agent)
    }

    /// Snapshot of all agents, ordered by id.
    pub fn list(&self) -> Vec<Agent> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner.agents.values().cloned().collect()
    }

    pub fn get(&self, id: AgentId) -> Option<Agent> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner.agents.get(&id).cloned()
    }

    pub fn len(&self) -> usize {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .agents
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_assigns_increasing_ids() {
        let registry = AgentRegistry::new();
        let a = registry.register("http://127.0.0.1:8081").unwrap();
        let b = registry.register("http://127.0.0.1:8082").unwrap();

        assert_eq!(a.id, AgentId(1));
        assert_eq!(b.id, AgentId(2));
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get(b.id).unwrap().address, "http://127.0.0.1:8082");
    }

    #[test]
    fn same_address_registers_twice() {
        let registry = AgentRegistry::new();
        let a = registry.register("http://host:1").unwrap();
        let b = registry.register("http://host:1").unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(registry.list().len(), 2);
    }

    #[test]
    fn malformed_address_is_rejected() {
        let registry = AgentRegistry::new();
        assert!(matches!(
            registry.register("not a url"),
            Err(CoreError::Invalid(_))
        ));
        assert!(registry.is_empty());
    }
}
