use std::{sync::Arc, time::Duration};

use taskvisor::{TaskError, TaskFn, TaskRef};
use tokio_util::sync::CancellationToken;
use tracing::trace;

use crate::{
    dispatch::Dispatcher,
    poller::CompletionPoller,
    supervisor::TaskPolicy,
};

const DISPATCH_SLOT: &str = "tally-dispatch";
const POLL_SLOT: &str = "tally-poll";

/// One dispatch tick per run, restarted every `every`.
pub fn dispatch_loop(dispatcher: Arc<Dispatcher>, every: Duration) -> (TaskRef, TaskPolicy) {
    let task: TaskRef = TaskFn::arc(DISPATCH_SLOT, move |ctx: CancellationToken| {
        let dispatcher = Arc::clone(&dispatcher);

        async move {
            if ctx.is_cancelled() {
                return Err(TaskError::Canceled);
            }
            let outcome = dispatcher.tick().await;
            trace!(?outcome, "dispatch tick");
            Ok(())
        }
    });
    (task, TaskPolicy::periodic(DISPATCH_SLOT, every))
}

/// One completion poll per run, restarted every `every`.
pub fn poll_loop(poller: Arc<CompletionPoller>, every: Duration) -> (TaskRef, TaskPolicy) {
    let task: TaskRef = TaskFn::arc(POLL_SLOT, move |ctx: CancellationToken| {
        let poller = Arc::clone(&poller);

        async move {
            if ctx.is_cancelled() {
                return Err(TaskError::Canceled);
            }
            let report = poller.tick().await;
            trace!(?report, "poll tick");
            Ok(())
        }
    });
    (task, TaskPolicy::periodic(POLL_SLOT, every))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_model::TaskStatus;

    use crate::{
        registry::AgentRegistry, store::TaskStore, supervisor::SupervisorApi,
        testing::FakeTransport, transport::AgentTransport,
    };

    #[tokio::test]
    async fn loops_move_tasks_to_completion() {
        let store = TaskStore::new();
        let registry = AgentRegistry::new();
        let transport = FakeTransport::default();
        let agent = registry.register("http://127.0.0.1:9000").unwrap();
        transport.add(agent.id, 1);

        let shared: Arc<dyn AgentTransport> = Arc::new(transport.clone());
        let dispatcher = Arc::new(Dispatcher::new(
            store.clone(),
            registry.clone(),
            Arc::clone(&shared),
        ));
        let poller = Arc::new(CompletionPoller::new(store.clone(), registry, shared));

        let sup = SupervisorApi::new(Vec::new()).await.unwrap();
        let (task, policy) = dispatch_loop(dispatcher, Duration::from_millis(10));
        assert_eq!(policy.slot, DISPATCH_SLOT);
        sup.submit(task, &policy).await.unwrap();
        let (task, policy) = poll_loop(poller, Duration::from_millis(10));
        sup.submit(task, &policy).await.unwrap();

        let id = store.submit("1+1").unwrap().id;
        for _ in 0..400 {
            if transport.held(agent.id).contains(&id) {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        transport.finish(agent.id, id, Some(2.0));

        for _ in 0..400 {
            if store.get(id).is_some_and(|t| t.status == TaskStatus::Finished) {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        let done = store.get(id).unwrap();
        assert_eq!(done.status, TaskStatus::Finished);
        assert_eq!(done.result, 2.0);
        assert_eq!(done.agent_id, agent.id);
    }
}
