use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex, MutexGuard, PoisonError,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use tally_model::{AgentId, Task, TaskId, TaskStatus};
use tracing::{debug, error, info, trace};

use crate::{error::SolveError, eval::Evaluator};

/// Agent-side task holder.
///
/// Accepts placements up to `capacity`, evaluates each accepted task on its
/// own tokio task and keeps the result until the orchestrator collects it.
/// Completed but uncollected tasks still count against capacity.
#[derive(Clone)]
pub struct LocalSolver {
    held: Arc<Mutex<HashMap<TaskId, Task>>>,
    evaluator: Arc<dyn Evaluator>,
    agent_id: Arc<AtomicU64>,
    capacity: usize,
    delay: Duration,
}

impl LocalSolver {
    pub fn new(evaluator: Arc<dyn Evaluator>, capacity: usize) -> Self {
        Self {
            held: Arc::new(Mutex::new(HashMap::new())),
            evaluator,
            agent_id: Arc::new(AtomicU64::new(0)),
            capacity,
            delay: Duration::ZERO,
        }
    }

    /// Artificial latency before each evaluation.
    #[inline]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<TaskId, Task>> {
        self.held.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Id assigned by the orchestrator at registration.
    pub fn agent_id(&self) -> AgentId {
        AgentId(self.agent_id.load(Ordering::Acquire))
    }

    pub fn set_agent_id(&self, id: AgentId) {
        self.agent_id.store(id.0, Ordering::Release);
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of tasks held, running or awaiting collection.
    pub fn held_count(&self) -> usize {
        self.lock().len()
    }

    /// Number of tasks still being evaluated.
    pub fn running_count(&self) -> usize {
        self.lock()
            .values()
            .filter(|t| t.status == TaskStatus::InProgress)
            .count()
    }

    pub fn get(&self, id: TaskId) -> Option<Task> {
        self.lock().get(&id).cloned()
    }

    /// Capacity gate. On success the task is stored `in_progress` and its
    /// evaluation is spawned; the returned copy is what the caller echoes back.
    ///
    /// Must be called from within a tokio runtime.
    pub fn accept(&self, mut task: Task) -> Result<Task, SolveError> {
        let mut held = self.lock();

        if let Some(existing) = held.get(&task.id) {
            debug!(task = %task.id, "placement repeated for a held task");
            return Ok(existing.clone());
        }
        if held.len() >= self.capacity {
            return Err(SolveError::AtCapacity {
                limit: self.capacity,
            });
        }

        let own = self.agent_id();
        if own.is_assigned() {
            task.agent_id = own;
        }
        task.status = TaskStatus::InProgress;
        task.result = 0.0;
        task.end_time = None;
        held.insert(task.id, task.clone());
        drop(held);

        info!(task = %task.id, expression = %task.expression, "task accepted");
        tokio::spawn(solve(
            Arc::clone(&self.held),
            Arc::clone(&self.evaluator),
            self.delay,
            task.id,
            task.expression.clone(),
        ));
        Ok(task)
    }

    /// Hand over a completed task and forget it.
    pub fn collect(&self, id: TaskId) -> Result<Task, SolveError> {
        let mut held = self.lock();

        let status = held.get(&id).map(|t| t.status);
        match status {
            None => Err(SolveError::NotFound(id)),
            Some(s) if !s.is_terminal() => Err(SolveError::NotReady(id)),
            Some(_) => {
                let task = held.remove(&id).ok_or(SolveError::NotFound(id))?;
                debug!(task = %id, status = %task.status, "task collected");
                Ok(task)
            }
        }
    }
}

async fn solve(
    held: Arc<Mutex<HashMap<TaskId, Task>>>,
    evaluator: Arc<dyn Evaluator>,
    delay: Duration,
    id: TaskId,
    expression: String,
) {
    if !delay.is_zero() {
        trace!(task = %id, delay_ms = delay.as_millis() as u64, "delaying evaluation");
        tokio::time::sleep(delay).await;
    }

    let name = evaluator.name();
    let outcome = tokio::task::spawn_blocking(move || evaluator.evaluate(&expression))
        .await
        .map_err(|e| e.to_string())
        .and_then(|r| r.map_err(|e| e.to_string()));

    let mut held = held.lock().unwrap_or_else(PoisonError::into_inner);
    let Some(task) = held.get_mut(&id) else {
        error!(task = %id, "evaluated task disappeared before completion");
        return;
    };
    match outcome {
        Ok(value) => {
            task.finish(value);
            info!(task = %id, evaluator = name, result = value, "task finished");
        }
        Err(reason) => {
            task.fail();
            info!(task = %id, evaluator = name, %reason, "task failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::ArithmeticEvaluator;

    fn solver(capacity: usize) -> LocalSolver {
        LocalSolver::new(Arc::new(ArithmeticEvaluator), capacity)
    }

    async fn wait_terminal(solver: &LocalSolver, id: TaskId) -> Task {
        for _ in 0..400 {
            if let Some(t) = solver.get(id)
                && t.is_terminal()
            {
                return t;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("task {id} did not finish");
    }

    #[tokio::test]
    async fn accept_tags_in_progress_with_own_id() {
        let s = solver(1);
        s.set_agent_id(AgentId(3));

        let copy = s.accept(Task::new(TaskId(1), "1+6")).unwrap();
        assert_eq!(copy.status, TaskStatus::InProgress);
        assert_eq!(copy.agent_id, AgentId(3));
    }

    #[tokio::test]
    async fn finished_result_is_collected_once() {
        let s = solver(1);
        s.accept(Task::new(TaskId(1), "1+6")).unwrap();

        let done = wait_terminal(&s, TaskId(1)).await;
        assert_eq!(done.status, TaskStatus::Finished);
        assert_eq!(done.result, 7.0);
        assert!(done.end_time.is_some());

        let collected = s.collect(TaskId(1)).unwrap();
        assert_eq!(collected.result, 7.0);
        assert_eq!(s.collect(TaskId(1)), Err(SolveError::NotFound(TaskId(1))));
        assert_eq!(s.held_count(), 0);
    }

    #[tokio::test]
    async fn malformed_expression_ends_in_error() {
        let s = solver(1);
        s.accept(Task::new(TaskId(9), "1+")).unwrap();

        let done = wait_terminal(&s, TaskId(9)).await;
        assert_eq!(done.status, TaskStatus::Error);
        assert_eq!(done.result, 0.0);
        assert!(done.end_time.is_some());
    }

    #[tokio::test]
    async fn deeply_nested_expression_ends_in_error() {
        let s = solver(1);
        s.accept(Task::new(TaskId(1), "(".repeat(200_000))).unwrap();

        let done = wait_terminal(&s, TaskId(1)).await;
        assert_eq!(done.status, TaskStatus::Error);
        assert_eq!(done.result, 0.0);

        s.collect(TaskId(1)).unwrap();
        s.accept(Task::new(TaskId(2), "2*3")).unwrap();
        assert_eq!(wait_terminal(&s, TaskId(2)).await.result, 6.0);
    }

    #[tokio::test]
    async fn running_task_is_not_ready() {
        let s = solver(1).with_delay(Duration::from_secs(30));
        s.accept(Task::new(TaskId(1), "2*2")).unwrap();

        assert_eq!(s.collect(TaskId(1)), Err(SolveError::NotReady(TaskId(1))));
        assert_eq!(s.running_count(), 1);
    }

    #[tokio::test]
    async fn capacity_gate_counts_uncollected_results() {
        let s = solver(2);
        s.accept(Task::new(TaskId(1), "1")).unwrap();
        s.accept(Task::new(TaskId(2), "2")).unwrap();
        assert_eq!(
            s.accept(Task::new(TaskId(3), "3")),
            Err(SolveError::AtCapacity { limit: 2 })
        );

        wait_terminal(&s, TaskId(1)).await;
        wait_terminal(&s, TaskId(2)).await;
        assert!(s.accept(Task::new(TaskId(3), "3")).is_err());
        assert!(s.held_count() <= s.capacity());

        s.collect(TaskId(1)).unwrap();
        assert!(s.accept(Task::new(TaskId(3), "3")).is_ok());
    }

    #[tokio::test]
    async fn repeated_placement_is_idempotent() {
        let s = solver(2).with_delay(Duration::from_secs(30));
        s.accept(Task::new(TaskId(5), "5")).unwrap();
        let again = s.accept(Task::new(TaskId(5), "5")).unwrap();

        assert_eq!(again.status, TaskStatus::InProgress);
        assert_eq!(s.held_count(), 1);
    }

    #[tokio::test]
    async fn zero_capacity_rejects_everything() {
        let s = solver(0);
        assert!(matches!(
            s.accept(Task::new(TaskId(1), "1")),
            Err(SolveError::AtCapacity { limit: 0 })
        ));
    }
}
