use std::{
    collections::{HashMap, VecDeque},
    sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
    time::SystemTime,
};

use tally_model::{AgentId, AgentLoad, Task, TaskDuration, TaskId, TaskStatus};

use crate::error::CoreError;

/// Canonical task table and pending queue of the orchestrator.
///
/// Both structures live behind a single lock, so every operation that
/// touches the queue and the table at once (submit, placement) is atomic.
#[derive(Clone)]
pub struct TaskStore {
    inner: Arc<RwLock<TaskStoreInner>>,
}

struct TaskStoreInner {
    /// Tasks indexed by TaskId.
    tasks: HashMap<TaskId, Task>,
    /// Ids waiting for placement, head first.
    pending: VecDeque<TaskId>,
    /// Last id handed out.
    last_id: u64,
    /// Ceiling on pending + in-progress tasks.
    max_active: Option<usize>,
}

impl TaskStore {
    /// Create an empty store without an active-task ceiling.
    pub fn new() -> Self {
        Self::with_limit(None)
    }

    /// Create an empty store that rejects submissions beyond `max_active` active tasks.
    pub fn with_limit(max_active: Option<usize>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(TaskStoreInner {
                tasks: HashMap::new(),
                pending: VecDeque::new(),
                last_id: 0,
                max_active,
            })),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, TaskStoreInner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, TaskStoreInner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record a new `pending` task and append it to the queue.
    pub fn submit(&self, expression: impl Into<String>) -> Result<Task, CoreError> {
        let mut inner = self.write();

        if let Some(limit) = inner.max_active {
            let active = inner.tasks.values().filter(|t| t.status.is_active()).count();
            if active >= limit {
                return Err(CoreError::AtCapacity { limit });
            }
        }

        inner.last_id += 1;
        let task = Task::new(TaskId(inner.last_id), expression);

        inner.tasks.insert(task.id, task.clone());
        inner.pending.push_back(task.id);
        Ok(task)
    }

    /// Task at the head of the queue, without removing it.
    pub fn head(&self) -> Option<Task> {
        let inner = self.read();
        inner
            .pending
            .front()
            .and_then(|id| inner.tasks.get(id))
            .cloned()
    }

    /// Number of tasks waiting for placement.
    pub fn queue_len(&self) -> usize {
        self.read().pending.len()
    }

    /// Mark a queued task as accepted by `agent` and drop it from the queue.
    ///
    /// Fails if the task already left the queue, so a task can only be claimed once.
    pub fn mark_placed(&self, id: TaskId, agent: AgentId) -> Result<Task, CoreError> {
        let mut inner = self.write();

        let pos = inner
            .pending
            .iter()
            .position(|queued| *queued == id)
            .ok_or(CoreError::NotQueued(id))?;

        let task = inner.tasks.get_mut(&id).ok_or(CoreError::TaskNotFound(id))?;
        if !task.status.can_advance_to(TaskStatus::InProgress) {
            return Err(CoreError::InvalidTransition {
                id,
                from: task.status,
                to: TaskStatus::InProgress,
            });
        }
        task.status = TaskStatus::InProgress;
        task.agent_id = agent;
        let placed = task.clone();

        inner.pending.remove(pos);
        Ok(placed)
    }

    /// Move the head of the queue to the back. Returns the rotated id.
    pub fn rotate_head(&self) -> Option<TaskId> {
        let mut inner = self.write();
        if inner.pending.len() < 2 {
            return None;
        }
        let id = inner.pending.pop_front()?;
        inner.pending.push_back(id);
        Some(id)
    }

    /// Apply a terminal report pulled from an agent.
    ///
    /// Only `result`, `status` and `end_time` are taken from the report; identity
    /// fields stay as the orchestrator recorded them.
    pub fn complete(&self, report: &Task) -> Result<Task, CoreError> {
        let mut inner = self.write();

        let task = inner
            .tasks
            .get_mut(&report.id)
            .ok_or(CoreError::TaskNotFound(report.id))?;

        if !report.status.is_terminal() || !task.status.can_advance_to(report.status) {
            return Err(CoreError::InvalidTransition {
                id: report.id,
                from: task.status,
                to: report.status,
            });
        }

        task.status = report.status;
        task.result = report.result;
        task.end_time = Some(report.end_time.unwrap_or_else(SystemTime::now));
        Ok(task.clone())
    }

    /// Get task by ID.
    pub fn get(&self, id: TaskId) -> Option<Task> {
        self.read().tasks.get(&id).cloned()
    }

    /// Client pickup: returns the task and deletes it once it is terminal.
    ///
    /// Active tasks are returned as-is and stay in the table.
    pub fn take_result(&self, id: TaskId) -> Result<Task, CoreError> {
        let mut inner = self.write();

        let task = inner.tasks.get(&id).ok_or(CoreError::TaskNotFound(id))?;
        if !task.status.is_terminal() {
            return Ok(task.clone());
        }
        inner.tasks.remove(&id).ok_or(CoreError::TaskNotFound(id))
    }

    /// All tasks ordered by id.
    pub fn list_all(&self) -> Vec<Task> {
        let inner = self.read();
        let mut tasks: Vec<Task> = inner.tasks.values().cloned().collect();
        tasks.sort_by_key(|t| t.id);
        tasks
    }

    /// Tasks matching a status, ordered by id.
    pub fn list_by_status(&self, status: TaskStatus) -> Vec<Task> {
        let inner = self.read();
        let mut tasks: Vec<Task> = inner
            .tasks
            .values()
            .filter(|t| t.status == status)
            .cloned()
            .collect();
        tasks.sort_by_key(|t| t.id);
        tasks
    }

    /// Tasks currently held by some agent.
    pub fn in_flight(&self) -> Vec<Task> {
        self.list_by_status(TaskStatus::InProgress)
    }

    /// `(agent, task)` pairs for every in-progress task.
    pub fn agent_load(&self) -> Vec<AgentLoad> {
        self.in_flight()
            .into_iter()
            .map(|t| AgentLoad {
                agent_id: t.agent_id,
                task_id: t.id,
            })
            .collect()
    }

    /// Time in the system for every task that has not reached a terminal state.
    pub fn pending_durations(&self, now: SystemTime) -> Vec<TaskDuration> {
        let inner = self.read();
        let mut rows: Vec<TaskDuration> = inner
            .tasks
            .values()
            .filter(|t| t.status.is_active())
            .map(|t| TaskDuration {
                task_id: t.id,
                duration_secs: t.elapsed(now).as_secs(),
            })
            .collect();
        rows.sort_by_key(|r| r.task_id);
        rows
    }
}

impl Default for TaskStore {
    fn default() -> Self {
        Self::new()
    }
}
