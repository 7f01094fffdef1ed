//! Supervised background tasks.
//!
//! The dispatch loop, the completion poller and agent registration all run as
//! taskvisor tasks. Each one does a single round per run; the restart policy
//! decides when the supervisor starts the next round.

use std::{sync::Arc, time::Duration};

use taskvisor::{
    BackoffPolicy, ControllerConfig, ControllerSpec, JitterPolicy,
    RestartPolicy, Subscribe, Supervisor, SupervisorConfig, TaskRef, TaskSpec,
};
use tracing::{debug, info, instrument};

use crate::error::CoreError;

/// When the supervisor starts a task again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Restart {
    /// Run again `every` after each run, successful or not.
    Periodic { every: Duration },
    /// Run again after a failed run only; success ends the task.
    UntilSuccess { retry: Duration },
}

/// Scheduling for one supervised task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskPolicy {
    pub slot: &'static str,
    pub restart: Restart,
    /// Deadline for a single run; `None` leaves runs unbounded.
    pub timeout: Option<Duration>,
}

impl TaskPolicy {
    /// A loop that runs every `every`.
    pub fn periodic(slot: &'static str, every: Duration) -> Self {
        Self {
            slot,
            restart: Restart::Periodic { every },
            timeout: None,
        }
    }

    /// A one-shot job retried every `retry` until a run succeeds.
    pub fn until_success(slot: &'static str, retry: Duration) -> Self {
        Self {
            slot,
            restart: Restart::UntilSuccess { retry },
            timeout: None,
        }
    }

    #[inline]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Pause between a failed run and the next attempt.
    pub fn retry_delay(&self) -> Duration {
        match self.restart {
            Restart::Periodic { every } => every,
            Restart::UntilSuccess { retry } => retry,
        }
    }

    fn to_task_spec(&self, task: TaskRef) -> TaskSpec {
        let restart = match self.restart {
            Restart::Periodic { every } => RestartPolicy::Always {
                interval: Some(every),
            },
            Restart::UntilSuccess { .. } => RestartPolicy::OnFailure,
        };
        let delay = self.retry_delay();
        let backoff = BackoffPolicy {
            first: delay,
            max: delay,
            factor: 1.0,
            jitter: JitterPolicy::None,
        };
        TaskSpec::new(task, restart, backoff, self.timeout)
    }
}

/// Handle to a running taskvisor supervisor.
#[derive(Clone)]
pub struct SupervisorApi {
    sup: Arc<Supervisor>,
}

impl SupervisorApi {
    /// Start a supervisor in the background and wait until it accepts tasks.
    pub async fn new(subscribers: Vec<Arc<dyn Subscribe>>) -> Result<Self, CoreError> {
        let sup = Supervisor::builder(SupervisorConfig::default())
            .with_controller(ControllerConfig::default())
            .with_subscribers(subscribers)
            .build();

        let runner = Arc::clone(&sup);
        tokio::spawn(async move {
            let _ = runner.run(Vec::new()).await;
        });
        sup.wait_ready().await;

        info!("supervisor is ready");
        Ok(Self { sup })
    }

    /// Hand `task` to the supervisor, replacing whatever runs in the same slot.
    #[instrument(level = "debug", skip(self, task), fields(slot = policy.slot))]
    pub async fn submit(&self, task: TaskRef, policy: &TaskPolicy) -> Result<(), CoreError> {
        let spec = ControllerSpec::replace(policy.to_task_spec(task));

        debug!(restart = ?policy.restart, "submitting via controller");
        self.sup
            .submit(spec)
            .await
            .map_err(|e| CoreError::Supervisor(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use taskvisor::{TaskError, TaskFn};
    use tokio_util::sync::CancellationToken;

    fn counting(slot: &'static str, counter: Arc<AtomicUsize>, fail_first: usize) -> TaskRef {
        TaskFn::arc(slot, move |ctx: CancellationToken| {
            let counter = Arc::clone(&counter);
            async move {
                if ctx.is_cancelled() {
                    return Err(TaskError::Canceled);
                }
                if counter.fetch_add(1, Ordering::SeqCst) < fail_first {
                    return Err(TaskError::Fail {
                        reason: "not yet".into(),
                    });
                }
                Ok(())
            }
        })
    }

    async fn wait_for(counter: &AtomicUsize, at_least: usize) {
        for _ in 0..400 {
            if counter.load(Ordering::SeqCst) >= at_least {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("counter stuck at {}", counter.load(Ordering::SeqCst));
    }

    #[test]
    fn policy_delays() {
        let p = TaskPolicy::periodic("dispatch", Duration::from_millis(250));
        assert_eq!(p.retry_delay(), Duration::from_millis(250));
        assert_eq!(p.timeout, None);

        let r = TaskPolicy::until_success("register", Duration::from_secs(2))
            .with_timeout(Duration::from_secs(4));
        assert_eq!(r.restart, Restart::UntilSuccess { retry: Duration::from_secs(2) });
        assert_eq!(r.timeout, Some(Duration::from_secs(4)));
    }

    #[tokio::test]
    async fn periodic_task_keeps_running() {
        let sup = SupervisorApi::new(Vec::new()).await.unwrap();
        let runs = Arc::new(AtomicUsize::new(0));

        let policy = TaskPolicy::periodic("counter", Duration::from_millis(10));
        sup.submit(counting("counter", Arc::clone(&runs), 0), &policy)
            .await
            .unwrap();

        wait_for(&runs, 3).await;
    }

    #[tokio::test]
    async fn failed_runs_are_retried_until_success() {
        let sup = SupervisorApi::new(Vec::new()).await.unwrap();
        let runs = Arc::new(AtomicUsize::new(0));

        let policy = TaskPolicy::until_success("flaky", Duration::from_millis(10));
        sup.submit(counting("flaky", Arc::clone(&runs), 2), &policy)
            .await
            .unwrap();

        wait_for(&runs, 3).await;
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 3);
    }
}
