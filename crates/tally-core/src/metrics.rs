use tally_model::TaskStatus;

/// Hooks for counting dispatch activity.
///
/// The orchestrator calls these from its handlers and loops; backends such as
/// `tally-prometheus` turn them into exported series.
pub trait DispatchMetrics: Send + Sync + 'static {
    fn record_submitted(&self);
    fn record_placed(&self);
    fn record_rejected(&self);
    fn record_completed(&self, status: TaskStatus);
    fn set_queue_depth(&self, depth: usize);
}

/// Backend that drops everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopMetrics;

impl DispatchMetrics for NoopMetrics {
    fn record_submitted(&self) {}
    fn record_placed(&self) {}
    fn record_rejected(&self) {}
    fn record_completed(&self, _status: TaskStatus) {}
    fn set_queue_depth(&self, _depth: usize) {}
}
