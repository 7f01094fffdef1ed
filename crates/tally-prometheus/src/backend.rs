use prometheus::{
    Encoder, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
    proto::MetricFamily,
};
use tally_core::DispatchMetrics;
use tally_model::TaskStatus;

#[derive(Clone)]
pub struct PrometheusMetrics {
    registry: Registry,
    submitted: IntCounter,
    placed: IntCounter,
    rejected: IntCounter,
    completed: IntCounterVec,
    queue_depth: IntGauge,
}

impl PrometheusMetrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let submitted = IntCounter::new(
            "tally_tasks_submitted_total",
            "Expressions accepted from clients",
        )?;
        let placed = IntCounter::new(
            "tally_tasks_placed_total",
            "Tasks accepted by an agent",
        )?;
        let rejected = IntCounter::new(
            "tally_placements_rejected_total",
            "Placement offers declined by an agent",
        )?;
        let completed = IntCounterVec::new(
            Opts::new(
                "tally_tasks_completed_total",
                "Terminal results pulled from agents",
            ),
            &["status"],
        )?;
        let queue_depth = IntGauge::new("tally_queue_depth", "Tasks waiting for placement")?;

        registry.register(Box::new(submitted.clone()))?;
        registry.register(Box::new(placed.clone()))?;
        registry.register(Box::new(rejected.clone()))?;
        registry.register(Box::new(completed.clone()))?;
        registry.register(Box::new(queue_depth.clone()))?;

        Ok(Self {
            registry,
            submitted,
            placed,
            rejected,
            completed,
            queue_depth,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn gather(&self) -> Vec<MetricFamily> {
        self.registry.gather()
    }

    /// Current values in the Prometheus text exposition format.
    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

impl DispatchMetrics for PrometheusMetrics {
    fn record_submitted(&self) {
        self.submitted.inc();
    }

    fn record_placed(&self) {
        self.placed.inc();
    }

    fn record_rejected(&self) {
        self.rejected.inc();
    }

    fn record_completed(&self, status: TaskStatus) {
        self.completed.with_label_values(&[status.as_str()]).inc();
    }

    fn set_queue_depth(&self, depth: usize) {
        self.queue_depth.set(depth as i64);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_show_up_in_text_output() {
        let m = PrometheusMetrics::new().unwrap();
        m.record_submitted();
        m.record_submitted();
        m.record_placed();
        m.record_rejected();
        m.record_completed(TaskStatus::Finished);
        m.record_completed(TaskStatus::Error);
        m.set_queue_depth(3);

        let text = m.encode().unwrap();
        assert!(text.contains("tally_tasks_submitted_total 2"));
        assert!(text.contains("tally_tasks_placed_total 1"));
        assert!(text.contains("tally_placements_rejected_total 1"));
        assert!(text.contains(r#"tally_tasks_completed_total{status="finished"} 1"#));
        assert!(text.contains(r#"tally_tasks_completed_total{status="error"} 1"#));
        assert!(text.contains("tally_queue_depth 3"));
    }

    #[test]
    fn instances_do_not_share_series() {
        let a = PrometheusMetrics::new().unwrap();
        let b = PrometheusMetrics::new().unwrap();
        a.record_placed();

        assert!(b.encode().unwrap().contains("tally_tasks_placed_total 0"));
    }
}
