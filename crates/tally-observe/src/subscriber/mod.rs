//! Supervisor event logging.
//!
//! [`TaskEvents`] forwards taskvisor lifecycle events for the dispatch,
//! poll and registration tasks into `tracing`.

mod view;
pub use view::{View, describe, log_event};

use async_trait::async_trait;
use taskvisor::{Event, Subscribe};

#[derive(Debug, Default, Clone, Copy)]
pub struct TaskEvents;

#[async_trait]
impl Subscribe for TaskEvents {
    async fn on_event(&self, event: &Event) {
        log_event(event);
    }

    fn name(&self) -> &'static str {
        "tally-events"
    }

    fn queue_capacity(&self) -> usize {
        1024
    }
}
