use std::borrow::Borrow;

use taskvisor::{Event, EventKind};
use tracing::{debug, error, info, trace, warn};

/// Read-only accessors over a supervisor event.
pub trait View {
    fn task(&self) -> &str;
    fn reason(&self) -> Option<&str>;
    fn attempt(&self) -> u32;
    fn delay_ms(&self) -> u32;
    fn timeout_ms(&self) -> u32;
    fn kind(&self) -> EventKind;
}

impl<T> View for T
where
    T: Borrow<Event>,
{
    #[inline]
    fn task(&self) -> &str {
        self.borrow().task.as_deref().unwrap_or("unknown")
    }
    #[inline]
    fn reason(&self) -> Option<&str> {
        self.borrow().reason.as_deref()
    }
    #[inline]
    fn attempt(&self) -> u32 {
        self.borrow().attempt.unwrap_or(0)
    }
    #[inline]
    fn delay_ms(&self) -> u32 {
        self.borrow().delay_ms.unwrap_or(0)
    }
    #[inline]
    fn timeout_ms(&self) -> u32 {
        self.borrow().timeout_ms.unwrap_or(0)
    }
    #[inline]
    fn kind(&self) -> EventKind {
        self.borrow().kind
    }
}

/// Short human text for an event kind.
pub fn describe(kind: EventKind) -> &'static str {
    match kind {
        EventKind::TaskAdded => "background task registered",
        EventKind::TaskRemoved => "background task removed",
        EventKind::TaskStarting => "run starting",
        EventKind::TaskStopped => "run completed",
        EventKind::TaskFailed => "run failed",
        EventKind::TimeoutHit => "run exceeded its deadline",
        EventKind::BackoffScheduled => "next run scheduled",
        EventKind::ActorExhausted => "task finished for good",
        EventKind::ActorDead => "task stopped after a fatal error",
        EventKind::ShutdownRequested => "shutdown requested",
        EventKind::AllStoppedWithinGrace => "background tasks stopped",
        EventKind::GraceExceeded => "background tasks did not stop in time",
        EventKind::SubscriberOverflow => "event dropped, subscriber queue full",
        EventKind::SubscriberPanicked => "event subscriber panicked",
        EventKind::ControllerRejected => "task submission rejected",
        _ => "supervisor event",
    }
}

/// Log `e` at a level that keeps once-a-second loops quiet.
pub fn log_event<E: View>(e: E) {
    let msg = describe(e.kind());

    match e.kind() {
        EventKind::TaskStarting | EventKind::TaskStopped => {
            trace!(task = e.task(), attempt = e.attempt(), "{msg}")
        }
        EventKind::BackoffScheduled => match e.reason() {
            Some(reason) => debug!(
                task = e.task(),
                attempt = e.attempt(),
                delay_ms = e.delay_ms(),
                reason,
                "retry scheduled after failure"
            ),
            None => trace!(task = e.task(), delay_ms = e.delay_ms(), "{msg}"),
        },
        EventKind::TaskFailed => warn!(
            task = e.task(),
            attempt = e.attempt(),
            reason = e.reason().unwrap_or("unknown"),
            "{msg}"
        ),
        EventKind::TimeoutHit => {
            warn!(task = e.task(), timeout_ms = e.timeout_ms(), "{msg}")
        }
        EventKind::TaskAdded | EventKind::ActorExhausted => debug!(task = e.task(), "{msg}"),
        EventKind::ShutdownRequested | EventKind::AllStoppedWithinGrace => info!("{msg}"),
        EventKind::GraceExceeded | EventKind::ControllerRejected => {
            warn!(task = e.task(), reason = e.reason().unwrap_or("unknown"), "{msg}")
        }
        EventKind::ActorDead | EventKind::SubscriberOverflow | EventKind::SubscriberPanicked => {
            error!(task = e.task(), reason = e.reason().unwrap_or("unknown"), "{msg}")
        }
        _ => trace!(task = e.task(), "{msg}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loop_events_have_descriptions() {
        assert_eq!(describe(EventKind::TaskFailed), "run failed");
        assert_eq!(describe(EventKind::BackoffScheduled), "next run scheduled");
        assert_eq!(describe(EventKind::ActorExhausted), "task finished for good");
    }
}
