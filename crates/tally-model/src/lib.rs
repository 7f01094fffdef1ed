//! Wire and domain types shared by the orchestrator and its agents.
//!
//! Everything here is plain data: the canonical [`Task`] record and its
//! [`TaskStatus`] state machine, the [`Agent`] registry entry, and the small
//! request/report shapes exchanged over the control surface.

mod domain;
pub use domain::*;
