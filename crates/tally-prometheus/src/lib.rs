//! Prometheus metrics backend for the tally orchestrator.
//!
//! [`PrometheusMetrics`] implements [`tally_core::DispatchMetrics`] and keeps
//! its series in a private [`Registry`].
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use tally_core::DispatchMetrics;
//! use tally_prometheus::PrometheusMetrics;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let metrics = PrometheusMetrics::new()?;
//! let handle: Arc<dyn DispatchMetrics> = Arc::new(metrics.clone());
//!
//! handle.record_submitted();
//! assert!(metrics.encode()?.contains("tally_tasks_submitted_total 1"));
//! # Ok(())
//! # }
//! ```
//!
//! ## Metrics
//! - `tally_tasks_submitted_total` - Counter
//! - `tally_tasks_placed_total` - Counter
//! - `tally_placements_rejected_total` - Counter
//! - `tally_tasks_completed_total{status}` - Counter
//! - `tally_queue_depth` - Gauge
//!
//! ## HTTP Server
//! This crate does NOT serve `/metrics`; mount [`PrometheusMetrics::encode`]
//! on the application's router.

mod backend;
pub use backend::PrometheusMetrics;

pub use prometheus::{Encoder, Registry, TextEncoder};
