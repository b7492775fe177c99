//! HTTP API module.
//!
//! This module provides the HTTP server, error bodies and the metrics log.

pub mod metrics;
pub mod server;
pub mod types;

pub use metrics::{MetricSample, MetricsLog, MetricsSink};
pub use server::{build_router, start_server, AppState};
pub use types::*;
