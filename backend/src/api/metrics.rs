//! Per-request performance samples.
//!
//! The HTTP layer records one [`MetricSample`] per processed request into a
//! [`MetricsSink`]. [`MetricsLog`] keeps the most recent samples in a bounded
//! ring buffer and broadcasts each new one to live SSE subscribers.

use std::collections::VecDeque;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::models::Mode;

/// One processed request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MetricSample {
    #[serde(rename = "requestId")]
    pub request_id: String,
    /// Local wall-clock time, `HH:MM:SS`.
    pub timestamp: String,
    #[serde(rename = "requestType")]
    pub request_type: Mode,
    #[serde(rename = "durationMS")]
    pub duration_ms: f64,
    /// Input lines (text) or data rows (CSV).
    #[serde(rename = "processedRows")]
    pub processed_rows: usize,
    #[serde(rename = "outputRows")]
    pub output_rows: usize,
    #[serde(rename = "passThrough")]
    pub pass_through: bool,
}

/// Destination for metric samples.
pub trait MetricsSink: Send + Sync {
    /// Append a sample.
    fn record(&self, sample: MetricSample);

    /// Retained samples, oldest first.
    fn snapshot(&self) -> Vec<MetricSample>;

    /// Receiver for samples recorded from now on.
    fn subscribe(&self) -> broadcast::Receiver<MetricSample>;
}

/// In-memory sink holding the latest `capacity` samples.
pub struct MetricsLog {
    samples: Mutex<VecDeque<MetricSample>>,
    capacity: usize,
    sender: broadcast::Sender<MetricSample>,
}

impl MetricsLog {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(100);
        Self {
            samples: Mutex::new(VecDeque::with_capacity(capacity.min(1024))),
            capacity,
            sender,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl MetricsSink for MetricsLog {
    fn record(&self, sample: MetricSample) {
        if self.capacity > 0 {
            let mut samples = self
                .samples
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            if samples.len() == self.capacity {
                samples.pop_front();
            }
            samples.push_back(sample.clone());
        }

        // No subscribers is fine
        let _ = self.sender.send(sample);
    }

    fn snapshot(&self) -> Vec<MetricSample> {
        self.samples
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .iter()
            .cloned()
            .collect()
    }

    fn subscribe(&self) -> broadcast::Receiver<MetricSample> {
        self.sender.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(rows: usize) -> MetricSample {
        MetricSample {
            request_id: format!("req-{}", rows),
            timestamp: "12:00:00".into(),
            request_type: Mode::Text,
            duration_ms: 0.5,
            processed_rows: rows,
            output_rows: rows,
            pass_through: false,
        }
    }

    #[test]
    fn test_ring_buffer_evicts_oldest() {
        let log = MetricsLog::new(3);
        for i in 0..5 {
            log.record(sample(i));
        }

        let rows: Vec<usize> = log.snapshot().iter().map(|s| s.processed_rows).collect();
        assert_eq!(rows, vec![2, 3, 4]);
    }

    #[test]
    fn test_zero_capacity_keeps_nothing() {
        let log = MetricsLog::new(0);
        log.record(sample(1));
        assert!(log.snapshot().is_empty());
    }

    #[test]
    fn test_subscribers_receive_samples() {
        let log = MetricsLog::new(10);
        let mut rx = log.subscribe();

        log.record(sample(7));
        assert_eq!(rx.try_recv().unwrap().processed_rows, 7);
    }

    #[test]
    fn test_sample_wire_names() {
        let value = serde_json::to_value(sample(2)).unwrap();
        assert_eq!(value["requestType"], "text");
        assert_eq!(value["durationMS"], 0.5);
        assert_eq!(value["processedRows"], 2);
        assert_eq!(value["passThrough"], false);
    }
}
