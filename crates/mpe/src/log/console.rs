//! Console logging backend.

use super::MetricLogger;
use std::collections::HashMap;

/// Logger that prints metrics via `tracing`, optionally tagged with a label
/// (e.g. the reward mode being evaluated).
#[derive(Default)]
pub struct ConsoleLogger {
    label: Option<String>,
}

impl ConsoleLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_label(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
        }
    }

    fn format_metrics(&self, metrics: &HashMap<String, f64>, step: u64) -> String {
        let mut sorted: Vec<_> = metrics.iter().collect();
        sorted.sort_by(|a, b| a.0.cmp(b.0));

        let body = sorted
            .iter()
            .map(|(k, v)| format!("{}={:.4}", k, v))
            .collect::<Vec<_>>()
            .join(", ");

        match &self.label {
            Some(label) => format!("[{}] Step {}: {}", label, step, body),
            None => format!("Step {}: {}", step, body),
        }
    }
}

impl MetricLogger for ConsoleLogger {
    fn log_scalar(&self, name: &str, value: f64, step: u64) {
        match &self.label {
            Some(label) => tracing::info!("[{}] Step {}: {} = {:.4}", label, step, name, value),
            None => tracing::info!("Step {}: {} = {:.4}", step, name, value),
        }
    }

    fn log_metrics(&self, metrics: &HashMap<String, f64>, step: u64) {
        tracing::info!("{}", self.format_metrics(metrics, step));
    }
}
