//! Metric logging.
//!
//! Provides:
//! - `MetricLogger` trait for composable backends
//! - `ConsoleLogger` for lightweight logging through `tracing`
//! - `JsonLinesLogger` for machine-readable evaluation records
//! - `CompositeLogger` for multi-backend logging

mod console;
mod jsonl;
mod logger;

pub use console::ConsoleLogger;
pub use jsonl::JsonLinesLogger;
pub use logger::{CompositeLogger, MetricLogger, NoOpLogger};
