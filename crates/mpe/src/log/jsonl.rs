//! JSON-lines logging backend.

use super::MetricLogger;
use crate::Result;
use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// Logger that appends one JSON object per call to a file:
/// `{"step": 3, "metrics": {"reward": -1.2}}`.
pub struct JsonLinesLogger {
    writer: Mutex<BufWriter<File>>,
}

impl JsonLinesLogger {
    /// Create (or truncate) the output file
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::create(path.as_ref())?;
        Ok(Self {
            writer: Mutex::new(BufWriter::new(file)),
        })
    }

    /// A panic elsewhere while holding the lock poisons it; the buffered
    /// writer itself is still usable, so keep writing.
    fn writer(&self) -> MutexGuard<'_, BufWriter<File>> {
        match self.writer.lock() {
            Ok(writer) => writer,
            Err(poisoned) => {
                tracing::warn!("Metrics writer lock poisoned, continuing");
                poisoned.into_inner()
            }
        }
    }

    fn write_record(&self, step: u64, metrics: BTreeMap<&str, f64>) {
        let record = serde_json::json!({ "step": step, "metrics": metrics });
        if let Err(e) = writeln!(self.writer(), "{}", record) {
            tracing::warn!(error = %e, "Failed to write metrics record");
        }
    }
}

impl MetricLogger for JsonLinesLogger {
    fn log_scalar(&self, name: &str, value: f64, step: u64) {
        self.write_record(step, BTreeMap::from([(name, value)]));
    }

    fn log_metrics(&self, metrics: &HashMap<String, f64>, step: u64) {
        let sorted = metrics.iter().map(|(k, v)| (k.as_str(), *v)).collect();
        self.write_record(step, sorted);
    }

    fn close(&self) {
        if let Err(e) = self.writer().flush() {
            tracing::warn!(error = %e, "Failed to flush metrics file");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writes_one_line_per_call() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metrics.jsonl");

        let logger = JsonLinesLogger::create(&path).unwrap();
        logger.log_scalar("reward", -0.5, 1);
        let mut metrics = HashMap::new();
        metrics.insert("collisions".to_string(), 2.0);
        logger.log_metrics(&metrics, 2);
        logger.close();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["step"], 1);
        assert_eq!(first["metrics"]["reward"], -0.5);
    }

    #[test]
    fn test_close_flushes_without_drop() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metrics.jsonl");

        let logger = JsonLinesLogger::create(&path).unwrap();
        logger.log_scalar("coverage", 3.0, 7);
        logger.close();

        // Logger still alive: the record must already be on disk
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"coverage\":3.0"));
        drop(logger);
    }

    #[test]
    fn test_keeps_writing_after_poisoned_lock() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metrics.jsonl");
        let logger = JsonLinesLogger::create(&path).unwrap();

        let poisoned = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = logger.writer.lock().unwrap();
            panic!("writer panicked");
        }));
        assert!(poisoned.is_err());
        assert!(logger.writer.is_poisoned());

        logger.log_scalar("reward", 1.5, 3);
        logger.close();

        let text = std::fs::read_to_string(&path).unwrap();
        let record: serde_json::Value = serde_json::from_str(text.trim()).unwrap();
        assert_eq!(record["step"], 3);
        assert_eq!(record["metrics"]["reward"], 1.5);
    }
}
