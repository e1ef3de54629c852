//! An injectable logging sink.
//!
//! Every rejection in the verifier, the PoW engine, and the inbox goes
//! through a `LogSink` instead of a process-wide logger, so tests can
//! capture rejection kinds without parsing log output.

use std::sync::{Arc, Mutex};

pub trait LogSink: Send + Sync {
    fn log_error(&self, kind: &str, detail: &str);
}

/// Default sink: forwards to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogSink;

impl LogSink for TracingLogSink {
    fn log_error(&self, kind: &str, detail: &str) {
        tracing::warn!(kind, detail, "rejected");
    }
}

pub fn default_sink() -> Arc<dyn LogSink> {
    Arc::new(TracingLogSink)
}

/// A sink that records every call, for assertions in tests.
#[derive(Debug, Default)]
pub struct CapturingLogSink {
    entries: Mutex<Vec<(String, String)>>,
}

impl CapturingLogSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<(String, String)> {
        self.entries.lock().unwrap().clone()
    }

    pub fn kinds(&self) -> Vec<String> {
        self.entries.lock().unwrap().iter().map(|(k, _)| k.clone()).collect()
    }
}

impl LogSink for CapturingLogSink {
    fn log_error(&self, kind: &str, detail: &str) {
        self.entries.lock().unwrap().push((kind.to_string(), detail.to_string()));
    }
}
