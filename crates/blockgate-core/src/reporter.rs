//! Outcome reporting interface injected into gateway clients.
//!
//! The gateway never reaches for a global metrics registry; whoever builds
//! the client hands it a [`Reporter`].

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use serde::Serialize;

use crate::error::ErrorKind;

/// Result of a single upstream call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure(ErrorKind),
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failure(_) => "error",
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sink for per-call outcomes and latencies, keyed by JSON-RPC method.
///
/// Implementations must be cheap and must not block: they are called on the
/// request path of every gateway operation.
pub trait Reporter: Send + Sync + 'static {
    fn record_outcome(&self, method: &str, outcome: Outcome);

    fn record_duration(&self, method: &str, elapsed: Duration);

    /// Latest chain height observed through `eth_blockNumber`.
    fn record_block_height(&self, _height: u64) {}
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopReporter;

impl Reporter for NoopReporter {
    fn record_outcome(&self, _method: &str, _outcome: Outcome) {}

    fn record_duration(&self, _method: &str, _elapsed: Duration) {}
}

/// Emits every report as a `tracing` debug event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn record_outcome(&self, method: &str, outcome: Outcome) {
        match outcome {
            Outcome::Success => tracing::debug!(method, outcome = %outcome, "rpc outcome"),
            Outcome::Failure(kind) => {
                tracing::debug!(method, outcome = %outcome, kind = %kind, "rpc outcome")
            }
        }
    }

    fn record_duration(&self, method: &str, elapsed: Duration) {
        tracing::debug!(method, elapsed_ms = elapsed.as_millis() as u64, "rpc duration");
    }

    fn record_block_height(&self, height: u64) {
        tracing::debug!(height, "chain height");
    }
}

/// Per-method counters in a snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MethodStats {
    pub success: u64,
    pub error: u64,
    pub errors_by_kind: BTreeMap<String, u64>,
    pub observations: u64,
    pub total_duration_ms: f64,
}

impl MethodStats {
    pub fn mean_duration_ms(&self) -> Option<f64> {
        (self.observations > 0).then(|| self.total_duration_ms / self.observations as f64)
    }
}

/// Point-in-time copy of an [`InMemoryReporter`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReporterSnapshot {
    pub methods: BTreeMap<String, MethodStats>,
    pub block_height: Option<u64>,
}

#[derive(Default)]
struct ReporterInner {
    methods: BTreeMap<String, MethodStats>,
    block_height: Option<u64>,
}

/// Keeps counters in memory so tests can assert on what a client reported.
#[derive(Default)]
pub struct InMemoryReporter {
    inner: Mutex<ReporterInner>,
}

impl InMemoryReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> ReporterSnapshot {
        let inner = self.lock();
        ReporterSnapshot {
            methods: inner.methods.clone(),
            block_height: inner.block_height,
        }
    }

    fn lock(&self) -> MutexGuard<'_, ReporterInner> {
        // Counters stay usable even if a holder panicked.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Reporter for InMemoryReporter {
    fn record_outcome(&self, method: &str, outcome: Outcome) {
        let mut inner = self.lock();
        let stats = inner.methods.entry(method.to_string()).or_default();
        match outcome {
            Outcome::Success => stats.success += 1,
            Outcome::Failure(kind) => {
                stats.error += 1;
                *stats.errors_by_kind.entry(kind.as_str().to_string()).or_default() += 1;
            }
        }
    }

    fn record_duration(&self, method: &str, elapsed: Duration) {
        let mut inner = self.lock();
        let stats = inner.methods.entry(method.to_string()).or_default();
        stats.observations += 1;
        stats.total_duration_ms += elapsed.as_secs_f64() * 1000.0;
    }

    fn record_block_height(&self, height: u64) {
        self.lock().block_height = Some(height);
    }
}
