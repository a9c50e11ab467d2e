//! Backend call counters

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Process-wide counters for backend traffic
#[derive(Debug, Default)]
pub struct BackendMetrics {
    /// Total backend calls issued
    pub backend_calls: AtomicU64,
    /// Calls that failed at the transport or timed out
    pub backend_errors: AtomicU64,
    /// Calls that came back blank
    pub empty_responses: AtomicU64,
    /// Total tokens reported by providers
    pub tokens_used: AtomicU64,
    /// Stateful sessions opened
    pub sessions_opened: AtomicU64,
}

impl BackendMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a backend call
    pub fn record_backend_call(&self, tokens: u64, error: bool) {
        self.backend_calls.fetch_add(1, Ordering::Relaxed);
        self.tokens_used.fetch_add(tokens, Ordering::Relaxed);
        if error {
            self.backend_errors.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_empty_response(&self) {
        self.empty_responses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_session_opened(&self) {
        self.sessions_opened.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            backend_calls: self.backend_calls.load(Ordering::Relaxed),
            backend_errors: self.backend_errors.load(Ordering::Relaxed),
            empty_responses: self.empty_responses.load(Ordering::Relaxed),
            tokens_used: self.tokens_used.load(Ordering::Relaxed),
            sessions_opened: self.sessions_opened.load(Ordering::Relaxed),
        }
    }

    /// Share of calls that failed
    pub fn error_rate(&self) -> f64 {
        let total = self.backend_calls.load(Ordering::Relaxed);
        let errors = self.backend_errors.load(Ordering::Relaxed);
        if total == 0 {
            0.0
        } else {
            errors as f64 / total as f64
        }
    }
}

/// Snapshot of metrics at a point in time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub backend_calls: u64,
    pub backend_errors: u64,
    pub empty_responses: u64,
    pub tokens_used: u64,
    pub sessions_opened: u64,
}

impl MetricsSnapshot {
    /// Export metrics in Prometheus text format
    pub fn to_prometheus(&self) -> String {
        let counters = [
            (
                "enigma_backend_calls_total",
                "Total number of backend calls",
                self.backend_calls,
            ),
            (
                "enigma_backend_errors_total",
                "Backend calls that failed or timed out",
                self.backend_errors,
            ),
            (
                "enigma_empty_responses_total",
                "Backend calls that returned no text",
                self.empty_responses,
            ),
            (
                "enigma_tokens_used_total",
                "Tokens reported by providers",
                self.tokens_used,
            ),
            (
                "enigma_sessions_opened_total",
                "Stateful sessions opened",
                self.sessions_opened,
            ),
        ];

        let mut output = String::new();
        for (name, help, value) in counters {
            output.push_str(&format!("# HELP {} {}\n", name, help));
            output.push_str(&format!("# TYPE {} counter\n", name));
            output.push_str(&format!("{} {}\n", name, value));
        }
        output
    }
}

/// Global metrics instance
static GLOBAL_METRICS: std::sync::OnceLock<Arc<BackendMetrics>> = std::sync::OnceLock::new();

/// Get or initialize global metrics
pub fn global_metrics() -> Arc<BackendMetrics> {
    GLOBAL_METRICS
        .get_or_init(|| Arc::new(BackendMetrics::new()))
        .clone()
}
