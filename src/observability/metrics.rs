//! Metrics collection.
//!
//! # Metrics
//! - `harness_launches_total` (counter): child processes spawned
//! - `harness_startup_failures_total` (counter): failed startups by reason
//! - `harness_startup_duration_seconds` (histogram): spawn to ready latency
//! - `harness_forced_kills_total` (counter): process group kills by phase
//! - `harness_shutdowns_total` (counter): close outcomes
//!
//! # Design Decisions
//! - Facade only; the embedding process decides whether to install a recorder

use std::time::Duration;

use metrics::{counter, histogram};

pub fn record_launch() {
    counter!("harness_launches_total").increment(1);
}

pub fn record_startup(duration: Duration) {
    histogram!("harness_startup_duration_seconds").record(duration.as_secs_f64());
}

pub fn record_startup_failure(reason: &'static str) {
    counter!("harness_startup_failures_total", "reason" => reason).increment(1);
}

/// Record a forced kill. `phase` is `"startup"`, `"shutdown"` or `"abandon"`.
pub fn record_forced_kill(phase: &'static str) {
    counter!("harness_forced_kills_total", "phase" => phase).increment(1);
}

pub fn record_shutdown(outcome: &'static str) {
    counter!("harness_shutdowns_total", "outcome" => outcome).increment(1);
}
