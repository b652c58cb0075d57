//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Launcher, StartupGate, Terminator produce:
//!     → tracing events (lifecycle transitions, kills, quit requests)
//!     → metrics.rs (launch counts, startup latency, forced kills)
//!
//! Consumers:
//!     → logging.rs installs a subscriber in the binary
//!     → any metrics recorder the embedding test suite installs
//! ```
//!
//! # Design Decisions
//! - The library only emits; subscribers and recorders belong to the caller
//! - Metrics are cheap (no-ops without a recorder)

pub mod logging;
pub mod metrics;
