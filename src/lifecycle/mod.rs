//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     spawn scanner → race report against timeout → Endpoints or error
//!
//! Shutdown (shutdown.rs):
//!     start exit wait → GET <admin>/quit → race exit against timeout
//!     → SIGKILL process group on failure
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → close the dev server from the CLI
//! ```
//!
//! # Design Decisions
//! - Both phases share one shape: background task, one-shot report, deadline
//! - Every failure path kills the process group before returning
//! - No retries

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::{force_kill, quit_url, terminate};
pub use signals::shutdown_signal;
pub use startup::{await_readiness, discover_endpoints};
