//! Readiness detection on the dev server's stderr.
//!
//! # Data Flow
//! ```text
//! stderr lines
//!     → scanner.rs (background task, one line at a time)
//!     → markers.rs (three patterns, first match per marker wins)
//!     → oneshot ScanReport { markers, error }
//! ```
//!
//! # Design Decisions
//! - Patterns are compiled once per supervisor and handed to the scanner
//! - Completeness is checked before each read so a quiet stream never blocks
//!   a finished scan

pub mod markers;
pub mod scanner;

pub use markers::{Endpoints, MarkerPatterns, ReadinessMarkers};
pub use scanner::{scan, spawn_scanner, ScanReport};
