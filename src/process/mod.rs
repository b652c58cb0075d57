//! Child process plumbing.
//!
//! # Data Flow
//! ```text
//! LaunchConfig
//!     → launcher.rs (resolve executable, build flags, spawn)
//!     → group.rs (new process group at spawn, group kill later)
//!     → tee.rs (stderr mirrored to our stderr in debug mode)
//!     → LaunchedChild { child, group, stderr }
//! ```
//!
//! # Design Decisions
//! - The child always leads its own process group
//! - Group kill is a platform capability behind `ProcessGroup::kill`

pub mod group;
pub mod launcher;
pub mod tee;

pub use group::ProcessGroup;
pub use launcher::{resolve_executable, server_args, spawn, DiagnosticStream, LaunchedChild};
pub use tee::TeeReader;
