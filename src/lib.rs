//! Dev app server test harness.
//!
//! Launches a development server as a child process, waits until it announces
//! its API, module and admin endpoints on stderr, and tears it down again,
//! cooperatively through `/quit` or by killing its whole process group.
//!
//! ```no_run
//! # async fn run() -> Result<(), appserver_harness::HarnessError> {
//! use appserver_harness::{DevServer, LaunchConfig};
//!
//! let mut server = DevServer::launch(LaunchConfig::for_app("testdata/app")).await?;
//! let module_url = server.module_url().unwrap_or_default().to_string();
//! // ... run HTTP tests against module_url ...
//! server.close().await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod lifecycle;
pub mod observability;
pub mod process;
pub mod readiness;
pub mod server;

pub use config::LaunchConfig;
pub use error::{HarnessError, HarnessResult};
pub use readiness::Endpoints;
pub use server::{DevServer, LifecycleState};
