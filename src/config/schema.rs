//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Executable looked up on `PATH` when none is configured.
pub const DEFAULT_EXECUTABLE: &str = "dev_appserver.py";

/// Host both listeners bind to when none is configured.
pub const DEFAULT_HOST: &str = "localhost";

/// Startup and shutdown timeout when none is configured.
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Launch configuration for a supervised dev server.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct LaunchConfig {
    /// Path to the dev server, or a bare name searched on `PATH`.
    pub executable: String,

    /// Host passed to both `--host` and `--admin_host`.
    pub host: String,

    /// Port of the application module. 0 lets the server pick one.
    pub port: u16,

    /// Port of the admin server. 0 lets the server pick one.
    pub admin_port: u16,

    /// Timeout in seconds, applied to startup and to close separately.
    pub timeout_secs: u64,

    /// Mirror child output and log the command line and kill failures.
    pub debug: bool,

    /// Application bundle handed to the server as its last argument.
    pub app_dir: PathBuf,
}

impl LaunchConfig {
    /// Default configuration for the bundle at `app_dir`.
    pub fn for_app(app_dir: impl Into<PathBuf>) -> Self {
        Self {
            app_dir: app_dir.into(),
            ..Self::default()
        }
    }

    /// Timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            executable: DEFAULT_EXECUTABLE.to_string(),
            host: DEFAULT_HOST.to_string(),
            port: 0,
            admin_port: 0,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            debug: false,
            app_dir: PathBuf::new(),
        }
    }
}
