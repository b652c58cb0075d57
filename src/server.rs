//! Supervised dev server.
//!
//! ```text
//! Idle ──start──▶ Starting ──ready──▶ Ready ──close──▶ Closing ──▶ Closed
//!                    │
//!                    └──error (group killed)──▶ Failed
//! ```

use std::path::Path;
use std::time::{Duration, Instant};

use tokio::process::Child;
use tokio::time;

use crate::config::{validate_config, ConfigError, LaunchConfig};
use crate::error::{HarnessError, HarnessResult};
use crate::lifecycle::{await_readiness, force_kill, terminate};
use crate::observability::metrics;
use crate::process::{launcher, LaunchedChild, ProcessGroup};
use crate::readiness::{spawn_scanner, Endpoints, MarkerPatterns};

/// How long a failed startup waits for the killed child to be reaped.
const REAP_GRACE: Duration = Duration::from_secs(1);

/// Where a [`DevServer`] is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// Constructed, nothing launched yet.
    Idle,
    /// Child spawned, waiting for readiness markers.
    Starting,
    /// All endpoints discovered.
    Ready,
    /// Shutdown in progress.
    Closing,
    /// Shutdown finished, successfully or not.
    Closed,
    /// Startup failed; any child was killed.
    Failed,
}

impl std::fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Starting => write!(f, "starting"),
            Self::Ready => write!(f, "ready"),
            Self::Closing => write!(f, "closing"),
            Self::Closed => write!(f, "closed"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// A dev server process run as a test fixture.
///
/// Owns the child and its process group. Dropping a server that is still
/// running kills the group; call [`DevServer::close`] for an orderly stop.
pub struct DevServer {
    config: LaunchConfig,
    patterns: MarkerPatterns,
    state: LifecycleState,
    child: Option<Child>,
    group: Option<ProcessGroup>,
    endpoints: Option<Endpoints>,
}

impl DevServer {
    /// Create an idle supervisor. Nothing is spawned until [`start`](Self::start).
    pub fn new(config: LaunchConfig) -> Self {
        Self {
            config,
            patterns: MarkerPatterns::new(),
            state: LifecycleState::Idle,
            child: None,
            group: None,
            endpoints: None,
        }
    }

    /// Create a supervisor and start it.
    pub async fn launch(config: LaunchConfig) -> HarnessResult<Self> {
        let mut server = Self::new(config);
        server.start().await?;
        Ok(server)
    }

    /// Launch the child and wait until all three endpoints are announced.
    ///
    /// On failure the process group is killed before the error is returned
    /// and the server moves to [`LifecycleState::Failed`].
    pub async fn start(&mut self) -> HarnessResult<()> {
        if self.state != LifecycleState::Idle {
            return Err(HarnessError::AlreadyStarted);
        }
        self.state = LifecycleState::Starting;

        if let Err(errors) = validate_config(&self.config) {
            return Err(self.fail(ConfigError::Validation(errors).into()));
        }

        let started_at = Instant::now();
        let LaunchedChild {
            child,
            group,
            stderr,
        } = match launcher::spawn(&self.config) {
            Ok(launched) => launched,
            Err(error) => return Err(self.fail(error)),
        };
        metrics::record_launch();
        self.child = Some(child);
        self.group = Some(group);

        let report = spawn_scanner(stderr, self.patterns.clone());
        match await_readiness(report, self.config.timeout()).await {
            Ok(endpoints) => {
                let elapsed = started_at.elapsed();
                metrics::record_startup(elapsed);
                tracing::info!(
                    pid = group.leader(),
                    module_url = %endpoints.module_url,
                    admin_url = %endpoints.admin_url,
                    api_url = %endpoints.api_url,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Dev server ready"
                );
                self.endpoints = Some(endpoints);
                self.state = LifecycleState::Ready;
                Ok(())
            }
            Err(error) => {
                force_kill(group, self.config.debug, "startup");
                if let Some(mut child) = self.child.take() {
                    let _ = time::timeout(REAP_GRACE, child.wait()).await;
                }
                self.group = None;
                Err(self.fail(error))
            }
        }
    }

    fn fail(&mut self, error: HarnessError) -> HarnessError {
        self.state = LifecycleState::Failed;
        metrics::record_startup_failure(error.reason());
        tracing::warn!(error = %error, "Dev server failed to start");
        error
    }

    /// Stop the server: `/quit` first, SIGKILL to the group if that fails or
    /// the child outlives the timeout.
    ///
    /// Idempotent: once the server is closed, failed or was never started,
    /// further calls return `Ok(())` and do nothing.
    pub async fn close(&mut self) -> HarnessResult<()> {
        match self.state {
            LifecycleState::Idle | LifecycleState::Closed | LifecycleState::Failed => {
                return Ok(())
            }
            // An interrupted start or close left a child behind.
            LifecycleState::Starting | LifecycleState::Closing => {
                self.abandon();
                return Ok(());
            }
            LifecycleState::Ready => {}
        }

        let admin_url = self.endpoints.as_ref().map(|e| e.admin_url.clone());
        let (Some(child), Some(group), Some(admin_url)) = (self.child.take(), self.group, admin_url)
        else {
            self.state = LifecycleState::Closed;
            return Ok(());
        };

        self.state = LifecycleState::Closing;
        let result = terminate(
            child,
            group,
            &admin_url,
            self.config.timeout(),
            self.config.debug,
        )
        .await;
        self.state = LifecycleState::Closed;

        match &result {
            Ok(()) => {
                metrics::record_shutdown("clean");
                tracing::info!(pid = group.leader(), "Dev server stopped");
            }
            Err(error) => {
                metrics::record_shutdown(error.reason());
                tracing::warn!(pid = group.leader(), error = %error, "Dev server stop failed");
            }
        }
        result
    }

    fn abandon(&mut self) {
        if let Some(group) = self.group.take() {
            force_kill(group, self.config.debug, "abandon");
        }
        self.child = None;
        self.state = LifecycleState::Closed;
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn config(&self) -> &LaunchConfig {
        &self.config
    }

    pub fn app_dir(&self) -> &Path {
        &self.config.app_dir
    }

    /// Pid of the child, which also identifies its process group.
    pub fn pid(&self) -> Option<u32> {
        self.group.map(|group| group.leader())
    }

    /// Discovered endpoints, available once the server is ready.
    pub fn endpoints(&self) -> Option<&Endpoints> {
        self.endpoints.as_ref()
    }

    /// URL to run tests against.
    pub fn module_url(&self) -> Option<&str> {
        self.endpoints.as_ref().map(|e| e.module_url.as_str())
    }

    pub fn admin_url(&self) -> Option<&str> {
        self.endpoints.as_ref().map(|e| e.admin_url.as_str())
    }

    pub fn api_url(&self) -> Option<&str> {
        self.endpoints.as_ref().map(|e| e.api_url.as_str())
    }
}

impl Drop for DevServer {
    fn drop(&mut self) {
        if matches!(
            self.state,
            LifecycleState::Starting | LifecycleState::Ready | LifecycleState::Closing
        ) {
            self.abandon();
        }
    }
}

impl std::fmt::Debug for DevServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DevServer")
            .field("state", &self.state)
            .field("pid", &self.pid())
            .field("endpoints", &self.endpoints)
            .finish()
    }
}
