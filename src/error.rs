//! Error taxonomy for the harness.

use std::process::ExitStatus;

use thiserror::Error;

use crate::config::loader::ConfigError;

/// Errors produced while launching, waiting on or closing the dev server.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// The executable could not be found on disk or on `PATH`.
    #[error("executable not found: {0}")]
    ExecutableNotFound(String),

    /// The OS refused to start the child process.
    #[error("failed to start {program}: {source}")]
    SpawnFailed {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// `start` was called on a supervisor that already launched a child.
    #[error("dev server already started")]
    AlreadyStarted,

    /// Readiness markers were not all seen before the deadline.
    #[error("timeout starting child process")]
    StartupTimeout,

    /// The child's stderr failed while scanning for readiness markers.
    #[error("error reading server stderr: {0}")]
    StartupStreamError(String),

    #[error("unable to find admin server URL")]
    AdminUrlNotFound,

    #[error("unable to find module server URL")]
    ModuleUrlNotFound,

    #[error("unable to find api server URL")]
    ApiUrlNotFound,

    /// The discovered admin URL could not be turned into a quit URL.
    #[error("invalid admin server URL {url}: {source}")]
    InvalidAdminUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// The cooperative `/quit` request could not be delivered.
    #[error("unable to call /quit handler: {0}")]
    QuitRequestFailed(reqwest::Error),

    /// The child did not exit within the shutdown timeout.
    #[error("timeout killing child process")]
    ShutdownTimeout,

    /// The child exited on its own with a failure status.
    #[error("child process exited with {0}")]
    ChildExited(ExitStatus),

    /// Waiting on the child failed at the OS level.
    #[error("waiting for child process: {0}")]
    Wait(#[source] std::io::Error),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl HarnessError {
    /// Short label used for metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            HarnessError::ExecutableNotFound(_) => "executable_not_found",
            HarnessError::SpawnFailed { .. } => "spawn_failed",
            HarnessError::AlreadyStarted => "already_started",
            HarnessError::StartupTimeout => "startup_timeout",
            HarnessError::StartupStreamError(_) => "stream_error",
            HarnessError::AdminUrlNotFound => "admin_url_not_found",
            HarnessError::ModuleUrlNotFound => "module_url_not_found",
            HarnessError::ApiUrlNotFound => "api_url_not_found",
            HarnessError::InvalidAdminUrl { .. } => "invalid_admin_url",
            HarnessError::QuitRequestFailed(_) => "quit_request_failed",
            HarnessError::ShutdownTimeout => "shutdown_timeout",
            HarnessError::ChildExited(_) => "child_exited",
            HarnessError::Wait(_) => "wait_failed",
            HarnessError::Config(_) => "config",
        }
    }
}

/// Result type for harness operations.
pub type HarnessResult<T> = Result<T, HarnessError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_startup_messages() {
        assert_eq!(
            HarnessError::StartupTimeout.to_string(),
            "timeout starting child process"
        );
        assert_eq!(
            HarnessError::StartupStreamError("broken pipe".into()).to_string(),
            "error reading server stderr: broken pipe"
        );
        assert_eq!(
            HarnessError::AdminUrlNotFound.to_string(),
            "unable to find admin server URL"
        );
        assert_eq!(
            HarnessError::ModuleUrlNotFound.to_string(),
            "unable to find module server URL"
        );
        assert_eq!(
            HarnessError::ApiUrlNotFound.to_string(),
            "unable to find api server URL"
        );
    }

    #[test]
    fn test_shutdown_message() {
        assert_eq!(
            HarnessError::ShutdownTimeout.to_string(),
            "timeout killing child process"
        );
        assert_eq!(HarnessError::ShutdownTimeout.reason(), "shutdown_timeout");
    }

    #[test]
    fn test_quit_failure_message_not_repeated_in_chain() {
        let transport = reqwest::Client::new().get("not a url").build().unwrap_err();
        let expected = format!("unable to call /quit handler: {}", transport);
        let err = HarnessError::QuitRequestFailed(transport);

        assert_eq!(err.to_string(), expected);
        assert!(std::error::Error::source(&err).is_none());
    }
}
