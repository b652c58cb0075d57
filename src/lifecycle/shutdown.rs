//! Two-phase shutdown of the dev server.
//!
//! # Responsibilities
//! - Ask the server to quit through its admin endpoint
//! - Race its exit against the shutdown timeout
//! - SIGKILL the whole process group when asking is not enough
//!
//! # Design Decisions
//! - The exit wait starts before the quit request so the exit cannot be missed
//! - Kill failures are logged in debug mode only and never escalated

use std::time::Duration;

use tokio::process::Child;
use tokio::sync::oneshot;
use tokio::time;
use url::Url;

use crate::error::{HarnessError, HarnessResult};
use crate::observability::metrics;
use crate::process::ProcessGroup;

/// SIGKILL every process in `group`, swallowing delivery failures.
pub fn force_kill(group: ProcessGroup, debug: bool, phase: &'static str) {
    metrics::record_forced_kill(phase);
    match group.kill() {
        Ok(()) => tracing::debug!(pgid = group.leader(), phase, "Process group killed"),
        Err(error) if debug => {
            tracing::warn!(pgid = group.leader(), phase, error = %error, "Failed to kill process group")
        }
        Err(_) => {}
    }
}

/// `<admin_url>/quit`, validated.
pub fn quit_url(admin_url: &str) -> HarnessResult<Url> {
    let raw = format!("{}/quit", admin_url.trim_end_matches('/'));
    Url::parse(&raw).map_err(|source| HarnessError::InvalidAdminUrl {
        url: admin_url.to_string(),
        source,
    })
}

async fn request_quit(url: Url, timeout: Duration) -> reqwest::Result<()> {
    let client = reqwest::Client::builder()
        .timeout(timeout)
        .no_proxy()
        .build()?;
    let response = client.get(url).send().await?;
    tracing::debug!(status = %response.status(), "Quit handler answered");
    Ok(())
}

/// Stop `child`, first cooperatively and then by force.
///
/// The response status of the quit request is not inspected; only transport
/// failures count. `timeout` bounds the quit request and, separately, the wait
/// for the child to exit afterwards.
pub async fn terminate(
    mut child: Child,
    group: ProcessGroup,
    admin_url: &str,
    timeout: Duration,
    debug: bool,
) -> HarnessResult<()> {
    if debug {
        tracing::info!(pid = group.leader(), "Attempting to stop dev server");
    }

    let (tx, exited) = oneshot::channel();
    tokio::spawn(async move {
        let _ = tx.send(child.wait().await);
    });

    let url = match quit_url(admin_url) {
        Ok(url) => url,
        Err(error) => {
            force_kill(group, debug, "shutdown");
            return Err(error);
        }
    };

    if debug {
        tracing::info!(url = %url, "Calling /quit handler on the admin server");
    }
    if let Err(error) = request_quit(url, timeout).await {
        force_kill(group, debug, "shutdown");
        return Err(HarnessError::QuitRequestFailed(error));
    }

    match time::timeout(timeout, exited).await {
        Ok(Ok(Ok(status))) if status.success() => Ok(()),
        Ok(Ok(Ok(status))) => Err(HarnessError::ChildExited(status)),
        Ok(Ok(Err(error))) => Err(HarnessError::Wait(error)),
        Ok(Err(_)) => Err(HarnessError::Wait(std::io::Error::other(
            "exit wait task ended without reporting",
        ))),
        Err(_) => {
            force_kill(group, debug, "shutdown");
            Err(HarnessError::ShutdownTimeout)
        }
    }
}
