//! Startup gate: readiness scan raced against a deadline.

use std::time::Duration;

use tokio::io::AsyncRead;
use tokio::sync::oneshot;
use tokio::time;

use crate::error::{HarnessError, HarnessResult};
use crate::readiness::{spawn_scanner, Endpoints, MarkerPatterns, ReadinessMarkers, ScanReport};

/// Wait for the scanner's report, giving up after `timeout`.
///
/// Missing markers are reported in a fixed order: admin, then module, then
/// api, regardless of how many are missing.
pub async fn await_readiness(
    report: oneshot::Receiver<ScanReport>,
    timeout: Duration,
) -> HarnessResult<Endpoints> {
    let report = match time::timeout(timeout, report).await {
        Err(_) => return Err(HarnessError::StartupTimeout),
        Ok(Err(_)) => {
            return Err(HarnessError::StartupStreamError(
                "scanner task ended without reporting".to_string(),
            ))
        }
        Ok(Ok(report)) => report,
    };

    if let Some(error) = report.error {
        return Err(HarnessError::StartupStreamError(error.to_string()));
    }

    let ReadinessMarkers { api, module, admin } = report.markers;
    let admin_url = admin.ok_or(HarnessError::AdminUrlNotFound)?;
    let module_url = module.ok_or(HarnessError::ModuleUrlNotFound)?;
    let api_url = api.ok_or(HarnessError::ApiUrlNotFound)?;

    Ok(Endpoints {
        api_url,
        module_url,
        admin_url,
    })
}

/// Scan `stream` in the background and wait for all three endpoints.
///
/// The deadline starts when scanning starts. On timeout the scanner task is
/// left behind; it finishes once the stream closes.
pub async fn discover_endpoints<R>(
    stream: R,
    patterns: MarkerPatterns,
    timeout: Duration,
) -> HarnessResult<Endpoints>
where
    R: AsyncRead + Send + Unpin + 'static,
{
    let report = spawn_scanner(stream, patterns);
    await_readiness(report, timeout).await
}
