//! Background scan of the dev server's stderr.

use std::io;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncReadExt, BufReader};
use tokio::sync::oneshot;

use crate::readiness::markers::{MarkerPatterns, ReadinessMarkers};

/// Longest stderr line the scanner accepts, newline included.
pub const MAX_LINE_LEN: usize = 64 * 1024;

/// Final state of one scan, sent exactly once.
#[derive(Debug)]
pub struct ScanReport {
    pub markers: ReadinessMarkers,
    /// Read error that ended the scan early, if any.
    pub error: Option<io::Error>,
}

/// Read lines until every marker is found, the stream ends, or a read fails.
///
/// Completeness is checked before each read, never after, so a stream that
/// goes quiet once the last marker is printed does not stall the scan.
/// A line longer than [`MAX_LINE_LEN`] ends the scan with an `InvalidData`
/// error.
pub async fn scan<R>(reader: &mut R, patterns: &MarkerPatterns) -> ScanReport
where
    R: AsyncBufRead + Unpin,
{
    let mut markers = ReadinessMarkers::default();
    let mut line = Vec::new();

    while !markers.is_complete() {
        line.clear();
        let mut limited = (&mut *reader).take(MAX_LINE_LEN as u64);
        match limited.read_until(b'\n', &mut line).await {
            Ok(0) => break,
            Ok(n) if n == MAX_LINE_LEN && line.last() != Some(&b'\n') => {
                return ScanReport {
                    markers,
                    error: Some(io::Error::new(
                        io::ErrorKind::InvalidData,
                        format!("stderr line longer than {} bytes", MAX_LINE_LEN),
                    )),
                }
            }
            Ok(_) => patterns.apply(&String::from_utf8_lossy(&line), &mut markers),
            Err(error) => {
                return ScanReport {
                    markers,
                    error: Some(error),
                }
            }
        }
    }

    ScanReport {
        markers,
        error: None,
    }
}

/// Scan `stream` on a background task and report through a one-shot channel.
///
/// After reporting, the task keeps draining the stream to EOF so the child
/// never blocks on a full pipe. If the receiver is gone by then (startup timed
/// out), the report is dropped and the task ends when the killed child's pipe
/// closes.
pub fn spawn_scanner<R>(stream: R, patterns: MarkerPatterns) -> oneshot::Receiver<ScanReport>
where
    R: AsyncRead + Send + Unpin + 'static,
{
    let (tx, rx) = oneshot::channel();

    tokio::spawn(async move {
        let mut reader = BufReader::new(stream);
        let report = scan(&mut reader, &patterns).await;
        let failed = report.error.is_some();
        let _ = tx.send(report);

        if !failed {
            let drained = tokio::io::copy(&mut reader, &mut tokio::io::sink()).await;
            tracing::trace!(drained = ?drained, "Stderr drain finished");
        }
    });

    rx
}

/// Reader whose every poll fails.
#[cfg(test)]
pub(crate) struct FailingReader(pub &'static str);

#[cfg(test)]
impl AsyncRead for FailingReader {
    fn poll_read(
        self: std::pin::Pin<&mut Self>,
        _cx: &mut std::task::Context<'_>,
        _buf: &mut tokio::io::ReadBuf<'_>,
    ) -> std::task::Poll<io::Result<()>> {
        std::task::Poll::Ready(Err(io::Error::new(io::ErrorKind::BrokenPipe, self.0)))
    }
}
