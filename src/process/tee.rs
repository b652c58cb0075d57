//! Stream mirroring for debug mode.

use std::io::{self, Write};
use std::pin::Pin;
use std::task::{ready, Context, Poll};

use tokio::io::{AsyncRead, ReadBuf};

/// Reader that copies everything it yields into a blocking writer.
///
/// Mirror write failures are ignored; the reader side is authoritative.
pub struct TeeReader<R, W> {
    inner: R,
    mirror: W,
}

impl<R, W> TeeReader<R, W> {
    pub fn new(inner: R, mirror: W) -> Self {
        Self { inner, mirror }
    }

    pub fn into_parts(self) -> (R, W) {
        (self.inner, self.mirror)
    }
}

impl<R, W> AsyncRead for TeeReader<R, W>
where
    R: AsyncRead + Unpin,
    W: Write + Unpin,
{
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        let before = buf.filled().len();
        ready!(Pin::new(&mut this.inner).poll_read(cx, buf))?;

        let fresh = &buf.filled()[before..];
        if !fresh.is_empty() {
            // Blocking write on the runtime thread; acceptable for a debug mirror.
            let _ = this.mirror.write_all(fresh);
            let _ = this.mirror.flush();
        }
        Poll::Ready(Ok(()))
    }
}
