//! Byte-at-a-time reader with an artificial delay.
//!
//! Wrap a payload in [`ThrottledReader`] to simulate a slow link: every read
//! yields at most one byte, however large the caller's buffer, and waits
//! `delay` first. Consumers that assume buffered delivery break under it.

use std::future::Future;
use std::io;
use std::pin::Pin;
use std::task::{ready, Context, Poll};
use std::time::Duration;
use tokio::io::{AsyncRead, ReadBuf};
use tokio::time::Sleep;

/// Delay applied before each byte unless configured otherwise
pub const DEFAULT_DELAY: Duration = Duration::from_millis(10);

/// Reader decorator delivering one delayed byte per read
pub struct ThrottledReader<R> {
    inner: R,
    delay: Duration,
    pending: Option<Pin<Box<Sleep>>>,
}

impl<R> ThrottledReader<R> {
    /// Wrap `inner` with the default per-byte delay
    pub fn new(inner: R) -> Self {
        Self::with_delay(inner, DEFAULT_DELAY)
    }

    pub fn with_delay(inner: R, delay: Duration) -> Self {
        Self {
            inner,
            delay,
            pending: None,
        }
    }
}

impl<R: AsyncRead + Unpin> AsyncRead for ThrottledReader<R> {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        if buf.remaining() == 0 {
            return Poll::Ready(Ok(()));
        }

        let delay = this.delay;
        let sleep = this
            .pending
            .get_or_insert_with(|| Box::pin(tokio::time::sleep(delay)));
        ready!(sleep.as_mut().poll(cx));

        // The elapsed sleep stays in place while the inner reader is pending,
        // so a wakeup does not restart the delay.
        let mut byte = [0u8; 1];
        let mut one = ReadBuf::new(&mut byte);
        ready!(Pin::new(&mut this.inner).poll_read(cx, &mut one))?;
        this.pending = None;
        buf.put_slice(one.filled());
        Poll::Ready(Ok(()))
    }
}

#[cfg(test)]
#[path = "throttle_test.rs"]
mod tests;
