//! Stop signal for polling workers.
//!
//! The worker sleeps between polls; dropping or signalling the handle closes
//! the channel, which wakes the worker immediately instead of after the
//! current poll interval.

use std::time::Duration;

use async_channel::{Receiver, Sender};
use futures::future::{Either, select};

/// Signals the paired [`ShutdownReceiver`] when dropped or shut down.
#[derive(Debug)]
pub(crate) struct ShutdownHandle {
    sender: Sender<()>,
}

impl ShutdownHandle {
    /// Create a new shutdown handle and receiver pair.
    pub(crate) fn new() -> (Self, ShutdownReceiver) {
        let (sender, receiver) = async_channel::bounded(1);
        (Self { sender }, ShutdownReceiver { receiver })
    }

    /// Signal shutdown now rather than on drop.
    pub(crate) fn shutdown(&self) {
        self.sender.close();
    }
}

impl Drop for ShutdownHandle {
    fn drop(&mut self) {
        self.sender.close();
    }
}

/// Worker side of a [`ShutdownHandle`].
#[derive(Debug, Clone)]
pub(crate) struct ShutdownReceiver {
    receiver: Receiver<()>,
}

impl ShutdownReceiver {
    /// Check if shutdown was signaled (non-blocking).
    pub(crate) fn is_shutdown(&self) -> bool {
        self.receiver.is_closed()
    }

    /// Block for up to `timeout`, returning early on shutdown.
    ///
    /// Returns `true` if shutdown was signaled.
    pub(crate) fn wait_timeout(&self, timeout: Duration) -> bool {
        let closed = Box::pin(self.receiver.recv());
        let delay = Box::pin(futures_timer::Delay::new(timeout));
        match futures::executor::block_on(select(closed, delay)) {
            Either::Left(_) => true,
            Either::Right(((), _)) => self.is_shutdown(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn test_wait_times_out_without_signal() {
        let (_handle, receiver) = ShutdownHandle::new();
        assert!(!receiver.wait_timeout(Duration::from_millis(10)));
    }

    #[test]
    fn test_shutdown_wakes_waiter() {
        let (handle, receiver) = ShutdownHandle::new();
        let started = Instant::now();
        let worker = std::thread::spawn(move || receiver.wait_timeout(Duration::from_secs(30)));
        handle.shutdown();
        assert!(worker.join().unwrap_or(false));
        assert!(started.elapsed() < Duration::from_secs(30));
    }

    #[test]
    fn test_drop_signals_shutdown() {
        let (handle, receiver) = ShutdownHandle::new();
        drop(handle);
        assert!(receiver.is_shutdown());
    }
}
