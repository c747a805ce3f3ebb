//! Stop signal shared by every blocking wait.
//!
//! A `Shutdown` is a channel nobody ever sends on. Triggering it drops the
//! only sender, which disconnects every receiver at once: anything blocked in
//! `select!` on `signal()` wakes up, and `is_triggered` flips for good.

use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender, TryRecvError};
use parking_lot::Mutex;

/// Broadcast-by-disconnect stop signal. Clones observe the same signal.
#[derive(Clone, Debug)]
pub struct Shutdown {
    trigger: Arc<Mutex<Option<Sender<()>>>>,
    signal: Receiver<()>,
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

impl Shutdown {
    #[must_use]
    pub fn new() -> Self {
        let (tx, rx) = bounded(0);
        Self {
            trigger: Arc::new(Mutex::new(Some(tx))),
            signal: rx,
        }
    }

    /// Wake every waiter. Idempotent.
    pub fn trigger(&self) {
        self.trigger.lock().take();
    }

    #[must_use]
    pub fn is_triggered(&self) -> bool {
        matches!(self.signal.try_recv(), Err(TryRecvError::Disconnected))
    }

    /// Receiver that becomes ready (disconnected) once triggered, for use in
    /// `crossbeam_channel::select!`.
    #[must_use]
    pub fn signal(&self) -> &Receiver<()> {
        &self.signal
    }

    /// Sleep for `timeout` unless triggered first. Returns `true` if the
    /// signal fired.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        match self.signal.recv_timeout(timeout) {
            Err(RecvTimeoutError::Timeout) => false,
            Ok(()) | Err(RecvTimeoutError::Disconnected) => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::thread;
    use std::time::Instant;

    use super::*;

    #[test]
    fn test_trigger_is_shared_by_clones() {
        let shutdown = Shutdown::new();
        let observer = shutdown.clone();
        assert!(!observer.is_triggered());

        shutdown.trigger();
        shutdown.trigger();
        assert!(observer.is_triggered());
        assert!(observer.wait_timeout(Duration::from_secs(5)));
    }

    #[test]
    fn test_wait_timeout_elapses() {
        let shutdown = Shutdown::new();
        let start = Instant::now();
        assert!(!shutdown.wait_timeout(Duration::from_millis(20)));
        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn test_trigger_wakes_blocked_thread() {
        let shutdown = Shutdown::new();
        let waiter = {
            let shutdown = shutdown.clone();
            thread::spawn(move || shutdown.wait_timeout(Duration::from_secs(10)))
        };
        thread::sleep(Duration::from_millis(10));
        shutdown.trigger();
        assert!(waiter.join().unwrap());
    }
}
