//! Testing utilities shared by the test modules of this crate.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, mpsc};
use std::task::{Wake, Waker};
use std::thread;
use std::time::Duration;

/// Runs a test with a 10-second timeout to prevent infinite hangs.
/// If the test does not complete within 10 seconds, the function will panic.
pub(crate) fn with_watchdog<F, R>(test_fn: F) -> R
where
    F: FnOnce() -> R + Send + 'static,
    R: Send + 'static,
{
    let (tx, rx) = mpsc::channel();

    let test_handle = thread::spawn(move || {
        let result = test_fn();
        // If this fails, the receiver has already timed out.
        drop(tx.send(result));
    });

    match rx.recv_timeout(Duration::from_secs(10)) {
        Ok(result) => {
            test_handle.join().expect("Test thread should not panic");
            result
        }
        Err(mpsc::RecvTimeoutError::Timeout) => {
            panic!("Test exceeded 10-second timeout - likely stuck awaiting an event");
        }
        Err(mpsc::RecvTimeoutError::Disconnected) => match test_handle.join() {
            Ok(()) => panic!("Test thread disconnected unexpectedly"),
            Err(e) => std::panic::resume_unwind(e),
        },
    }
}

/// Counts how many times the paired waker has been woken.
#[derive(Clone, Debug)]
pub(crate) struct WakeCounter(Arc<CountingWake>);

impl WakeCounter {
    pub(crate) fn get(&self) -> usize {
        self.0.count.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Default)]
pub(crate) struct CountingWake {
    count: AtomicUsize,
}

impl Wake for CountingWake {
    fn wake(self: Arc<Self>) {
        self.wake_by_ref();
    }

    fn wake_by_ref(self: &Arc<Self>) {
        self.count.fetch_add(1, Ordering::Relaxed);
    }
}

/// Creates a waker that records wake-ups, together with the counter observing it.
pub(crate) fn counting_waker() -> (Waker, WakeCounter) {
    let wake = Arc::new(CountingWake::default());

    (Waker::from(Arc::clone(&wake)), WakeCounter(wake))
}
