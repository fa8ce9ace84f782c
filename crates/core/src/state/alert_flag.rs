//! Published alert flag with a transition wake-up.
//!
//! The debounce state machine owns the single [`AlertWriter`]. Readers load
//! the flag atomically and may block on [`AlertReader::wait_for_change`],
//! which returns as soon as the writer flips the flag or the timeout lapses.
//! The wake channel holds at most one pending signal and the writer uses
//! `try_send`, so publishing never blocks the detection thread.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender};

pub fn alert_flag() -> (AlertWriter, AlertReader) {
    let flag = Arc::new(AtomicBool::new(false));
    let (wake_tx, wake_rx) = crossbeam_channel::bounded(1);
    (
        AlertWriter {
            flag: flag.clone(),
            wake: wake_tx,
        },
        AlertReader {
            flag,
            wake: wake_rx,
        },
    )
}

/// Sole write end. Deliberately not `Clone`.
pub struct AlertWriter {
    flag: Arc<AtomicBool>,
    wake: Sender<()>,
}

impl AlertWriter {
    /// Publishes `alert`. Returns `true` when the value changed.
    pub fn set(&self, alert: bool) -> bool {
        let previous = self.flag.swap(alert, Ordering::AcqRel);
        if previous == alert {
            return false;
        }
        // Full means a wake is already pending.
        let _ = self.wake.try_send(());
        true
    }
}

/// Read end. Clones share one wake channel, so with several waiting readers
/// only one of them is woken per transition; the rest fall back to their
/// timeout.
#[derive(Clone)]
pub struct AlertReader {
    flag: Arc<AtomicBool>,
    wake: Receiver<()>,
}

impl AlertReader {
    pub fn is_alerting(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }

    /// Blocks until the flag changes or `timeout` elapses.
    /// Returns `true` if woken by a transition.
    pub fn wait_for_change(&self, timeout: Duration) -> bool {
        self.wake.recv_timeout(timeout).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn test_starts_clear() {
        let (_writer, reader) = alert_flag();
        assert!(!reader.is_alerting());
    }

    #[test]
    fn test_set_reports_change_only_on_transition() {
        let (writer, reader) = alert_flag();
        assert!(writer.set(true));
        assert!(!writer.set(true));
        assert!(reader.is_alerting());
        assert!(writer.set(false));
        assert!(!writer.set(false));
        assert!(!reader.is_alerting());
    }

    #[test]
    fn test_transition_wakes_waiter() {
        let (writer, reader) = alert_flag();
        writer.set(true);
        assert!(reader.wait_for_change(Duration::from_secs(5)));
    }

    #[test]
    fn test_wait_times_out_without_transition() {
        let (writer, reader) = alert_flag();
        writer.set(false); // no change, no wake
        let start = Instant::now();
        assert!(!reader.wait_for_change(Duration::from_millis(20)));
        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn test_pending_wakes_coalesce() {
        let (writer, reader) = alert_flag();
        writer.set(true);
        writer.set(false);
        writer.set(true);
        assert!(reader.wait_for_change(Duration::from_millis(10)));
        assert!(!reader.wait_for_change(Duration::from_millis(10)));
        assert!(reader.is_alerting());
    }

    #[test]
    fn test_waiter_on_other_thread_is_woken() {
        let (writer, reader) = alert_flag();
        let handle = std::thread::spawn(move || reader.wait_for_change(Duration::from_secs(5)));
        std::thread::sleep(Duration::from_millis(10));
        writer.set(true);
        assert!(handle.join().unwrap());
    }

    #[test]
    fn test_set_after_readers_dropped_does_not_panic() {
        let (writer, reader) = alert_flag();
        drop(reader);
        assert!(writer.set(true));
    }
}
