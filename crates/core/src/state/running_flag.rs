use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;

/// Why a session stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum StopReason {
    EndOfStream = 1,
    UserQuit = 2,
    WindowClosed = 3,
    SourceFailed = 4,
    ActuatorPanicked = 5,
}

impl StopReason {
    fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::EndOfStream),
            2 => Some(Self::UserQuit),
            3 => Some(Self::WindowClosed),
            4 => Some(Self::SourceFailed),
            5 => Some(Self::ActuatorPanicked),
            _ => None,
        }
    }
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StopReason::EndOfStream => write!(f, "end of stream"),
            StopReason::UserQuit => write!(f, "user quit"),
            StopReason::WindowClosed => write!(f, "window closed"),
            StopReason::SourceFailed => write!(f, "frame source failed"),
            StopReason::ActuatorPanicked => write!(f, "actuator thread panicked"),
        }
    }
}

struct Inner {
    running: AtomicBool,
    reason: AtomicU8,
}

/// Session-wide run flag: starts true, goes false exactly once, never resets.
///
/// Clones share the same flag. Every long-running loop checks
/// [`is_running`](Self::is_running) once per iteration.
#[derive(Clone)]
pub struct RunningFlag {
    inner: Arc<Inner>,
}

impl RunningFlag {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                running: AtomicBool::new(true),
                reason: AtomicU8::new(0),
            }),
        }
    }

    pub fn is_running(&self) -> bool {
        self.inner.running.load(Ordering::Acquire)
    }

    /// Clears the flag. Returns `true` only for the call that actually
    /// stopped the session; its reason is the one recorded.
    pub fn stop(&self, reason: StopReason) -> bool {
        let won = self
            .inner
            .reason
            .compare_exchange(0, reason as u8, Ordering::AcqRel, Ordering::Acquire)
            .is_ok();
        self.inner.running.store(false, Ordering::Release);
        if won {
            log::info!("Stopping: {reason}");
        }
        won
    }

    /// Reason recorded by the first [`stop`](Self::stop), if any.
    pub fn stop_reason(&self) -> Option<StopReason> {
        StopReason::from_u8(self.inner.reason.load(Ordering::Acquire))
    }
}

impl Default for RunningFlag {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RunningFlag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunningFlag")
            .field("running", &self.is_running())
            .field("reason", &self.stop_reason())
            .finish()
    }
}
