use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::alerting::domain::playback_action::PlaybackAction;
use crate::pipeline::failure_streak::FailureStreak;
use crate::state::alert_flag::AlertReader;
use crate::state::running_flag::RunningFlag;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PlaybackStats {
    pub attempts: u64,
    pub failures: u64,
}

/// Plays the alert sound while the alert flag is raised.
///
/// Idle waits block on the flag's transition signal, so a newly raised
/// alert plays at once; while it stays raised the sound repeats once per
/// poll interval. Shutdown is noticed within one poll interval plus any
/// in-flight playback.
pub struct AlertLoop {
    playback: Box<dyn PlaybackAction>,
    alert: AlertReader,
    running: RunningFlag,
    poll_interval: Duration,
    resource: PathBuf,
}

impl AlertLoop {
    pub fn new(
        playback: Box<dyn PlaybackAction>,
        alert: AlertReader,
        running: RunningFlag,
        poll_interval: Duration,
        resource: PathBuf,
    ) -> Self {
        Self {
            playback,
            alert,
            running,
            poll_interval,
            resource,
        }
    }

    pub fn run(mut self) -> PlaybackStats {
        let mut stats = PlaybackStats::default();
        let mut streak = FailureStreak::new("Alert playback");

        while self.running.is_running() {
            if !self.alert.is_alerting() {
                self.alert.wait_for_change(self.poll_interval);
                continue;
            }

            let started = Instant::now();
            stats.attempts += 1;
            if !streak.record(self.playback.play(&self.resource)) {
                stats.failures += 1;
            }

            // Back-to-back when playback outlasts the interval.
            if let Some(remaining) = self.poll_interval.checked_sub(started.elapsed()) {
                self.alert.wait_for_change(remaining);
            }
        }

        log::debug!(
            "Alert loop exited: {} playback(s), {} failed",
            stats.attempts,
            stats.failures
        );
        stats
    }
}
