use std::time::Instant;

use crate::alerting::domain::debounce_alert::AlertTransition;
use crate::shared::region::DetectionRegion;

/// Observer for session events on the detection thread.
///
/// Keeps the executor independent of how progress is reported.
pub trait SessionLogger: Send {
    /// One frame was detected and fed to the components.
    fn frame(&mut self, index: usize, regions: &[DetectionRegion], detect_ms: f64);

    /// The alert flag flipped.
    fn alert(&mut self, transition: AlertTransition);

    fn info(&mut self, message: &str);

    /// End-of-session report. Default: no-op.
    fn summary(&self) {}
}

/// Discards everything.
pub struct NullSessionLogger;

impl SessionLogger for NullSessionLogger {
    fn frame(&mut self, _index: usize, _regions: &[DetectionRegion], _detect_ms: f64) {}
    fn alert(&mut self, _transition: AlertTransition) {}
    fn info(&mut self, _message: &str) {}
}

/// Reports through the `log` facade.
///
/// Per-frame progress is throttled to every `throttle_frames` frames.
/// Detection timing is kept as running totals, so memory stays flat on
/// unbounded live streams.
pub struct LogSessionLogger {
    throttle_frames: usize,
    start_time: Instant,
    frames: usize,
    frames_with_detection: usize,
    detect_total_ms: f64,
    detect_max_ms: f64,
    alerts_raised: usize,
}

impl LogSessionLogger {
    pub fn new(throttle_frames: usize) -> Self {
        Self {
            throttle_frames: throttle_frames.max(1),
            start_time: Instant::now(),
            frames: 0,
            frames_with_detection: 0,
            detect_total_ms: 0.0,
            detect_max_ms: 0.0,
            alerts_raised: 0,
        }
    }

    /// Formatted summary, or `None` before the first frame.
    pub fn summary_string(&self) -> Option<String> {
        if self.frames == 0 {
            return None;
        }
        let elapsed_s = self.start_time.elapsed().as_secs_f64();
        let frames = self.frames as f64;
        let mut lines = vec![format!(
            "Session summary ({} frames, {elapsed_s:.1}s):",
            self.frames
        )];
        lines.push(format!(
            "  detect       : avg {:6.1}ms  max {:6.1}ms",
            self.detect_total_ms / frames,
            self.detect_max_ms
        ));
        lines.push(format!(
            "  detection rate: {:.1}%",
            self.frames_with_detection as f64 / frames * 100.0
        ));
        lines.push(format!("  alerts raised: {}", self.alerts_raised));
        if elapsed_s > 0.0 {
            lines.push(format!("  Throughput: {:.1} fps", frames / elapsed_s));
        }
        Some(lines.join("\n"))
    }
}

impl Default for LogSessionLogger {
    fn default() -> Self {
        Self::new(30)
    }
}

impl SessionLogger for LogSessionLogger {
    fn frame(&mut self, index: usize, regions: &[DetectionRegion], detect_ms: f64) {
        self.frames += 1;
        if !regions.is_empty() {
            self.frames_with_detection += 1;
        }
        self.detect_total_ms += detect_ms;
        self.detect_max_ms = self.detect_max_ms.max(detect_ms);

        if self.frames % self.throttle_frames == 0 {
            log::info!(
                "Frame {index}: {} region(s), detect {detect_ms:.1}ms",
                regions.len()
            );
        }
    }

    fn alert(&mut self, transition: AlertTransition) {
        match transition {
            AlertTransition::Raised { absent_frames } => {
                self.alerts_raised += 1;
                log::info!("Alert raised after {absent_frames} absent frame(s)");
            }
            AlertTransition::Cleared => log::info!("Alert cleared"),
        }
    }

    fn info(&mut self, message: &str) {
        log::info!("{message}");
    }

    fn summary(&self) {
        if let Some(text) = self.summary_string() {
            log::info!("\n\n{text}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn region() -> DetectionRegion {
        DetectionRegion::new(0, 0, 10, 10)
    }

    #[test]
    fn test_null_logger_is_noop() {
        let mut logger = NullSessionLogger;
        logger.frame(0, &[region()], 1.0);
        logger.alert(AlertTransition::Cleared);
        logger.info("hello");
        logger.summary();
    }

    #[test]
    fn test_empty_summary_is_none() {
        assert!(LogSessionLogger::default().summary_string().is_none());
    }

    #[test]
    fn test_accumulates_detect_stats() {
        let mut logger = LogSessionLogger::new(10);
        logger.frame(0, &[region()], 10.0);
        logger.frame(1, &[], 30.0);
        logger.frame(2, &[region(), region()], 20.0);

        assert_eq!(logger.frames, 3);
        assert_eq!(logger.frames_with_detection, 2);
        assert_relative_eq!(logger.detect_total_ms, 60.0);
        assert_relative_eq!(logger.detect_max_ms, 30.0);
    }

    #[test]
    fn test_summary_contents() {
        let mut logger = LogSessionLogger::new(10);
        logger.frame(0, &[region()], 10.0);
        logger.frame(1, &[], 30.0);
        logger.alert(AlertTransition::Raised { absent_frames: 10 });
        logger.alert(AlertTransition::Cleared);

        let text = logger.summary_string().unwrap();
        assert!(text.contains("Session summary (2 frames"));
        assert!(text.contains("avg   20.0ms"));
        assert!(text.contains("detection rate: 50.0%"));
        assert!(text.contains("alerts raised: 1"));
    }

    #[test]
    fn test_zero_throttle_is_clamped() {
        let logger = LogSessionLogger::new(0);
        assert_eq!(logger.throttle_frames, 1);
    }
}
