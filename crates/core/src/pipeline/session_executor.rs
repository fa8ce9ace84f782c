use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::alerting::domain::playback_action::PlaybackAction;
use crate::detection::domain::feature_detector::FeatureDetector;
use crate::display::domain::display_surface::DisplaySurface;
use crate::display::domain::frame_preview::FramePreview;
use crate::pipeline::session_logger::SessionLogger;
use crate::shared::constants::{
    DEFAULT_ABSENCE_THRESHOLD, DEFAULT_ALERT_POLL_MS, DEFAULT_ALERT_SOUND,
    DEFAULT_RENDER_INTERVAL_MS, DEFAULT_SENSITIVITY, DEFAULT_SURFACE_HEIGHT,
    DEFAULT_SURFACE_WIDTH,
};
use crate::shared::point::SurfaceSize;
use crate::state::running_flag::{RunningFlag, StopReason};
use crate::video::domain::frame_source::FrameSource;

/// Session-level knobs shared by all modes.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionConfig {
    pub surface_size: SurfaceSize,
    pub sensitivity: f32,
    /// Consecutive absent frames before the alert is raised.
    pub absence_threshold: u32,
    pub render_interval: Duration,
    pub alert_poll_interval: Duration,
    pub alert_resource: PathBuf,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            surface_size: SurfaceSize::new(DEFAULT_SURFACE_WIDTH, DEFAULT_SURFACE_HEIGHT),
            sensitivity: DEFAULT_SENSITIVITY,
            absence_threshold: DEFAULT_ABSENCE_THRESHOLD,
            render_interval: Duration::from_millis(DEFAULT_RENDER_INTERVAL_MS),
            alert_poll_interval: Duration::from_millis(DEFAULT_ALERT_POLL_MS),
            alert_resource: PathBuf::from(DEFAULT_ALERT_SOUND),
        }
    }
}

/// The collaborators of one run.
///
/// `source` must already be opened. A `surface` enables position tracking
/// and the render loop; a `playback` enables the alert machine and the
/// alert loop. A `preview` is shown every detected frame, from the
/// detection thread.
pub struct TrackingSession {
    pub source: Box<dyn FrameSource>,
    pub detector: Box<dyn FeatureDetector>,
    pub surface: Option<Box<dyn DisplaySurface>>,
    pub playback: Option<Box<dyn PlaybackAction>>,
    pub preview: Option<Box<dyn FramePreview>>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SessionSummary {
    /// Frames whose detections reached the components.
    pub frames_processed: usize,
    pub frames_with_detection: usize,
    /// Frames dropped because the detector failed on them.
    pub frames_skipped: usize,
    /// Clear -> Alerting transitions.
    pub alert_activations: usize,
    pub stop_reason: Option<StopReason>,
}

impl fmt::Display for SessionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} frame(s) processed, {} with detections, {} skipped, {} alert(s)",
            self.frames_processed,
            self.frames_with_detection,
            self.frames_skipped,
            self.alert_activations
        )?;
        if let Some(reason) = self.stop_reason {
            write!(f, "; stopped: {reason}")?;
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("invalid session configuration: {0}")]
    Config(&'static str),
    #[error("frame source failed: {0}")]
    Source(String),
    #[error("{0} thread panicked")]
    ThreadPanicked(&'static str),
}

/// Runs a session to completion.
///
/// Infrastructure decides how the detection path and the actuator loops
/// are scheduled. Stopping is cooperative through `running`.
pub trait SessionExecutor {
    fn execute(
        &self,
        session: TrackingSession,
        config: &SessionConfig,
        running: RunningFlag,
        logger: &mut dyn SessionLogger,
    ) -> Result<SessionSummary, SessionError>;
}
