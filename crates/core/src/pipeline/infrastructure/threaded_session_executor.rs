use std::thread::JoinHandle;
use std::time::Instant;

use crate::alerting::domain::debounce_alert::{AlertTransition, DebounceAlert};
use crate::detection::domain::feature_detector::FeatureDetector;
use crate::display::domain::display_surface::DisplaySurface;
use crate::display::domain::frame_preview::FramePreview;
use crate::pipeline::alert_loop::{AlertLoop, PlaybackStats};
use crate::pipeline::frame_processor::FrameProcessor;
use crate::pipeline::render_loop::RenderLoop;
use crate::pipeline::session_executor::{
    SessionConfig, SessionError, SessionExecutor, SessionSummary, TrackingSession,
};
use crate::pipeline::session_logger::SessionLogger;
use crate::state::running_flag::{RunningFlag, StopReason};
use crate::state::shared_state::SharedState;
use crate::tracking::domain::display_mapping::DisplayMapping;
use crate::tracking::domain::position_tracker::PositionTracker;
use crate::video::domain::frame_source::FrameSource;

/// Runs detection on the calling thread and each actuator loop on its own.
///
/// Layout: `caller [source -> detect -> track/debounce] | render | alert`
///
/// The loops never wait on detection: they read the latest published
/// values at their own cadence. Every loop is joined before anything is
/// closed.
pub struct ThreadedSessionExecutor;

impl ThreadedSessionExecutor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ThreadedSessionExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionExecutor for ThreadedSessionExecutor {
    fn execute(
        &self,
        session: TrackingSession,
        config: &SessionConfig,
        running: RunningFlag,
        logger: &mut dyn SessionLogger,
    ) -> Result<SessionSummary, SessionError> {
        let TrackingSession {
            mut source,
            mut detector,
            surface,
            playback,
            mut preview,
        } = session;

        let center = config.surface_size.center();
        let shared = SharedState::new(center, running);
        let running = shared.running.clone();

        let tracker = surface
            .is_some()
            .then(|| DisplayMapping::new(config.surface_size, config.sensitivity))
            .transpose()
            .map(|mapping| mapping.map(|m| PositionTracker::new(m, shared.position)));
        let debounce = playback
            .is_some()
            .then(|| DebounceAlert::new(config.absence_threshold, shared.alert))
            .transpose();
        let (tracker, debounce) = match (tracker, debounce, validate_intervals(config)) {
            (Ok(t), Ok(d), Ok(())) => (t, d),
            (Err(e), _, _) | (_, Err(e), _) | (_, _, Err(e)) => {
                source.close();
                return Err(SessionError::Config(e));
            }
        };
        let mut processor = FrameProcessor::new(tracker, debounce);

        let render_handle = surface.map(|surface| {
            logger.info("Starting render loop");
            let render = RenderLoop::new(
                surface,
                shared.position_reader,
                running.clone(),
                config.render_interval,
                center,
            );
            spawn_actuator(&running, move || render.run())
        });
        let alert_handle = playback.map(|playback| {
            logger.info("Starting alert loop");
            let alert = AlertLoop::new(
                playback,
                shared.alert_reader,
                running.clone(),
                config.alert_poll_interval,
                config.alert_resource.clone(),
            );
            spawn_actuator(&running, move || alert.run())
        });

        let (mut summary, source_error) = run_detection_loop(
            &mut *source,
            &mut *detector,
            &mut processor,
            &mut preview,
            &running,
            logger,
        );

        let joined = join_threads(render_handle, alert_handle);

        source.close();
        if let Some(mut preview) = preview {
            if let Err(e) = preview.close() {
                log::warn!("Failed to close preview: {e}");
            }
        }
        if let Some(mut surface) = joined.surface {
            if let Err(e) = surface.close() {
                log::warn!("Failed to close display surface: {e}");
            }
        }
        if let Some(stats) = joined.playback {
            log::debug!(
                "Alert playback: {} attempt(s), {} failed",
                stats.attempts,
                stats.failures
            );
        }

        summary.stop_reason = running.stop_reason();
        logger.summary();

        if let Some(e) = source_error {
            return Err(SessionError::Source(e));
        }
        if let Some(thread) = joined.panicked {
            return Err(SessionError::ThreadPanicked(thread));
        }
        Ok(summary)
    }
}

fn validate_intervals(config: &SessionConfig) -> Result<(), &'static str> {
    if config.render_interval.is_zero() {
        return Err("render interval must be non-zero");
    }
    if config.alert_poll_interval.is_zero() {
        return Err("alert poll interval must be non-zero");
    }
    Ok(())
}

/// Stops the session if the owning thread unwinds, so the detection loop
/// does not outlive a dead actuator.
struct StopOnPanic(RunningFlag);

impl Drop for StopOnPanic {
    fn drop(&mut self) {
        if std::thread::panicking() {
            self.0.stop(StopReason::ActuatorPanicked);
        }
    }
}

fn spawn_actuator<T, F>(running: &RunningFlag, body: F) -> JoinHandle<T>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    let guard = StopOnPanic(running.clone());
    std::thread::spawn(move || {
        let _guard = guard;
        body()
    })
}

/// Pulls frames until the stream ends or the session is stopped elsewhere.
///
/// Returns the counters and, if the source failed mid-run, its error.
fn run_detection_loop(
    source: &mut dyn FrameSource,
    detector: &mut dyn FeatureDetector,
    processor: &mut FrameProcessor,
    preview: &mut Option<Box<dyn FramePreview>>,
    running: &RunningFlag,
    logger: &mut dyn SessionLogger,
) -> (SessionSummary, Option<String>) {
    let mut summary = SessionSummary::default();

    while running.is_running() {
        let frame = match source.next_frame() {
            None => {
                running.stop(StopReason::EndOfStream);
                break;
            }
            Some(Err(e)) => {
                log::error!("Frame source failed: {e}");
                running.stop(StopReason::SourceFailed);
                return (summary, Some(e.to_string()));
            }
            Some(Ok(frame)) if frame.is_empty() => {
                running.stop(StopReason::EndOfStream);
                break;
            }
            Some(Ok(frame)) => frame,
        };

        let started = Instant::now();
        let regions = match detector.detect(&frame) {
            Ok(regions) => regions,
            Err(e) => {
                log::warn!("Detection failed on frame {}: {e}", frame.index());
                summary.frames_skipped += 1;
                continue;
            }
        };
        let detect_ms = started.elapsed().as_secs_f64() * 1000.0;

        summary.frames_processed += 1;
        if !regions.is_empty() {
            summary.frames_with_detection += 1;
        }
        logger.frame(frame.index(), &regions, detect_ms);

        if let Some(transition) = processor.process(&regions).transition {
            if matches!(transition, AlertTransition::Raised { .. }) {
                summary.alert_activations += 1;
            }
            logger.alert(transition);
        }

        if let Some(preview) = preview.as_mut() {
            if let Some(event) = preview.show(&frame, &regions).into_iter().next() {
                running.stop(event.stop_reason());
            }
        }
    }

    (summary, None)
}

struct Joined {
    surface: Option<Box<dyn DisplaySurface>>,
    playback: Option<PlaybackStats>,
    panicked: Option<&'static str>,
}

/// Joins every actuator thread, remembering the first one that panicked.
fn join_threads(
    render_handle: Option<JoinHandle<Box<dyn DisplaySurface>>>,
    alert_handle: Option<JoinHandle<PlaybackStats>>,
) -> Joined {
    let mut joined = Joined {
        surface: None,
        playback: None,
        panicked: None,
    };

    if let Some(handle) = render_handle {
        match handle.join() {
            Ok(surface) => joined.surface = Some(surface),
            Err(_) => {
                log::error!("Render thread panicked");
                joined.panicked = Some("render");
            }
        }
    }
    if let Some(handle) = alert_handle {
        match handle.join() {
            Ok(stats) => joined.playback = Some(stats),
            Err(_) => {
                log::error!("Alert thread panicked");
                if joined.panicked.is_none() {
                    joined.panicked = Some("alert");
                }
            }
        }
    }

    joined
}
