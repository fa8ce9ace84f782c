mod settings;

use std::io::{self, BufReader};
use std::path::PathBuf;
use std::process;

use clap::{Parser, ValueEnum};

use facetrail_core::alerting::domain::playback_action::PlaybackAction;
use facetrail_core::alerting::infrastructure::command_playback::CommandPlayback;
use facetrail_core::detection::domain::feature_detector::{Feature, FeatureDetector};
use facetrail_core::detection::infrastructure::onnx_yolo_detector::OnnxYoloDetector;
use facetrail_core::display::domain::display_surface::DisplaySurface;
use facetrail_core::display::domain::frame_preview::FramePreview;
use facetrail_core::display::infrastructure::canvas_surface::CanvasSurface;
#[cfg(feature = "window")]
use facetrail_core::display::infrastructure::window_preview::WindowPreview;
#[cfg(feature = "window")]
use facetrail_core::display::infrastructure::window_surface::WindowSurface;
use facetrail_core::pipeline::infrastructure::threaded_session_executor::ThreadedSessionExecutor;
use facetrail_core::pipeline::quit_listener::spawn_quit_listener;
use facetrail_core::pipeline::session_executor::{SessionExecutor, TrackingSession};
use facetrail_core::pipeline::session_logger::LogSessionLogger;
use facetrail_core::shared::constants::{YOLO_MODEL_NAME, YOLO_MODEL_URL};
use facetrail_core::shared::model_resolver::{self, ModelSource};
use facetrail_core::state::running_flag::{RunningFlag, StopReason};
use facetrail_core::video::domain::frame_source::{FrameSource, SourceMetadata};
use facetrail_core::video::infrastructure::ffmpeg_frame_source::FfmpegFrameSource;

use settings::{ConfigError, Settings};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Draw a trail that follows the tracked feature.
    Trail,
    /// Play a sound while the tracked feature is absent.
    Alert,
    /// Trail and alert together.
    Both,
}

impl Mode {
    fn default_feature(self) -> Feature {
        match self {
            Mode::Alert => Feature::Eyes,
            Mode::Trail | Mode::Both => Feature::Face,
        }
    }

    fn draws_trail(self) -> bool {
        matches!(self, Mode::Trail | Mode::Both)
    }

    fn raises_alert(self) -> bool {
        matches!(self, Mode::Alert | Mode::Both)
    }
}

/// Face and eye tracking: draws a trail that follows your head and sounds an
/// alert when you look away.
///
/// Type `q` and Enter, or press Ctrl-C, to quit.
#[derive(Parser)]
#[command(name = "facetrail")]
struct Cli {
    /// Video file, stream URL, or capture device (e.g. v4l2:/dev/video0).
    source: String,

    /// What to drive from the detections.
    #[arg(long, value_enum, default_value = "both")]
    mode: Mode,

    /// Feature to track: face or eyes (default: eyes for alert, face otherwise).
    #[arg(long)]
    feature: Option<Feature>,

    /// Settings file (default: the per-user settings.json, if present).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Trail surface width in pixels.
    #[arg(long)]
    width: Option<u32>,

    /// Trail surface height in pixels.
    #[arg(long)]
    height: Option<u32>,

    /// Screen pixels per pixel of detected motion.
    #[arg(long)]
    sensitivity: Option<f32>,

    /// Consecutive frames without the feature before the alert sounds.
    #[arg(long)]
    threshold: Option<u32>,

    /// Milliseconds between trail redraws.
    #[arg(long)]
    render_interval_ms: Option<u64>,

    /// Milliseconds between alert repeats while the feature is absent.
    #[arg(long)]
    alert_poll_ms: Option<u64>,

    /// Sound file played by the alert.
    #[arg(long)]
    sound: Option<PathBuf>,

    /// Audio player program invoked as `<player> [player args] <sound>`.
    #[arg(long)]
    player: Option<PathBuf>,

    /// Argument passed to the player before the sound path (repeatable).
    #[arg(long = "player-arg", allow_hyphen_values = true)]
    player_args: Vec<String>,

    /// Detection confidence threshold (0.0-1.0).
    #[arg(long)]
    confidence: Option<f64>,

    /// PNG file the trail is saved to.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Minimum milliseconds between trail snapshots.
    #[arg(long)]
    snapshot_interval_ms: Option<u64>,

    /// Draw the trail in a window instead of the PNG file.
    #[cfg(feature = "window")]
    #[arg(long)]
    window: bool,

    /// Show the camera with detection boxes in a window.
    #[cfg(feature = "window")]
    #[arg(long)]
    preview: bool,
}

impl Cli {
    /// Command-line values win over `base`.
    fn apply(&self, mut base: Settings) -> Settings {
        fn set<T: Clone>(target: &mut T, value: &Option<T>) {
            if let Some(v) = value {
                *target = v.clone();
            }
        }
        set(&mut base.surface_width, &self.width);
        set(&mut base.surface_height, &self.height);
        set(&mut base.sensitivity, &self.sensitivity);
        set(&mut base.absence_threshold, &self.threshold);
        set(&mut base.render_interval_ms, &self.render_interval_ms);
        set(&mut base.alert_poll_ms, &self.alert_poll_ms);
        set(&mut base.alert_sound, &self.sound);
        set(&mut base.player, &self.player);
        if !self.player_args.is_empty() {
            base.player_args = self.player_args.clone();
        }
        set(&mut base.confidence, &self.confidence);
        set(&mut base.canvas_output, &self.output);
        set(&mut base.snapshot_interval_ms, &self.snapshot_interval_ms);
        base
    }

    fn feature(&self) -> Feature {
        self.feature.unwrap_or(self.mode.default_feature())
    }

    #[cfg(feature = "window")]
    fn windowed(&self) -> bool {
        self.window
    }

    #[cfg(not(feature = "window"))]
    fn windowed(&self) -> bool {
        false
    }
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let settings = cli.apply(Settings::load(cli.config.as_deref())?);
    validate(&settings, cli.mode)?;

    let feature = cli.feature();
    let detector = build_detector(feature, settings.confidence)?;

    log::info!("Opening source: {}", cli.source);
    let mut source: Box<dyn FrameSource> = Box::new(FfmpegFrameSource::new());
    let metadata = source.open(&cli.source)?;
    log::info!("Source: {metadata}, tracking {feature}");

    let surface = if cli.mode.draws_trail() {
        Some(open_surface(&cli, &settings)?)
    } else {
        None
    };
    let preview = open_preview(&cli, &metadata)?;
    let playback = cli.mode.raises_alert().then(|| {
        log::info!(
            "Alert plays {} via {}",
            settings.alert_sound.display(),
            settings.player.display()
        );
        let player =
            CommandPlayback::new(settings.player.clone()).with_args(settings.player_args.clone());
        Box::new(player) as Box<dyn PlaybackAction>
    });

    let running = RunningFlag::new();
    let on_interrupt = running.clone();
    ctrlc::set_handler(move || {
        on_interrupt.stop(StopReason::UserQuit);
    })?;
    // Blocks on stdin until a line arrives; left detached.
    spawn_quit_listener(BufReader::new(io::stdin()), running.clone());
    log::info!("Type q and Enter (or press Ctrl-C) to quit");

    let session = TrackingSession {
        source,
        detector,
        surface,
        playback,
        preview,
    };
    let mut logger = LogSessionLogger::default();
    let summary = ThreadedSessionExecutor::new().execute(
        session,
        &settings.session_config(),
        running,
        &mut logger,
    )?;

    log::info!("Session finished: {summary}");
    if cli.mode.draws_trail() && !cli.windowed() {
        log::info!("Trail saved to {}", settings.canvas_output.display());
    }
    Ok(())
}

/// The trail window when requested, else the PNG canvas.
#[cfg_attr(not(feature = "window"), allow(unused_variables))]
fn open_surface(
    cli: &Cli,
    settings: &Settings,
) -> Result<Box<dyn DisplaySurface>, Box<dyn std::error::Error>> {
    #[cfg(feature = "window")]
    {
        if cli.window {
            log::info!("Drawing trail in a window; press q or Esc there to quit");
            return Ok(Box::new(WindowSurface::new(settings.surface_size())?));
        }
    }
    let canvas = CanvasSurface::new(
        settings.surface_size(),
        settings.canvas_output.clone(),
        settings.snapshot_interval(),
    )?;
    log::info!("Drawing trail to {}", canvas.output().display());
    Ok(Box::new(canvas))
}

#[cfg_attr(not(feature = "window"), allow(unused_variables))]
fn open_preview(
    cli: &Cli,
    metadata: &SourceMetadata,
) -> Result<Option<Box<dyn FramePreview>>, Box<dyn std::error::Error>> {
    #[cfg(feature = "window")]
    {
        if cli.preview {
            log::info!("Showing camera preview; press q or Esc there to quit");
            let preview = WindowPreview::new(metadata.width, metadata.height)?;
            return Ok(Some(Box::new(preview)));
        }
    }
    Ok(None)
}

fn build_detector(
    feature: Feature,
    confidence: f64,
) -> Result<Box<dyn FeatureDetector>, Box<dyn std::error::Error>> {
    log::info!("Resolving model: {YOLO_MODEL_NAME}");
    let bundled = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join("models")));
    let model_path = model_resolver::resolve(
        &ModelSource {
            name: YOLO_MODEL_NAME,
            url: YOLO_MODEL_URL,
        },
        bundled.as_deref(),
        Some(Box::new(download_progress)),
    )?;

    Ok(Box::new(OnnxYoloDetector::new(
        &model_path,
        feature,
        confidence,
    )?))
}

fn validate(settings: &Settings, mode: Mode) -> Result<(), ConfigError> {
    settings.validate()?;
    if mode.raises_alert() && !settings.alert_sound.is_file() {
        return Err(ConfigError::Invalid(format!(
            "Alert sound not found: {}",
            settings.alert_sound.display()
        )));
    }
    Ok(())
}

fn download_progress(downloaded: u64, total: u64) {
    if total > 0 {
        let pct = (downloaded as f64 / total as f64 * 100.0) as u32;
        eprint!("\rDownloading detection model... {pct}%");
        if downloaded >= total {
            eprintln!();
        }
    } else {
        eprint!("\rDownloading detection model... {downloaded} bytes");
    }
}
