pub const YOLO_MODEL_NAME: &str = "yolo11n-pose_widerface.onnx";
pub const YOLO_MODEL_URL: &str =
    "https://github.com/neutrinographics/faceguard/releases/download/v0.1.0/yolo11n-pose_widerface.onnx";

/// Directory name under the platform cache/config dirs.
pub const APP_DIR_NAME: &str = "FaceTrail";

pub const DEFAULT_SURFACE_WIDTH: u32 = 640;
pub const DEFAULT_SURFACE_HEIGHT: u32 = 480;

/// Screen pixels per pixel of detected motion.
pub const DEFAULT_SENSITIVITY: f32 = 3.0;

/// Consecutive feature-absent frames before the alert fires (~1/3 s at 30 fps).
pub const DEFAULT_ABSENCE_THRESHOLD: u32 = 10;

pub const DEFAULT_RENDER_INTERVAL_MS: u64 = 10;
pub const DEFAULT_ALERT_POLL_MS: u64 = 50;
pub const DEFAULT_SNAPSHOT_INTERVAL_MS: u64 = 1000;

pub const DEFAULT_ALERT_SOUND: &str = "alert.wav";
pub const DEFAULT_CANVAS_OUTPUT: &str = "trail.png";

#[cfg(target_os = "macos")]
pub const DEFAULT_PLAYER: &str = "afplay";
#[cfg(not(target_os = "macos"))]
pub const DEFAULT_PLAYER: &str = "aplay";
