use crate::display::domain::display_surface::SurfaceEvent;
use crate::shared::frame::Frame;
use crate::shared::region::DetectionRegion;

/// Live view of the camera with the regions found on each frame.
///
/// Called from the detection thread once per detected frame.
pub trait FramePreview: Send {
    /// Shows `frame` with `regions` outlined and returns events queued
    /// since the previous call.
    fn show(&mut self, frame: &Frame, regions: &[DetectionRegion]) -> Vec<SurfaceEvent>;

    /// Called once, after the detection loop has stopped.
    fn close(&mut self) -> Result<(), Box<dyn std::error::Error>>;
}
