use crate::display::domain::display_surface::SurfaceEvent;
use crate::display::domain::frame_preview::FramePreview;
use crate::display::infrastructure::raster;
use crate::display::infrastructure::window_thread::{WindowError, WindowThread};
use crate::shared::frame::Frame;
use crate::shared::region::DetectionRegion;

/// Camera window with a green box around every detected region.
pub struct WindowPreview {
    window: WindowThread,
    width: u32,
    height: u32,
}

impl WindowPreview {
    /// Sized to the source; frames of any other size are not shown.
    pub fn new(width: u32, height: u32) -> Result<Self, WindowError> {
        Ok(Self {
            window: WindowThread::spawn("FaceTrail camera", width, height)?,
            width,
            height,
        })
    }
}

impl FramePreview for WindowPreview {
    fn show(&mut self, frame: &Frame, regions: &[DetectionRegion]) -> Vec<SurfaceEvent> {
        if (frame.width(), frame.height()) == (self.width, self.height) {
            if let Some(image) = raster::annotate(frame, regions) {
                self.window.show(raster::to_argb(&image));
            }
        }
        self.window.events()
    }

    fn close(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.window.close()?;
        Ok(())
    }
}
