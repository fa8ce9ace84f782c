use image::RgbImage;

use crate::display::domain::display_surface::{DisplaySurface, SurfaceEvent};
use crate::display::infrastructure::raster::{self, BACKGROUND};
use crate::display::infrastructure::window_thread::{WindowError, WindowThread};
use crate::shared::point::{Point, SurfaceSize};

/// Live trail in a native window.
///
/// Same white canvas and black trail as the PNG surface. Closing the
/// window reports [`SurfaceEvent::Close`]; `q` or Escape reports
/// [`SurfaceEvent::Quit`].
pub struct WindowSurface {
    canvas: RgbImage,
    window: WindowThread,
}

impl WindowSurface {
    pub fn new(size: SurfaceSize) -> Result<Self, WindowError> {
        let window = WindowThread::spawn("FaceTrail", size.width, size.height)?;
        Ok(Self {
            canvas: RgbImage::from_pixel(size.width, size.height, BACKGROUND),
            window,
        })
    }
}

impl DisplaySurface for WindowSurface {
    fn poll_events(&mut self) -> Vec<SurfaceEvent> {
        self.window.events()
    }

    fn draw_line(&mut self, from: Point, to: Point) {
        raster::draw_segment(&mut self.canvas, from, to);
    }

    fn draw_point(&mut self, at: Point) {
        raster::draw_segment(&mut self.canvas, at, at);
    }

    /// Never fails: a window closed by the user shows up as an event.
    fn present(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.window.show(raster::to_argb(&self.canvas));
        Ok(())
    }

    fn close(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.window.close()?;
        Ok(())
    }
}
