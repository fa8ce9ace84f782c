use crate::shared::point::{Point, SurfaceSize};

/// Maps detected motion (relative to a calibration origin) onto the
/// display surface.
///
/// Horizontal motion is mirrored and both axes are offset so that the
/// origin itself lands on the surface center:
///
/// ```text
/// x = W - ((c.x - o.x) * s + W / 2)
/// y =      (c.y - o.y) * s + H / 2
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DisplayMapping {
    surface: SurfaceSize,
    sensitivity: f32,
}

impl DisplayMapping {
    pub fn new(surface: SurfaceSize, sensitivity: f32) -> Result<Self, &'static str> {
        if !sensitivity.is_finite() || sensitivity <= 0.0 {
            return Err("sensitivity must be a positive finite number");
        }
        if surface.width == 0 || surface.height == 0 {
            return Err("surface dimensions must be non-zero");
        }
        Ok(Self {
            surface,
            sensitivity,
        })
    }

    pub fn map(&self, center: Point, origin: Point) -> Point {
        let w = self.surface.width as f32;
        let h = self.surface.height as f32;
        let s = self.sensitivity;
        Point::new(
            w - ((center.x - origin.x) * s + w / 2.0),
            (center.y - origin.y) * s + h / 2.0,
        )
    }
}
