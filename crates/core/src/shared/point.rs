/// A point in pixel coordinates (frame or display surface, depending on use).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Packs both coordinates into one word so they can be published atomically.
    pub(crate) fn to_bits(self) -> u64 {
        ((self.x.to_bits() as u64) << 32) | self.y.to_bits() as u64
    }

    pub(crate) fn from_bits(bits: u64) -> Self {
        Self {
            x: f32::from_bits((bits >> 32) as u32),
            y: f32::from_bits(bits as u32),
        }
    }
}

/// Pixel dimensions of the display surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

impl SurfaceSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> Point {
        Point::new(self.width as f32 / 2.0, self.height as f32 / 2.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_bits_preserve_both_coordinates() {
        let p = Point::new(-12.25, 480.5);
        assert_eq!(Point::from_bits(p.to_bits()), p);
    }

    #[test]
    fn test_bits_keep_negative_zero_and_large_values() {
        let p = Point::new(-0.0, 1.0e9);
        let back = Point::from_bits(p.to_bits());
        assert!(back.x.is_sign_negative());
        assert_relative_eq!(back.y, 1.0e9);
    }

    #[test]
    fn test_surface_center() {
        let c = SurfaceSize::new(640, 480).center();
        assert_relative_eq!(c.x, 320.0);
        assert_relative_eq!(c.y, 240.0);
    }

    #[test]
    fn test_surface_center_odd_size() {
        let c = SurfaceSize::new(5, 3).center();
        assert_relative_eq!(c.x, 2.5);
        assert_relative_eq!(c.y, 1.5);
    }
}
