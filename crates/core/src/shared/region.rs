use crate::shared::point::Point;

/// An axis-aligned detection rectangle in frame pixel coordinates.
///
/// Produced by a detector for a single frame and dropped once that
/// frame has been processed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DetectionRegion {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl DetectionRegion {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Area in square pixels. Degenerate (negative) extents count as zero.
    pub fn area(&self) -> i64 {
        self.width.max(0) as i64 * self.height.max(0) as i64
    }

    pub fn center(&self) -> Point {
        Point::new(
            self.x as f32 + self.width as f32 / 2.0,
            self.y as f32 + self.height as f32 / 2.0,
        )
    }

    /// Picks the region with the largest area.
    ///
    /// Ties go to the region encountered first.
    pub fn largest(regions: &[DetectionRegion]) -> Option<&DetectionRegion> {
        let mut best: Option<&DetectionRegion> = None;
        for r in regions {
            match best {
                Some(b) if r.area() <= b.area() => {}
                _ => best = Some(r),
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    fn region(x: i32, y: i32, w: i32, h: i32) -> DetectionRegion {
        DetectionRegion::new(x, y, w, h)
    }

    // ── area / center ────────────────────────────────────────────────

    #[rstest]
    #[case::square(region(0, 0, 10, 10), 100)]
    #[case::wide(region(5, 5, 40, 10), 400)]
    #[case::zero_width(region(0, 0, 0, 10), 0)]
    #[case::negative_height(region(0, 0, 10, -3), 0)]
    fn test_area(#[case] r: DetectionRegion, #[case] expected: i64) {
        assert_eq!(r.area(), expected);
    }

    #[test]
    fn test_center_is_midpoint() {
        let c = region(100, 50, 40, 20).center();
        assert_relative_eq!(c.x, 120.0);
        assert_relative_eq!(c.y, 60.0);
    }

    #[test]
    fn test_center_keeps_half_pixels() {
        let c = region(0, 0, 5, 3).center();
        assert_relative_eq!(c.x, 2.5);
        assert_relative_eq!(c.y, 1.5);
    }

    // ── largest ──────────────────────────────────────────────────────

    #[test]
    fn test_largest_empty_is_none() {
        assert!(DetectionRegion::largest(&[]).is_none());
    }

    #[test]
    fn test_largest_picks_bigger_area() {
        // 10x10 = 100, 20x20 = 400
        let regions = [region(0, 0, 10, 10), region(200, 200, 20, 20)];
        let best = DetectionRegion::largest(&regions).unwrap();
        assert_eq!(best.area(), 400);
        assert_eq!(*best, regions[1]);
    }

    #[test]
    fn test_largest_tie_keeps_first() {
        let regions = [region(0, 0, 20, 10), region(50, 50, 10, 20)];
        let best = DetectionRegion::largest(&regions).unwrap();
        assert_eq!(*best, regions[0]);
    }

    #[test]
    fn test_largest_single() {
        let regions = [region(1, 2, 3, 4)];
        assert_eq!(DetectionRegion::largest(&regions), Some(&regions[0]));
    }
}
