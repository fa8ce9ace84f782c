use crate::shared::point::Point;
use crate::shared::region::DetectionRegion;
use crate::state::published_position::PositionWriter;
use crate::tracking::domain::display_mapping::DisplayMapping;

/// Turns per-frame detections into the published display position.
///
/// The largest region of each frame is the one tracked. The first frame
/// with any region fixes the calibration origin for the rest of the run;
/// frames without regions leave the published position untouched.
pub struct PositionTracker {
    mapping: DisplayMapping,
    origin: Option<Point>,
    output: PositionWriter,
}

impl PositionTracker {
    pub fn new(mapping: DisplayMapping, output: PositionWriter) -> Self {
        Self {
            mapping,
            origin: None,
            output,
        }
    }

    /// Processes one frame's regions. Returns the newly published position,
    /// or `None` when the previous one is held.
    pub fn update(&mut self, regions: &[DetectionRegion]) -> Option<Point> {
        let target = DetectionRegion::largest(regions)?;
        let center = target.center();
        let origin = *self.origin.get_or_insert_with(|| {
            log::info!("Calibrated origin at ({:.1}, {:.1})", center.x, center.y);
            center
        });

        let position = self.mapping.map(center, origin);
        self.output.publish(position);
        Some(position)
    }

    pub fn origin(&self) -> Option<Point> {
        self.origin
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::point::SurfaceSize;
    use crate::state::published_position::{position_cell, PositionReader};
    use approx::assert_relative_eq;

    const SURFACE: SurfaceSize = SurfaceSize::new(640, 480);

    fn tracker(sensitivity: f32) -> (PositionTracker, PositionReader) {
        let (writer, reader) = position_cell(SURFACE.center());
        let mapping = DisplayMapping::new(SURFACE, sensitivity).unwrap();
        (PositionTracker::new(mapping, writer), reader)
    }

    fn region_at(cx: i32, cy: i32, size: i32) -> DetectionRegion {
        DetectionRegion::new(cx - size / 2, cy - size / 2, size, size)
    }

    #[test]
    fn test_no_regions_before_calibration_holds_center() {
        let (mut t, reader) = tracker(3.0);
        assert_eq!(t.update(&[]), None);
        assert_eq!(t.origin(), None);
        assert_eq!(reader.load(), SURFACE.center());
    }

    #[test]
    fn test_first_detection_calibrates_and_publishes_center() {
        let (mut t, reader) = tracker(3.0);
        let published = t.update(&[region_at(200, 150, 40)]).unwrap();

        assert_eq!(t.origin(), Some(Point::new(200.0, 150.0)));
        assert_relative_eq!(published.x, 320.0);
        assert_relative_eq!(published.y, 240.0);
        assert_eq!(reader.load(), published);
    }

    #[test]
    fn test_origin_is_never_recalibrated() {
        let (mut t, _reader) = tracker(3.0);
        t.update(&[region_at(200, 150, 40)]);
        t.update(&[]);
        t.update(&[region_at(50, 60, 40)]);
        t.update(&[region_at(400, 300, 80), region_at(10, 10, 20)]);
        assert_eq!(t.origin(), Some(Point::new(200.0, 150.0)));
    }

    #[test]
    fn test_motion_after_calibration_is_mirrored_and_scaled() {
        let (mut t, reader) = tracker(3.0);
        t.update(&[region_at(200, 150, 40)]);
        t.update(&[region_at(210, 145, 40)]);

        // dx = 10 -> x = 640 - (30 + 320) = 290; dy = -5 -> y = -15 + 240 = 225
        let p = reader.load();
        assert_relative_eq!(p.x, 290.0);
        assert_relative_eq!(p.y, 225.0);
    }

    #[test]
    fn test_empty_frame_holds_last_position() {
        let (mut t, reader) = tracker(3.0);
        t.update(&[region_at(200, 150, 40)]);
        t.update(&[region_at(220, 160, 40)]);
        let before = reader.load();

        assert_eq!(t.update(&[]), None);
        assert_eq!(reader.load(), before);
    }

    #[test]
    fn test_largest_region_is_tracked() {
        let (mut t, _reader) = tracker(1.0);
        // area 100 at (5,5) vs area 400 at (110,110)
        let small = DetectionRegion::new(0, 0, 10, 10);
        let large = DetectionRegion::new(100, 100, 20, 20);
        t.update(&[small, large]);
        assert_eq!(t.origin(), Some(Point::new(110.0, 110.0)));
    }

    #[test]
    fn test_repeated_identical_input_is_idempotent() {
        let (mut t, reader) = tracker(2.0);
        t.update(&[region_at(100, 100, 30)]);
        let a = t.update(&[region_at(130, 90, 30)]);
        let b = t.update(&[region_at(130, 90, 30)]);
        assert_eq!(a, b);
        assert_eq!(reader.load(), b.unwrap());
    }
}
