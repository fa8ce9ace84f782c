use crate::alerting::domain::debounce_alert::{AlertTransition, DebounceAlert};
use crate::shared::point::Point;
use crate::shared::region::DetectionRegion;
use crate::tracking::domain::position_tracker::PositionTracker;

/// What one frame changed.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameOutcome {
    /// Newly published position, `None` when the previous one is held.
    pub position: Option<Point>,
    pub transition: Option<AlertTransition>,
}

/// Feeds one frame's regions to whichever components the session runs.
///
/// Both see the same region list: the tracker as candidates, the alert
/// machine as `feature present = !regions.is_empty()`.
pub struct FrameProcessor {
    tracker: Option<PositionTracker>,
    alert: Option<DebounceAlert>,
}

impl FrameProcessor {
    pub fn new(tracker: Option<PositionTracker>, alert: Option<DebounceAlert>) -> Self {
        Self { tracker, alert }
    }

    pub fn process(&mut self, regions: &[DetectionRegion]) -> FrameOutcome {
        let position = self.tracker.as_mut().and_then(|t| t.update(regions));
        let transition = self
            .alert
            .as_mut()
            .and_then(|a| a.observe(!regions.is_empty()));
        FrameOutcome {
            position,
            transition,
        }
    }

    pub fn tracker(&self) -> Option<&PositionTracker> {
        self.tracker.as_ref()
    }

    pub fn alert(&self) -> Option<&DebounceAlert> {
        self.alert.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::point::SurfaceSize;
    use crate::state::alert_flag::alert_flag;
    use crate::state::published_position::position_cell;
    use crate::tracking::domain::display_mapping::DisplayMapping;

    const SURFACE: SurfaceSize = SurfaceSize::new(640, 480);

    fn tracker() -> PositionTracker {
        let (writer, _reader) = position_cell(SURFACE.center());
        PositionTracker::new(DisplayMapping::new(SURFACE, 3.0).unwrap(), writer)
    }

    fn alert(threshold: u32) -> DebounceAlert {
        let (writer, _reader) = alert_flag();
        DebounceAlert::new(threshold, writer).unwrap()
    }

    #[test]
    fn test_no_components_is_noop() {
        let mut p = FrameProcessor::new(None, None);
        let regions = [DetectionRegion::new(0, 0, 10, 10)];
        assert_eq!(p.process(&regions), FrameOutcome::default());
    }

    #[test]
    fn test_tracker_only() {
        let mut p = FrameProcessor::new(Some(tracker()), None);
        let out = p.process(&[DetectionRegion::new(100, 100, 20, 20)]);
        assert_eq!(out.position, Some(SURFACE.center()));
        assert_eq!(out.transition, None);
        assert!(p.alert().is_none());
    }

    #[test]
    fn test_alert_sees_region_presence() {
        let mut p = FrameProcessor::new(None, Some(alert(2)));
        assert_eq!(p.process(&[]).transition, None);
        assert_eq!(
            p.process(&[]).transition,
            Some(AlertTransition::Raised { absent_frames: 2 })
        );
        assert_eq!(
            p.process(&[DetectionRegion::new(0, 0, 5, 5)]).transition,
            Some(AlertTransition::Cleared)
        );
    }

    #[test]
    fn test_both_components_share_regions() {
        let mut p = FrameProcessor::new(Some(tracker()), Some(alert(1)));
        let out = p.process(&[]);
        assert_eq!(out.position, None);
        assert!(matches!(out.transition, Some(AlertTransition::Raised { .. })));

        let out = p.process(&[DetectionRegion::new(10, 10, 4, 4)]);
        assert!(out.position.is_some());
        assert_eq!(out.transition, Some(AlertTransition::Cleared));
        assert_eq!(p.tracker().unwrap().origin(), Some(Point::new(12.0, 12.0)));
    }
}
