use std::time::Duration;

use crate::display::domain::display_surface::DisplaySurface;
use crate::pipeline::failure_streak::FailureStreak;
use crate::shared::point::Point;
use crate::state::published_position::PositionReader;
use crate::state::running_flag::RunningFlag;

/// Draws the trail at its own cadence from the latest published position.
///
/// Each iteration drains surface events, extends the trail from the
/// previous point to the current one, presents, then sleeps. Nothing is
/// ever erased.
pub struct RenderLoop {
    surface: Box<dyn DisplaySurface>,
    position: PositionReader,
    running: RunningFlag,
    interval: Duration,
    start: Point,
}

impl RenderLoop {
    /// `start` is where the first segment begins, normally the surface center.
    pub fn new(
        surface: Box<dyn DisplaySurface>,
        position: PositionReader,
        running: RunningFlag,
        interval: Duration,
        start: Point,
    ) -> Self {
        Self {
            surface,
            position,
            running,
            interval,
            start,
        }
    }

    /// Runs until the session stops, then hands the surface back unclosed.
    pub fn run(mut self) -> Box<dyn DisplaySurface> {
        let mut previous = self.start;
        let mut present = FailureStreak::new("Present");
        let mut iterations: u64 = 0;

        while self.running.is_running() {
            // The iteration that sees a stop event still draws and presents.
            if let Some(event) = self.surface.poll_events().into_iter().next() {
                self.running.stop(event.stop_reason());
            }

            let current = self.position.load();
            self.surface.draw_line(previous, current);
            previous = current;
            present.record(self.surface.present());
            iterations += 1;

            if self.running.is_running() {
                std::thread::sleep(self.interval);
            }
        }

        log::debug!("Render loop exited after {iterations} iteration(s)");
        self.surface
    }
}
