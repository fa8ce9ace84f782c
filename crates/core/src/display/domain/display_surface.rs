use crate::shared::point::Point;
use crate::state::running_flag::StopReason;

/// User intent reported by a surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SurfaceEvent {
    /// The window was closed.
    Close,
    /// The user asked to quit from inside the surface.
    Quit,
}

impl SurfaceEvent {
    pub fn stop_reason(self) -> StopReason {
        match self {
            SurfaceEvent::Close => StopReason::WindowClosed,
            SurfaceEvent::Quit => StopReason::UserQuit,
        }
    }
}

/// Append-only drawing target for the trail.
///
/// Drawn primitives are never erased. Coordinates are surface pixels and
/// may fall outside the surface, in which case they are clipped.
pub trait DisplaySurface: Send {
    /// Drains events queued since the last call.
    fn poll_events(&mut self) -> Vec<SurfaceEvent>;

    fn draw_line(&mut self, from: Point, to: Point);

    fn draw_point(&mut self, at: Point);

    /// Makes everything drawn so far visible.
    fn present(&mut self) -> Result<(), Box<dyn std::error::Error>>;

    /// Releases the surface. Called once, after every loop has stopped.
    fn close(&mut self) -> Result<(), Box<dyn std::error::Error>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_events_map_to_stop_reasons() {
        assert_eq!(SurfaceEvent::Close.stop_reason(), StopReason::WindowClosed);
        assert_eq!(SurfaceEvent::Quit.stop_reason(), StopReason::UserQuit);
    }
}
