use std::fmt;

use crate::shared::frame::Frame;

/// Stream properties reported when a source is opened.
#[derive(Clone, Debug, PartialEq)]
pub struct SourceMetadata {
    pub width: u32,
    pub height: u32,
    /// Nominal frame rate; 0.0 when the container does not declare one.
    pub fps: f64,
}

impl fmt::Display for SourceMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{} @ {:.2} fps", self.width, self.height, self.fps)
    }
}

/// Pull-based frame producer: a file, a stream URL or a capture device.
///
/// `next_frame` returning `None` (or an empty frame) means end of stream.
pub trait FrameSource: Send {
    fn open(&mut self, uri: &str) -> Result<SourceMetadata, Box<dyn std::error::Error>>;

    fn next_frame(&mut self) -> Option<Result<Frame, Box<dyn std::error::Error>>>;

    /// Releases the underlying stream. Safe to call more than once.
    fn close(&mut self);
}
