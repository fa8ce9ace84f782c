use std::path::Path;

/// Plays an audio resource.
///
/// May block until playback finishes. Callers treat failures as
/// informational only: they are logged, never acted upon.
pub trait PlaybackAction: Send {
    fn play(&mut self, resource: &Path) -> Result<(), Box<dyn std::error::Error>>;
}
