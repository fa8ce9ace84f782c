use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::alerting::domain::playback_action::PlaybackAction;

/// Plays audio by running an external player and waiting for it to exit.
///
/// The resource path is appended after any configured arguments, e.g.
/// `aplay -q alert.wav`.
#[derive(Clone, Debug)]
pub struct CommandPlayback {
    program: PathBuf,
    args: Vec<String>,
}

impl CommandPlayback {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Arguments passed before the resource path.
    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }
}

impl PlaybackAction for CommandPlayback {
    fn play(&mut self, resource: &Path) -> Result<(), Box<dyn std::error::Error>> {
        let status = Command::new(&self.program)
            .args(&self.args)
            .arg(resource)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|e| format!("failed to run {}: {e}", self.program.display()))?;

        if !status.success() {
            return Err(format!(
                "{} exited with {status} for {}",
                self.program.display(),
                resource.display()
            )
            .into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_program_is_error() {
        let mut player = CommandPlayback::new("/nonexistent/facetrail-player");
        let err = player.play(Path::new("alert.wav")).unwrap_err();
        assert!(err.to_string().contains("failed to run"));
    }

    #[cfg(unix)]
    #[test]
    fn test_successful_exit_is_ok() {
        // `true` ignores its arguments and exits 0.
        let mut player = CommandPlayback::new("true");
        assert!(player.play(Path::new("alert.wav")).is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn test_non_zero_exit_is_error() {
        let mut player = CommandPlayback::new("false");
        let err = player.play(Path::new("alert.wav")).unwrap_err();
        assert!(err.to_string().contains("exited with"));
    }

    #[cfg(unix)]
    #[test]
    fn test_args_precede_resource() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("played");
        // sh -c 'touch "$1"' sh <resource>
        let mut player = CommandPlayback::new("sh").with_args(vec![
            "-c".to_string(),
            "touch \"$1\"".to_string(),
            "sh".to_string(),
        ]);
        player.play(&marker).unwrap();
        assert!(marker.exists());
    }
}
