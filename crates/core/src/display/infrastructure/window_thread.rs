use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_channel::{bounded, unbounded, Receiver, RecvTimeoutError, Sender};
use minifb::{Key, KeyRepeat, Window, WindowOptions};

use crate::display::domain::display_surface::SurfaceEvent;

/// How long the window waits for a new buffer before pumping events anyway.
const PUMP_INTERVAL: Duration = Duration::from_millis(10);

#[derive(Debug, thiserror::Error)]
pub enum WindowError {
    #[error("window size must be non-zero, got {width}x{height}")]
    InvalidSize { width: u32, height: u32 },
    #[error("failed to start window thread: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("failed to open window: {0}")]
    Open(String),
    #[error("window thread panicked")]
    Panicked,
}

/// A native window owned by a dedicated thread.
///
/// `minifb::Window` cannot leave the thread that created it, so callers
/// talk to it through channels: `0RGB` buffers in, [`SurfaceEvent`]s out.
/// The window closes when this handle is closed or dropped.
pub struct WindowThread {
    frames: Option<Sender<Vec<u32>>>,
    events: Receiver<SurfaceEvent>,
    handle: Option<JoinHandle<()>>,
}

impl WindowThread {
    /// Opens the window and waits until it exists, so a missing display
    /// fails here rather than mid-session.
    pub fn spawn(title: &str, width: u32, height: u32) -> Result<Self, WindowError> {
        if width == 0 || height == 0 {
            return Err(WindowError::InvalidSize { width, height });
        }
        let (frame_tx, frame_rx) = bounded::<Vec<u32>>(1);
        let (event_tx, event_rx) = unbounded();
        let (ready_tx, ready_rx) = bounded::<Result<(), String>>(1);
        let title = title.to_string();
        let (width, height) = (width as usize, height as usize);

        let handle = std::thread::Builder::new()
            .name(format!("window: {title}"))
            .spawn(move || {
                let window = match Window::new(&title, width, height, WindowOptions::default()) {
                    Ok(window) => window,
                    Err(e) => {
                        let _ = ready_tx.send(Err(e.to_string()));
                        return;
                    }
                };
                let _ = ready_tx.send(Ok(()));
                pump(window, width, height, frame_rx, event_tx);
            })?;

        match ready_rx.recv() {
            Ok(Ok(())) => Ok(Self {
                frames: Some(frame_tx),
                events: event_rx,
                handle: Some(handle),
            }),
            Ok(Err(msg)) => {
                let _ = handle.join();
                Err(WindowError::Open(msg))
            }
            Err(_) => {
                let _ = handle.join();
                Err(WindowError::Open("window thread exited during startup".into()))
            }
        }
    }

    /// Queues a buffer for display. Dropped if the window has not taken the
    /// previous one yet, or is gone.
    pub fn show(&self, buffer: Vec<u32>) {
        if let Some(frames) = &self.frames {
            let _ = frames.try_send(buffer);
        }
    }

    /// Drains events reported since the last call.
    pub fn events(&self) -> Vec<SurfaceEvent> {
        self.events.try_iter().collect()
    }

    /// Closes the window and joins its thread. Safe to call more than once.
    pub fn close(&mut self) -> Result<(), WindowError> {
        self.frames.take();
        match self.handle.take() {
            Some(handle) => handle.join().map_err(|_| WindowError::Panicked),
            None => Ok(()),
        }
    }
}

impl Drop for WindowThread {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            log::warn!("{e}");
        }
    }
}

/// Window thread body: redraws, then reports close and quit keys until
/// the buffer sender goes away or the user closes the window.
fn pump(
    mut window: Window,
    width: usize,
    height: usize,
    frames: Receiver<Vec<u32>>,
    events: Sender<SurfaceEvent>,
) {
    let mut buffer = vec![0u32; width * height];
    let mut quit_sent = false;

    loop {
        match frames.recv_timeout(PUMP_INTERVAL) {
            Ok(next) if next.len() == buffer.len() => buffer = next,
            Ok(next) => log::debug!(
                "Ignoring buffer of {} pixel(s) for a {width}x{height} window",
                next.len()
            ),
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => return,
        }

        if let Err(e) = window.update_with_buffer(&buffer, width, height) {
            log::warn!("Window update failed: {e}");
        }
        if !window.is_open() {
            let _ = events.send(SurfaceEvent::Close);
            return;
        }
        if !quit_sent && quit_requested(&window.get_keys_pressed(KeyRepeat::No)) {
            let _ = events.send(SurfaceEvent::Quit);
            quit_sent = true;
        }
    }
}

fn quit_requested(keys: &[Key]) -> bool {
    keys.iter().any(|k| matches!(k, Key::Q | Key::Escape))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::q(&[Key::Q], true)]
    #[case::escape(&[Key::A, Key::Escape], true)]
    #[case::other(&[Key::A, Key::Space], false)]
    #[case::none(&[], false)]
    fn test_quit_keys(#[case] keys: &[Key], #[case] expected: bool) {
        assert_eq!(quit_requested(keys), expected);
    }

    #[test]
    fn test_zero_size_rejected_before_spawning() {
        assert!(matches!(
            WindowThread::spawn("empty", 0, 10),
            Err(WindowError::InvalidSize { .. })
        ));
    }
}
