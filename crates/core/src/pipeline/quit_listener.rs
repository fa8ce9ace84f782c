use std::io::BufRead;
use std::thread::JoinHandle;

use crate::state::running_flag::{RunningFlag, StopReason};

/// Watches `input` for a line starting with `q` and stops the session.
///
/// End of input without a quit line leaves the session running. The
/// thread blocks on reads, so callers normally detach it.
pub fn spawn_quit_listener<R>(input: R, running: RunningFlag) -> JoinHandle<()>
where
    R: BufRead + Send + 'static,
{
    std::thread::spawn(move || {
        for line in input.lines() {
            let Ok(line) = line else {
                break;
            };
            if !running.is_running() {
                break;
            }
            if is_quit(&line) {
                running.stop(StopReason::UserQuit);
                break;
            }
        }
    })
}

fn is_quit(line: &str) -> bool {
    line.trim_start()
        .chars()
        .next()
        .is_some_and(|c| c.eq_ignore_ascii_case(&'q'))
}
