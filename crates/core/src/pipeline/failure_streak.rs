use std::fmt::Display;

/// Edge-triggered logging for a recurring fallible action.
///
/// The first failure of a streak logs at `warn`, repeats at `debug`, and
/// the first success afterwards logs recovery at `info`.
#[derive(Debug)]
pub struct FailureStreak {
    action: &'static str,
    failures: u64,
}

impl FailureStreak {
    pub fn new(action: &'static str) -> Self {
        Self {
            action,
            failures: 0,
        }
    }

    /// Records one attempt. Returns `true` if it succeeded.
    pub fn record<E: Display>(&mut self, result: Result<(), E>) -> bool {
        match result {
            Ok(()) => {
                if self.failures > 0 {
                    log::info!(
                        "{} recovered after {} failure(s)",
                        self.action,
                        self.failures
                    );
                    self.failures = 0;
                }
                true
            }
            Err(e) => {
                self.failures += 1;
                if self.failures == 1 {
                    log::warn!("{} failed: {e}", self.action);
                } else {
                    log::debug!("{} failed again ({}): {e}", self.action, self.failures);
                }
                false
            }
        }
    }

    /// Length of the current failure streak.
    pub fn failures(&self) -> u64 {
        self.failures
    }
}
