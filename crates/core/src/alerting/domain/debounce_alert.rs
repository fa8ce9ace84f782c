use crate::state::alert_flag::AlertWriter;

/// Counter-plus-flag state of the absence debounce.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AlertState {
    /// Consecutive frames without the feature.
    pub absent_frames: u32,
    pub alert: bool,
}

impl AlertState {
    /// Advances one frame.
    ///
    /// A present frame clears everything at once; an absent frame counts up
    /// and raises the alert once `threshold` consecutive absences are seen.
    pub fn step(self, feature_present: bool, threshold: u32) -> AlertState {
        if feature_present {
            return AlertState::default();
        }
        let absent_frames = self.absent_frames.saturating_add(1);
        AlertState {
            absent_frames,
            alert: self.alert || absent_frames >= threshold,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AlertTransition {
    Raised { absent_frames: u32 },
    Cleared,
}

/// Debounces per-frame feature presence into the published alert flag.
///
/// No cooldown: the alert can fire again as soon as a fresh absence streak
/// reaches the threshold.
pub struct DebounceAlert {
    threshold: u32,
    state: AlertState,
    output: AlertWriter,
}

impl DebounceAlert {
    pub fn new(threshold: u32, output: AlertWriter) -> Result<Self, &'static str> {
        if threshold < 1 {
            return Err("absence threshold must be >= 1");
        }
        Ok(Self {
            threshold,
            state: AlertState::default(),
            output,
        })
    }

    /// Feeds one frame and publishes the resulting flag.
    pub fn observe(&mut self, feature_present: bool) -> Option<AlertTransition> {
        let previous = self.state;
        self.state = previous.step(feature_present, self.threshold);
        self.output.set(self.state.alert);

        match (previous.alert, self.state.alert) {
            (false, true) => Some(AlertTransition::Raised {
                absent_frames: self.state.absent_frames,
            }),
            (true, false) => Some(AlertTransition::Cleared),
            _ => None,
        }
    }

    pub fn state(&self) -> AlertState {
        self.state
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }
}
