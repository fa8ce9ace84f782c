use std::fmt;
use std::str::FromStr;

use crate::shared::frame::Frame;
use crate::shared::region::DetectionRegion;

/// What the detection oracle reports regions for.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Feature {
    #[default]
    Face,
    Eyes,
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Feature::Face => "face",
            Feature::Eyes => "eyes",
        })
    }
}

impl FromStr for Feature {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "face" => Ok(Feature::Face),
            "eyes" | "eye" => Ok(Feature::Eyes),
            other => Err(format!("unknown feature '{other}' (expected face or eyes)")),
        }
    }
}

/// Black-box detection oracle: zero or more regions per frame.
///
/// Implementations may keep per-stream state, hence `&mut self`. An empty
/// result is a normal outcome, not an error.
pub trait FeatureDetector: Send {
    fn detect(&mut self, frame: &Frame)
        -> Result<Vec<DetectionRegion>, Box<dyn std::error::Error>>;
}
