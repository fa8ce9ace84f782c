//! Real-time face/eye tracking core.
//!
//! Per-frame detections drive two independent actuations: a trail drawn on a
//! display surface from a calibrated, mirrored position, and an audible alert
//! raised after a sustained absence of the tracked feature. Detection runs on
//! the caller's thread; each actuator loop runs on its own thread and reads
//! only the latest published values.

pub mod alerting;
pub mod detection;
pub mod display;
pub mod pipeline;
pub mod shared;
pub mod state;
pub mod tracking;
pub mod video;
