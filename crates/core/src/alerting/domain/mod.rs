pub mod debounce_alert;
pub mod playback_action;
