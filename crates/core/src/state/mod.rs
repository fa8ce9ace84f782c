//! State shared across threads: single-writer published values and the
//! session run flag.

pub mod alert_flag;
pub mod published_position;
pub mod running_flag;
pub mod shared_state;
