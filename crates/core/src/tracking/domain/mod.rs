pub mod display_mapping;
pub mod position_tracker;
