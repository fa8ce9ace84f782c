pub mod alert_loop;
pub mod failure_streak;
pub mod frame_processor;
pub mod infrastructure;
pub mod quit_listener;
pub mod render_loop;
pub mod session_executor;
pub mod session_logger;
