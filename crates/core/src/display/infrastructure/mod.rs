pub mod canvas_surface;
pub mod raster;
#[cfg(feature = "window")]
pub mod window_preview;
#[cfg(feature = "window")]
pub mod window_surface;
#[cfg(feature = "window")]
pub mod window_thread;
