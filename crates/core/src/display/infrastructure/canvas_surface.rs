use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use image::{ImageFormat, RgbImage};

use crate::display::domain::display_surface::{DisplaySurface, SurfaceEvent};
use crate::display::infrastructure::raster::{self, BACKGROUND};
use crate::shared::point::{Point, SurfaceSize};

#[derive(Debug, thiserror::Error)]
pub enum CanvasError {
    #[error("canvas size must be non-zero, got {width}x{height}")]
    InvalidSize { width: u32, height: u32 },
    #[error("failed to create output directory {path}: {source}")]
    OutputDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("output path {0} is not a .png file")]
    NotPng(PathBuf),
}

/// In-memory raster surface that snapshots itself to a PNG file.
///
/// White background, black one-pixel trail. `present` writes the image at
/// most once per snapshot interval; `close` always writes the final state.
pub struct CanvasSurface {
    canvas: RgbImage,
    output: PathBuf,
    snapshot_interval: Duration,
    last_snapshot: Option<Instant>,
    dirty: bool,
}

impl CanvasSurface {
    pub fn new(
        size: SurfaceSize,
        output: impl Into<PathBuf>,
        snapshot_interval: Duration,
    ) -> Result<Self, CanvasError> {
        if size.width == 0 || size.height == 0 {
            return Err(CanvasError::InvalidSize {
                width: size.width,
                height: size.height,
            });
        }
        let output = output.into();
        let is_png = output
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("png"));
        if !is_png {
            return Err(CanvasError::NotPng(output));
        }
        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| CanvasError::OutputDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        Ok(Self {
            canvas: RgbImage::from_pixel(size.width, size.height, BACKGROUND),
            output,
            snapshot_interval,
            last_snapshot: None,
            dirty: true,
        })
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    pub fn image(&self) -> &RgbImage {
        &self.canvas
    }

    /// Writes through a sibling temp file so readers never see a partial PNG.
    fn snapshot(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        let mut tmp = self.output.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        self.canvas.save_with_format(&tmp, ImageFormat::Png)?;
        std::fs::rename(&tmp, &self.output)?;

        self.last_snapshot = Some(Instant::now());
        self.dirty = false;
        log::debug!("Wrote canvas snapshot to {}", self.output.display());
        Ok(())
    }
}

impl DisplaySurface for CanvasSurface {
    fn poll_events(&mut self) -> Vec<SurfaceEvent> {
        Vec::new()
    }

    fn draw_line(&mut self, from: Point, to: Point) {
        if raster::draw_segment(&mut self.canvas, from, to) {
            self.dirty = true;
        }
    }

    fn draw_point(&mut self, at: Point) {
        self.draw_line(at, at);
    }

    fn present(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        if !self.dirty {
            return Ok(());
        }
        let due = self
            .last_snapshot
            .map_or(true, |t| t.elapsed() >= self.snapshot_interval);
        if due {
            self.snapshot()?;
        }
        Ok(())
    }

    fn close(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.snapshot()
    }
}
