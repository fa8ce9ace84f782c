use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_rect_mut, draw_line_segment_mut};
use imageproc::rect::Rect;

use crate::shared::frame::Frame;
use crate::shared::point::Point;
use crate::shared::region::DetectionRegion;

pub const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
pub const INK: Rgb<u8> = Rgb([0, 0, 0]);
pub const BOX_COLOR: Rgb<u8> = Rgb([0, 255, 0]);

/// Segments are walked pixel by pixel, so endpoints past this are dropped.
const MAX_COORD: f32 = 1.0e6;

/// Draws a one-pixel segment with the endpoints rounded to pixel centres.
/// Off-canvas pixels are skipped. Returns false when nothing could be drawn.
pub fn draw_segment(canvas: &mut RgbImage, from: Point, to: Point) -> bool {
    let usable = |p: Point| {
        p.x.is_finite() && p.y.is_finite() && p.x.abs() <= MAX_COORD && p.y.abs() <= MAX_COORD
    };
    if !usable(from) || !usable(to) {
        return false;
    }
    draw_line_segment_mut(
        canvas,
        (from.x.round(), from.y.round()),
        (to.x.round(), to.y.round()),
        INK,
    );
    true
}

/// Packs an RGB image into the `0RGB` words a window framebuffer expects.
pub fn to_argb(image: &RgbImage) -> Vec<u32> {
    image
        .pixels()
        .map(|Rgb([r, g, b])| (u32::from(*r) << 16) | (u32::from(*g) << 8) | u32::from(*b))
        .collect()
}

/// Copies an RGB frame and outlines each region on it.
///
/// Returns `None` for frames that are empty or not three-channel.
pub fn annotate(frame: &Frame, regions: &[DetectionRegion]) -> Option<RgbImage> {
    if frame.is_empty() || frame.channels() != 3 {
        return None;
    }
    let mut image = RgbImage::from_raw(frame.width(), frame.height(), frame.data().to_vec())?;
    for region in regions.iter().filter(|r| r.width > 0 && r.height > 0) {
        let rect = Rect::at(region.x, region.y).of_size(region.width as u32, region.height as u32);
        draw_hollow_rect_mut(&mut image, rect, BOX_COLOR);
    }
    Some(image)
}
