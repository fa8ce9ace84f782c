//! YOLO face + 5-point landmark detector on ONNX Runtime via `ort`.
//!
//! Letterbox preprocessing, inference, greedy NMS, then conversion of the
//! surviving boxes to [`DetectionRegion`]s for the configured [`Feature`]:
//! the face box itself, or one square box per visible eye.
use std::path::Path;

use crate::detection::domain::face_landmarks::FaceLandmarks;
use crate::detection::domain::feature_detector::{Feature, FeatureDetector};
use crate::shared::frame::Frame;
use crate::shared::region::DetectionRegion;

use super::math::greedy_nms;

/// Fallback input resolution when the model's input shape is dynamic.
const DEFAULT_INPUT_SIZE: u32 = 640;

pub const DEFAULT_CONFIDENCE: f64 = 0.5;

const NMS_IOU_THRESH: f64 = 0.45;

/// 5 landmarks x (x, y, conf).
const NUM_KEYPOINT_VALUES: usize = 15;

const KEYPOINT_CONF_THRESH: f64 = 0.5;

/// Letterbox pad value, YOLO convention.
const PAD_VALUE: f32 = 114.0 / 255.0;

pub struct OnnxYoloDetector {
    session: ort::session::Session,
    feature: Feature,
    confidence: f64,
    input_size: u32,
}

impl OnnxYoloDetector {
    /// Loads the model. Any failure here is fatal for the caller.
    ///
    /// The input resolution is read from the model's NCHW input shape.
    pub fn new(
        model_path: &Path,
        feature: Feature,
        confidence: f64,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        if !(0.0..=1.0).contains(&confidence) {
            return Err(format!("confidence must be in [0, 1], got {confidence}").into());
        }
        let session = ort::session::Session::builder()?
            .with_execution_providers(execution_providers())?
            .commit_from_file(model_path)?;

        let input_size = session
            .inputs()
            .first()
            .and_then(|input| match input.dtype() {
                ort::value::ValueType::Tensor { shape, .. } if shape.len() >= 4 && shape[2] > 0 => {
                    Some(shape[2] as u32)
                }
                _ => None,
            })
            .unwrap_or(DEFAULT_INPUT_SIZE);

        log::debug!(
            "Loaded {} (input {input_size}x{input_size}, feature {feature})",
            model_path.display()
        );

        Ok(Self {
            session,
            feature,
            confidence,
            input_size,
        })
    }
}

impl FeatureDetector for OnnxYoloDetector {
    fn detect(
        &mut self,
        frame: &Frame,
    ) -> Result<Vec<DetectionRegion>, Box<dyn std::error::Error>> {
        if frame.is_empty() {
            return Ok(Vec::new());
        }

        let (input, transform) = letterbox(frame, self.input_size);
        let input_value = ort::value::Tensor::from_array(input)?;
        let outputs = self.session.run(ort::inputs![input_value])?;
        if outputs.len() == 0 {
            return Err("YOLO model produced no outputs".into());
        }
        let tensor = outputs[0].try_extract_array::<f32>()?;
        let data = tensor.as_slice().ok_or("YOLO output is not contiguous")?;

        let dets = decode(data, tensor.shape(), &transform, self.confidence)?;
        let kept = nms(dets);
        Ok(to_regions(&kept, self.feature, frame.width(), frame.height()))
    }
}

fn execution_providers() -> Vec<ort::execution_providers::ExecutionProviderDispatch> {
    #[cfg(target_os = "macos")]
    {
        vec![ort::execution_providers::CoreMLExecutionProvider::default().build()]
    }
    #[cfg(target_os = "windows")]
    {
        vec![ort::execution_providers::DirectMLExecutionProvider::default().build()]
    }
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        vec![]
    }
}

// ---------------------------------------------------------------------------
// Preprocessing
// ---------------------------------------------------------------------------

/// Maps letterboxed model coordinates back to frame coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Letterbox {
    scale: f64,
    pad_x: u32,
    pad_y: u32,
}

impl Letterbox {
    fn to_frame(&self, x: f64, y: f64) -> (f64, f64) {
        (
            (x - self.pad_x as f64) / self.scale,
            (y - self.pad_y as f64) / self.scale,
        )
    }
}

/// Nearest-neighbour resize into a gray-padded `target` x `target` NCHW tensor
/// normalized to [0, 1].
fn letterbox(frame: &Frame, target: u32) -> (ndarray::Array4<f32>, Letterbox) {
    let fw = frame.width() as f64;
    let fh = frame.height() as f64;
    let t = target as f64;

    let scale = (t / fw).min(t / fh);
    let new_w = ((fw * scale).round() as u32).min(target);
    let new_h = ((fh * scale).round() as u32).min(target);
    let pad_x = (target - new_w) / 2;
    let pad_y = (target - new_h) / 2;

    let size = target as usize;
    let mut tensor = ndarray::Array4::<f32>::from_elem((1, 3, size, size), PAD_VALUE);

    let src = frame.as_ndarray();
    let src_h = frame.height() as usize;
    let src_w = frame.width() as usize;

    for y in 0..new_h as usize {
        let sy = ((y as f64 / scale) as usize).min(src_h - 1);
        for x in 0..new_w as usize {
            let sx = ((x as f64 / scale) as usize).min(src_w - 1);
            for c in 0..3 {
                tensor[[0, c, pad_y as usize + y, pad_x as usize + x]] =
                    src[[sy, sx, c]] as f32 / 255.0;
            }
        }
    }

    (
        tensor,
        Letterbox {
            scale,
            pad_x,
            pad_y,
        },
    )
}

// ---------------------------------------------------------------------------
// Postprocessing
// ---------------------------------------------------------------------------

/// One candidate in frame coordinates.
#[derive(Clone, Debug, PartialEq)]
struct RawDetection {
    bbox: [f64; 4],
    confidence: f64,
    landmarks: FaceLandmarks,
}

/// Decodes a `[1, features, detections]` or `[1, detections, features]`
/// output. Rows are `[cx, cy, w, h, conf, (kx, ky, kconf) x 5]`.
fn decode(
    data: &[f32],
    shape: &[usize],
    transform: &Letterbox,
    min_confidence: f64,
) -> Result<Vec<RawDetection>, String> {
    if shape.len() != 3 {
        return Err(format!("Unexpected YOLO output shape: {shape:?}"));
    }
    let transposed = shape[1] < shape[2];
    let (num_dets, num_feats) = if transposed {
        (shape[2], shape[1])
    } else {
        (shape[1], shape[2])
    };
    if num_feats < 5 {
        return Err(format!("YOLO output has only {num_feats} features per row"));
    }
    if data.len() < num_dets * num_feats {
        return Err(format!(
            "YOLO output holds {} values, shape {shape:?} needs {}",
            data.len(),
            num_dets * num_feats
        ));
    }

    let mut row = vec![0.0f32; num_feats];
    let mut dets = Vec::new();
    for i in 0..num_dets {
        for (f, value) in row.iter_mut().enumerate() {
            *value = if transposed {
                data[f * num_dets + i]
            } else {
                data[i * num_feats + f]
            };
        }
        if let Some(det) = parse_row(&row, transform, min_confidence) {
            dets.push(det);
        }
    }
    Ok(dets)
}

fn parse_row(row: &[f32], transform: &Letterbox, min_confidence: f64) -> Option<RawDetection> {
    let confidence = row[4] as f64;
    if confidence < min_confidence {
        return None;
    }

    let (cx, cy, w, h) = (row[0] as f64, row[1] as f64, row[2] as f64, row[3] as f64);
    let (x1, y1) = transform.to_frame(cx - w / 2.0, cy - h / 2.0);
    let (x2, y2) = transform.to_frame(cx + w / 2.0, cy + h / 2.0);

    let mut points = [None; 5];
    if row.len() >= 5 + NUM_KEYPOINT_VALUES {
        for (k, point) in points.iter_mut().enumerate() {
            let base = 5 + k * 3;
            if row[base + 2] as f64 >= KEYPOINT_CONF_THRESH {
                *point = Some(transform.to_frame(row[base] as f64, row[base + 1] as f64));
            }
        }
    }

    Some(RawDetection {
        bbox: [x1, y1, x2, y2],
        confidence,
        landmarks: FaceLandmarks::new(points),
    })
}

fn nms(dets: Vec<RawDetection>) -> Vec<RawDetection> {
    let boxes: Vec<[f64; 4]> = dets.iter().map(|d| d.bbox).collect();
    let scores: Vec<f64> = dets.iter().map(|d| d.confidence).collect();
    let keep = greedy_nms(&boxes, &scores, NMS_IOU_THRESH);

    let mut slots: Vec<Option<RawDetection>> = dets.into_iter().map(Some).collect();
    keep.into_iter().filter_map(|i| slots[i].take()).collect()
}

fn to_regions(
    dets: &[RawDetection],
    feature: Feature,
    frame_width: u32,
    frame_height: u32,
) -> Vec<DetectionRegion> {
    let clamp = |b: &[f64; 4]| clamp_box(b, frame_width, frame_height);
    match feature {
        Feature::Face => dets.iter().filter_map(|d| clamp(&d.bbox)).collect(),
        Feature::Eyes => dets
            .iter()
            .flat_map(|d| d.landmarks.eye_boxes(d.bbox[2] - d.bbox[0]))
            .filter_map(|b| clamp(&b))
            .collect(),
    }
}

/// Clamps a float box to the frame and snaps it outward to whole pixels.
/// Boxes with no area left inside the frame are dropped.
fn clamp_box(b: &[f64; 4], frame_width: u32, frame_height: u32) -> Option<DetectionRegion> {
    let (fw, fh) = (frame_width as f64, frame_height as f64);
    let x1 = b[0].clamp(0.0, fw).floor();
    let y1 = b[1].clamp(0.0, fh).floor();
    let x2 = b[2].clamp(0.0, fw).ceil();
    let y2 = b[3].clamp(0.0, fh).ceil();
    if x2 - x1 < 1.0 || y2 - y1 < 1.0 || b[2] <= 0.0 || b[3] <= 0.0 || b[0] >= fw || b[1] >= fh {
        return None;
    }
    Some(DetectionRegion::new(
        x1 as i32,
        y1 as i32,
        (x2 - x1) as i32,
        (y2 - y1) as i32,
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
