//! 5-point face landmarks as emitted by pose-style face models.
//!
//! Order: left eye, right eye, nose, left mouth corner, right mouth corner.
//! A landmark below the keypoint confidence threshold is `None`.

const LEFT_EYE: usize = 0;
const RIGHT_EYE: usize = 1;

/// Eye box side as a fraction of the face box width.
pub const EYE_BOX_RATIO: f64 = 0.25;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct FaceLandmarks {
    points: [Option<(f64, f64)>; 5],
}

impl FaceLandmarks {
    pub fn new(points: [Option<(f64, f64)>; 5]) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[Option<(f64, f64)>; 5] {
        &self.points
    }

    /// Visible eye points, left eye first.
    pub fn visible_eyes(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        [LEFT_EYE, RIGHT_EYE]
            .into_iter()
            .filter_map(|i| self.points[i])
    }

    /// One square box `[x1, y1, x2, y2]` per visible eye, centered on the eye
    /// with side `face_width * EYE_BOX_RATIO`.
    pub fn eye_boxes(&self, face_width: f64) -> Vec<[f64; 4]> {
        let half = (face_width * EYE_BOX_RATIO / 2.0).max(0.5);
        self.visible_eyes()
            .map(|(x, y)| [x - half, y - half, x + half, y + half])
            .collect()
    }
}
