pub mod face_landmarks;
pub mod feature_detector;
