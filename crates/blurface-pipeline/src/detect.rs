//! Face detection capability.
//!
//! The pipeline never looks inside a detector: it hands over the decoded
//! image and a confidence floor, and gets back a list of boxes. Any
//! backend (a SeetaFace cascade, an ONNX model, a fixed list in tests)
//! plugs in by implementing [`FaceDetector`].

use crate::types::{DetectionBox, RgbaImage};

/// Errors a [`FaceDetector`] can report.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DetectError {
    /// The detector was asked to run before its model was loaded.
    #[error("face detection model is not loaded")]
    ModelNotLoaded,

    /// The model data could not be parsed.
    #[error("invalid face detection model: {0}")]
    InvalidModel(String),

    /// The backend failed while running.
    #[error("face detector backend error: {0}")]
    Backend(String),
}

/// Pluggable face detection backend.
pub trait FaceDetector {
    /// Detect faces in `image`.
    ///
    /// Only boxes scoring at least `min_confidence` are returned. The
    /// meaning of the score is backend-defined. The order of the returned
    /// boxes carries no meaning.
    ///
    /// # Errors
    ///
    /// Returns a [`DetectError`] if the backend is not ready or fails.
    fn detect(
        &self,
        image: &RgbaImage,
        min_confidence: f32,
    ) -> Result<Vec<DetectionBox>, DetectError>;
}

impl<T: FaceDetector + ?Sized> FaceDetector for &T {
    fn detect(
        &self,
        image: &RgbaImage,
        min_confidence: f32,
    ) -> Result<Vec<DetectionBox>, DetectError> {
        (**self).detect(image, min_confidence)
    }
}

impl<T: FaceDetector + ?Sized> FaceDetector for Box<T> {
    fn detect(
        &self,
        image: &RgbaImage,
        min_confidence: f32,
    ) -> Result<Vec<DetectionBox>, DetectError> {
        (**self).detect(image, min_confidence)
    }
}

impl<T: FaceDetector + ?Sized> FaceDetector for std::rc::Rc<T> {
    fn detect(
        &self,
        image: &RgbaImage,
        min_confidence: f32,
    ) -> Result<Vec<DetectionBox>, DetectError> {
        (**self).detect(image, min_confidence)
    }
}
