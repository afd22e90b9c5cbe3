//! Face detector backed by the `rustface` crate (SeetaFace engine).
//!
//! SeetaFace scores are raw cascade margins, not probabilities: real
//! faces typically score well above 2.0 while background windows hover
//! around zero. The detector therefore never uses a threshold below
//! [`RustfaceDetector::DEFAULT_SCORE_FLOOR`] unless told to via
//! [`RustfaceDetector::with_score_floor`].

use crate::decode::to_grayscale;
use crate::detect::{DetectError, FaceDetector};
use crate::types::{DetectionBox, RgbaImage};

/// SeetaFace frontal face detector.
///
/// The model is parsed once on construction; each [`detect`](FaceDetector::detect)
/// call builds a fresh cascade from a clone of it, so a single
/// `RustfaceDetector` can be shared freely.
#[derive(Clone)]
pub struct RustfaceDetector {
    model: rustface::Model,
    score_floor: f64,
    min_face_size: u32,
    pyramid_scale_factor: f32,
    slide_window_step: u32,
}

impl RustfaceDetector {
    /// Lowest score threshold applied regardless of `min_confidence`.
    pub const DEFAULT_SCORE_FLOOR: f64 = 2.0;
    /// Smallest face, in pixels, the cascade searches for.
    pub const DEFAULT_MIN_FACE_SIZE: u32 = 20;
    /// Downscale factor between image pyramid levels.
    pub const DEFAULT_PYRAMID_SCALE_FACTOR: f32 = 0.8;
    /// Horizontal and vertical step of the sliding window, in pixels.
    pub const DEFAULT_SLIDE_WINDOW_STEP: u32 = 4;

    /// Parse a SeetaFace model (e.g. `seeta_fd_frontal_v1.0.bin`).
    ///
    /// # Errors
    ///
    /// Returns [`DetectError::ModelNotLoaded`] if `model_bytes` is empty
    /// and [`DetectError::InvalidModel`] if it cannot be parsed.
    pub fn from_bytes(model_bytes: &[u8]) -> Result<Self, DetectError> {
        if model_bytes.is_empty() {
            return Err(DetectError::ModelNotLoaded);
        }
        let model = rustface::read_model(std::io::Cursor::new(model_bytes))
            .map_err(|e| DetectError::InvalidModel(e.to_string()))?;
        log::info!("loaded SeetaFace model ({} bytes)", model_bytes.len());
        Ok(Self {
            model,
            score_floor: Self::DEFAULT_SCORE_FLOOR,
            min_face_size: Self::DEFAULT_MIN_FACE_SIZE,
            pyramid_scale_factor: Self::DEFAULT_PYRAMID_SCALE_FACTOR,
            slide_window_step: Self::DEFAULT_SLIDE_WINDOW_STEP,
        })
    }

    /// Read and parse a SeetaFace model file.
    ///
    /// # Errors
    ///
    /// Returns [`DetectError::InvalidModel`] if the file cannot be read,
    /// otherwise the same errors as [`from_bytes`](Self::from_bytes).
    pub fn from_path(path: impl AsRef<std::path::Path>) -> Result<Self, DetectError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .map_err(|e| DetectError::InvalidModel(format!("{}: {e}", path.display())))?;
        Self::from_bytes(&bytes)
    }

    /// Override the lowest score threshold.
    #[must_use]
    pub const fn with_score_floor(mut self, score_floor: f64) -> Self {
        self.score_floor = score_floor;
        self
    }

    /// Override the smallest face size searched for.
    #[must_use]
    pub const fn with_min_face_size(mut self, min_face_size: u32) -> Self {
        self.min_face_size = min_face_size;
        self
    }

    /// The score threshold used for a given `min_confidence`.
    #[must_use]
    pub fn score_threshold(&self, min_confidence: f32) -> f64 {
        f64::from(min_confidence).max(self.score_floor)
    }
}

impl FaceDetector for RustfaceDetector {
    fn detect(
        &self,
        image: &RgbaImage,
        min_confidence: f32,
    ) -> Result<Vec<DetectionBox>, DetectError> {
        let gray = to_grayscale(image);
        let (width, height) = gray.dimensions();

        let mut detector = rustface::create_detector_with_model(self.model.clone());
        detector.set_min_face_size(self.min_face_size);
        detector.set_score_thresh(self.score_threshold(min_confidence));
        detector.set_pyramid_scale_factor(self.pyramid_scale_factor);
        detector.set_slide_window_step(self.slide_window_step, self.slide_window_step);

        let faces = detector.detect(&rustface::ImageData::new(gray.as_raw(), width, height));
        log::debug!("rustface found {} face(s) in {width}x{height}", faces.len());

        Ok(faces
            .iter()
            .map(|face| {
                let bbox = face.bbox();
                DetectionBox {
                    x: f64::from(bbox.x()),
                    y: f64::from(bbox.y()),
                    width: f64::from(bbox.width()),
                    height: f64::from(bbox.height()),
                    score: face.score(),
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_model_is_not_loaded() {
        assert!(matches!(
            RustfaceDetector::from_bytes(&[]),
            Err(DetectError::ModelNotLoaded)
        ));
    }

    #[test]
    fn missing_model_file_is_invalid() {
        let result = RustfaceDetector::from_path("/nonexistent/seeta_fd_frontal_v1.0.bin");
        assert!(matches!(
            result,
            Err(DetectError::InvalidModel(msg)) if msg.contains("seeta_fd_frontal")
        ));
    }
}
