//! Shared types for the blurface pipeline.

use image::error::{DecodingError, ImageFormatHint};
use serde::{Deserialize, Serialize};

use crate::blur::BlurKind;
use crate::detect::DetectError;

/// Re-export `RgbaImage` so downstream crates can reference the
/// decoded image and canvas pixels without depending on `image` directly.
pub use image::RgbaImage;

/// Image dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Dimensions {
    /// Create new dimensions.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Total pixel count (`width * height`).
    #[must_use]
    pub const fn pixel_count(self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

/// One candidate face reported by a [`FaceDetector`](crate::FaceDetector).
///
/// Coordinates are in image pixels and may be fractional, negative, or
/// extend past the image edges. They are clamped to the canvas by
/// [`clamp_to_surface`](crate::region::clamp_to_surface) before blurring.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetectionBox {
    /// Left edge (pixels from the left of the image).
    pub x: f64,
    /// Top edge (pixels from the top of the image).
    pub y: f64,
    /// Box width in pixels.
    pub width: f64,
    /// Box height in pixels.
    pub height: f64,
    /// Detector confidence. Units are backend-defined.
    pub score: f64,
}

impl DetectionBox {
    /// Create a new detection box.
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64, score: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
            score,
        }
    }
}

/// An integer rectangle that lies entirely inside a canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    /// Left edge in pixels.
    pub x: u32,
    /// Top edge in pixels.
    pub y: u32,
    /// Width in pixels (may be zero).
    pub width: u32,
    /// Height in pixels (may be zero).
    pub height: u32,
}

impl Region {
    /// Create a new region.
    #[must_use]
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Returns `true` if the region covers no pixels.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// The shorter of the two sides.
    #[must_use]
    pub const fn min_side(self) -> u32 {
        if self.width < self.height {
            self.width
        } else {
            self.height
        }
    }
}

/// Record of one blur application made by the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlurredRegion {
    /// The detection that produced this region.
    pub detection: DetectionBox,
    /// The detection clamped to the canvas.
    pub region: Region,
    /// Blur radius applied to the region. Zero when the region was empty
    /// and nothing was blurred.
    pub radius: u32,
}

impl BlurredRegion {
    /// Returns `true` if the blur step actually touched pixels.
    #[must_use]
    pub const fn was_applied(&self) -> bool {
        !self.region.is_empty()
    }
}

/// Configuration for the face-blur pipeline.
///
/// The defaults reproduce the behaviour of the original page: a detector
/// confidence floor of 0.2 and a blur radius of one sixth of the face's
/// shorter side, never less than five pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Minimum detector confidence passed to the [`FaceDetector`](crate::FaceDetector).
    pub min_confidence: f32,

    /// Lower bound for the derived blur radius, in pixels. At most
    /// [`MAX_BLUR_RADIUS`](Self::MAX_BLUR_RADIUS).
    pub min_blur_radius: u32,

    /// The blur radius is `min(width, height) / blur_radius_divisor`,
    /// rounded to the nearest pixel. Must be finite and positive.
    pub blur_radius_divisor: f64,

    /// Which blur implementation to apply to each region.
    pub blur: BlurKind,
}

impl PipelineConfig {
    /// Default detector confidence floor.
    pub const DEFAULT_MIN_CONFIDENCE: f32 = 0.2;
    /// Default lower bound for the blur radius.
    pub const DEFAULT_MIN_BLUR_RADIUS: u32 = 5;
    /// Default divisor applied to a region's shorter side.
    pub const DEFAULT_BLUR_RADIUS_DIVISOR: f64 = 6.0;
    /// Largest blur radius ever applied, in pixels. Derived radii are
    /// clamped to it.
    pub const MAX_BLUR_RADIUS: u32 = 254;

    /// Check the configuration for values the pipeline cannot use.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidConfig`] if `min_confidence` is not
    /// finite, `min_blur_radius` exceeds [`MAX_BLUR_RADIUS`](Self::MAX_BLUR_RADIUS),
    /// or `blur_radius_divisor` is not finite and positive.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if !self.min_confidence.is_finite() {
            return Err(PipelineError::InvalidConfig(format!(
                "min_confidence must be finite, got {}",
                self.min_confidence
            )));
        }
        if self.min_blur_radius > Self::MAX_BLUR_RADIUS {
            return Err(PipelineError::InvalidConfig(format!(
                "min_blur_radius must be at most {}, got {}",
                Self::MAX_BLUR_RADIUS,
                self.min_blur_radius
            )));
        }
        if !self.blur_radius_divisor.is_finite() || self.blur_radius_divisor <= 0.0 {
            return Err(PipelineError::InvalidConfig(format!(
                "blur_radius_divisor must be finite and positive, got {}",
                self.blur_radius_divisor
            )));
        }
        Ok(())
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            min_confidence: Self::DEFAULT_MIN_CONFIDENCE,
            min_blur_radius: Self::DEFAULT_MIN_BLUR_RADIUS,
            blur_radius_divisor: Self::DEFAULT_BLUR_RADIUS_DIVISOR,
            blur: BlurKind::default(),
        }
    }
}

/// Errors that can occur during pipeline processing.
///
/// Uses custom `Serialize`/`Deserialize` because `image::ImageError`
/// does not implement serde traits. The `ImageDecode` and `Detect`
/// variants are serialized as their `Display` strings and come back as
/// the same variant carrying that message.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Failed to decode the input image.
    #[error("failed to decode image: {0}")]
    ImageDecode(#[from] image::ImageError),

    /// The input image bytes were empty.
    #[error("input image data is empty")]
    EmptyInput,

    /// Pipeline configuration is invalid.
    #[error("invalid pipeline configuration: {0}")]
    InvalidConfig(String),

    /// The face detector failed.
    #[error("face detection failed: {0}")]
    Detect(#[from] DetectError),
}

/// Serde-compatible proxy for `PipelineError`.
#[derive(Serialize, Deserialize)]
enum PipelineErrorProxy {
    ImageDecode(String),
    EmptyInput,
    InvalidConfig(String),
    Detect(String),
}

impl Serialize for PipelineError {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let proxy = match self {
            Self::ImageDecode(e) => PipelineErrorProxy::ImageDecode(e.to_string()),
            Self::EmptyInput => PipelineErrorProxy::EmptyInput,
            Self::InvalidConfig(s) => PipelineErrorProxy::InvalidConfig(s.clone()),
            Self::Detect(e) => PipelineErrorProxy::Detect(e.to_string()),
        };
        proxy.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for PipelineError {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let proxy = PipelineErrorProxy::deserialize(deserializer)?;
        Ok(match proxy {
            PipelineErrorProxy::ImageDecode(msg) => {
                Self::ImageDecode(image::ImageError::Decoding(DecodingError::new(
                    ImageFormatHint::Unknown,
                    msg,
                )))
            }
            PipelineErrorProxy::EmptyInput => Self::EmptyInput,
            PipelineErrorProxy::InvalidConfig(s) => Self::InvalidConfig(s),
            PipelineErrorProxy::Detect(msg) => Self::Detect(DetectError::Backend(msg)),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn dimensions_pixel_count() {
        assert_eq!(Dimensions::new(800, 600).pixel_count(), 480_000);
        assert_eq!(Dimensions::new(0, 600).pixel_count(), 0);
    }

    #[test]
    fn region_is_empty() {
        assert!(Region::new(0, 0, 0, 10).is_empty());
        assert!(Region::new(0, 0, 10, 0).is_empty());
        assert!(!Region::new(5, 5, 1, 1).is_empty());
    }

    #[test]
    fn region_min_side() {
        assert_eq!(Region::new(0, 0, 20, 50).min_side(), 20);
        assert_eq!(Region::new(0, 0, 50, 20).min_side(), 20);
    }

    #[test]
    fn default_config_matches_constants() {
        let config = PipelineConfig::default();
        assert!((config.min_confidence - 0.2).abs() < f32::EPSILON);
        assert_eq!(config.min_blur_radius, 5);
        assert!((config.blur_radius_divisor - 6.0).abs() < f64::EPSILON);
        assert_eq!(config.blur, BlurKind::Stack);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_bad_divisor() {
        for divisor in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let config = PipelineConfig {
                blur_radius_divisor: divisor,
                ..PipelineConfig::default()
            };
            assert!(
                matches!(config.validate(), Err(PipelineError::InvalidConfig(_))),
                "divisor {divisor} should be rejected",
            );
        }
    }

    #[test]
    fn validate_caps_min_blur_radius() {
        let at_cap = PipelineConfig {
            min_blur_radius: PipelineConfig::MAX_BLUR_RADIUS,
            ..PipelineConfig::default()
        };
        assert!(at_cap.validate().is_ok());

        for radius in [PipelineConfig::MAX_BLUR_RADIUS + 1, u32::MAX] {
            let config = PipelineConfig {
                min_blur_radius: radius,
                ..PipelineConfig::default()
            };
            assert!(
                matches!(config.validate(), Err(PipelineError::InvalidConfig(_))),
                "min_blur_radius {radius} should be rejected",
            );
        }
    }

    #[test]
    fn validate_rejects_nan_confidence() {
        let config = PipelineConfig {
            min_confidence: f32::NAN,
            ..PipelineConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(PipelineError::InvalidConfig(_))
        ));
    }

    #[test]
    fn config_json_fills_missing_fields_with_defaults() {
        let config: PipelineConfig = serde_json::from_str(r#"{"min_confidence": 0.5}"#).unwrap();
        assert!((config.min_confidence - 0.5).abs() < f32::EPSILON);
        assert_eq!(config.min_blur_radius, PipelineConfig::DEFAULT_MIN_BLUR_RADIUS);
    }

    #[test]
    fn config_serde_round_trip() {
        let config = PipelineConfig {
            min_confidence: 0.7,
            min_blur_radius: 3,
            blur_radius_divisor: 4.0,
            blur: BlurKind::Gaussian,
        };
        let json = serde_json::to_string(&config).unwrap();
        let back: PipelineConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, back);
    }

    #[test]
    fn error_serializes_detect_as_message() {
        let err = PipelineError::Detect(DetectError::ModelNotLoaded);
        let json = serde_json::to_string(&err).unwrap();
        let back: PipelineError = serde_json::from_str(&json).unwrap();
        assert!(
            matches!(&back, PipelineError::Detect(DetectError::Backend(msg)) if msg.contains("not loaded")),
            "expected Detect(Backend) carrying the message, got {back:?}",
        );
    }

    #[test]
    fn error_image_decode_round_trips_as_decode_error() {
        let err = crate::decode::decode_rgba(&[0xFF, 0x00]).unwrap_err();
        assert!(matches!(err, PipelineError::ImageDecode(_)));

        let json = serde_json::to_string(&err).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let message = value["ImageDecode"].as_str().unwrap().to_owned();
        let back: PipelineError = serde_json::from_str(&json).unwrap();

        assert!(
            matches!(&back, PipelineError::ImageDecode(inner) if inner.to_string().contains(&message)),
            "expected ImageDecode carrying {message:?}, got {back:?}",
        );
    }

    #[test]
    fn error_empty_input_round_trips() {
        let json = serde_json::to_string(&PipelineError::EmptyInput).unwrap();
        let back: PipelineError = serde_json::from_str(&json).unwrap();
        assert!(matches!(back, PipelineError::EmptyInput));
    }
}
