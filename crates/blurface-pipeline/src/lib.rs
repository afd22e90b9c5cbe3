//! blurface-pipeline: Pure face-blur pipeline (sans-IO).
//!
//! Blurs every detected face in an image through:
//! decode -> draw onto canvas -> detect faces -> clamp each box ->
//! derive blur radius -> blur region in place.
//!
//! This crate has **no I/O dependencies** -- it operates on in-memory
//! byte slices and a caller-owned [`Canvas`]. Face detection is a
//! capability supplied by the caller through [`FaceDetector`]. All
//! browser/filesystem interaction lives in `blurface-io` and
//! `blurface-cli`.

pub mod blur;
pub mod canvas;
pub mod decode;
pub mod detect;
pub mod diagnostics;
pub mod region;
#[cfg(feature = "rustface")]
pub mod rustface_backend;
pub mod types;

pub use blur::{BlurEffect, BlurKind};
pub use canvas::Canvas;
pub use detect::{DetectError, FaceDetector};
#[cfg(feature = "rustface")]
pub use rustface_backend::RustfaceDetector;
pub use types::{
    BlurredRegion, DetectionBox, Dimensions, PipelineConfig, PipelineError, Region, RgbaImage,
};

/// Run the full face-blur pipeline into `canvas`.
///
/// Takes raw image bytes (PNG, JPEG), a detector and a configuration.
/// On success the canvas holds the image with every detected face
/// blurred, and the returned list records what was blurred, in detector
/// order.
///
/// # Pipeline steps
///
/// 1. Decode the image
/// 2. Resize the canvas to the image and draw it at the origin
/// 3. Detect faces on the decoded image (not the canvas)
/// 4. For each box: clamp to the canvas, derive a radius, blur in place
///
/// Overlapping boxes are blurred once each, so their overlap is blurred
/// more than once.
///
/// # Errors
///
/// Returns [`PipelineError::InvalidConfig`] if `config` fails
/// [`PipelineConfig::validate`].
/// Returns [`PipelineError::EmptyInput`] if `image_bytes` is empty.
/// Returns [`PipelineError::ImageDecode`] if the image format is unrecognized.
/// In these three cases the canvas is left untouched.
///
/// Returns [`PipelineError::Detect`] if the detector fails. The canvas
/// then holds the decoded image without any blur applied.
pub fn process<D: FaceDetector + ?Sized>(
    canvas: &mut Canvas,
    image_bytes: &[u8],
    detector: &D,
    config: &PipelineConfig,
) -> Result<Vec<BlurredRegion>, PipelineError> {
    config.validate()?;
    let image = decode_onto(canvas, image_bytes)?;
    let detections = detect_faces(detector, &image, config)?;
    Ok(blur_detections(canvas, &detections, config))
}

/// Decode `image_bytes` and draw the result onto `canvas`.
///
/// The canvas is untouched when decoding fails.
pub(crate) fn decode_onto(
    canvas: &mut Canvas,
    image_bytes: &[u8],
) -> Result<RgbaImage, PipelineError> {
    let image = decode::decode_rgba(image_bytes)?;
    canvas.draw(&image);
    Ok(image)
}

/// Detect faces on the decoded image (not the canvas).
pub(crate) fn detect_faces<D: FaceDetector + ?Sized>(
    detector: &D,
    image: &RgbaImage,
    config: &PipelineConfig,
) -> Result<Vec<DetectionBox>, PipelineError> {
    let detections = detector.detect(image, config.min_confidence)?;
    log::info!(
        "detected {} face(s) in {}x{} image",
        detections.len(),
        image.width(),
        image.height(),
    );
    Ok(detections)
}

/// Convenience wrapper around [`process`] that owns its canvas.
///
/// # Errors
///
/// Same as [`process`].
pub fn process_image<D: FaceDetector + ?Sized>(
    image_bytes: &[u8],
    detector: &D,
    config: &PipelineConfig,
) -> Result<(Canvas, Vec<BlurredRegion>), PipelineError> {
    let mut canvas = Canvas::new();
    let blurred = process(&mut canvas, image_bytes, detector, config)?;
    Ok((canvas, blurred))
}

/// Blur every detection on `canvas`, in order.
///
/// Each box is clamped with [`region::clamp_to_surface`] and blurred with
/// a radius from [`region::blur_radius`]. Boxes that clamp to an empty
/// region are recorded with a radius of zero and leave the canvas
/// untouched.
pub fn blur_detections(
    canvas: &mut Canvas,
    detections: &[DetectionBox],
    config: &PipelineConfig,
) -> Vec<BlurredRegion> {
    let dims = canvas.dimensions();
    detections
        .iter()
        .map(|detection| {
            let region = region::clamp_to_surface(detection, dims);
            if region.is_empty() {
                log::warn!("detection {detection:?} lies outside the {dims:?} canvas; skipped");
                return BlurredRegion {
                    detection: *detection,
                    region,
                    radius: 0,
                };
            }
            let radius = region::blur_radius(region, config);
            log::debug!("blurring {region:?} with radius {radius}");
            canvas.blur(&config.blur, region, radius);
            BlurredRegion {
                detection: *detection,
                region,
                radius,
            }
        })
        .collect()
}
