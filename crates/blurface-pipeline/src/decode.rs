//! Image decoding.
//!
//! Accepts raw image bytes (PNG, JPEG) and produces an RGBA raster for
//! the canvas and the face detector.
//!
//! This is the first step in the pipeline: raw bytes in, `RgbaImage` out.

use image::GrayImage;

use crate::types::{PipelineError, RgbaImage};

/// Decode raw image bytes into an RGBA image.
///
/// Supports whatever formats the `image` crate was built with (PNG and
/// JPEG in this workspace). The format is sniffed from the bytes, not
/// taken from a filename.
///
/// # Errors
///
/// Returns [`PipelineError::EmptyInput`] if `bytes` is empty.
/// Returns [`PipelineError::ImageDecode`] if the image format is
/// unrecognized or the data is corrupt.
pub fn decode_rgba(bytes: &[u8]) -> Result<RgbaImage, PipelineError> {
    if bytes.is_empty() {
        return Err(PipelineError::EmptyInput);
    }

    let img = image::load_from_memory(bytes)?;
    Ok(img.to_rgba8())
}

/// Convert an RGBA image to grayscale for detectors that work on
/// luminance only.
///
/// Uses the `image` crate's luminance weights; alpha is ignored.
#[must_use = "returns the grayscale image"]
pub fn to_grayscale(image: &RgbaImage) -> GrayImage {
    image::imageops::grayscale(image)
}
