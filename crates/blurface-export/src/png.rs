//! PNG export serializer.
//!
//! Encodes the canvas as a lossless RGBA PNG. Whatever the input format
//! was (JPEG included), the download is always a PNG named
//! [`DOWNLOAD_FILENAME`].
//!
//! This is a pure function with no I/O -- it returns a `Vec<u8>`.

use image::ImageEncoder;
use image::codecs::png::PngEncoder;

use blurface_pipeline::{Canvas, RgbaImage};

/// File name offered when the user downloads the result.
pub const DOWNLOAD_FILENAME: &str = "blurred-image.png";

/// MIME type of the exported bytes.
pub const PNG_MIME_TYPE: &str = "image/png";

/// Errors that can occur during export.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// Nothing has been drawn yet, so there is nothing to export.
    #[error("nothing to export: the canvas is empty")]
    EmptyCanvas,

    /// The PNG encoder rejected the image.
    #[error("PNG encoding failed: {0}")]
    PngEncode(#[from] image::ImageError),
}

/// Encode an RGBA image as PNG bytes.
///
/// # Errors
///
/// Returns [`ExportError::EmptyCanvas`] for a zero-sized image and
/// [`ExportError::PngEncode`] if encoding fails.
pub fn to_png(image: &RgbaImage) -> Result<Vec<u8>, ExportError> {
    if image.width() == 0 || image.height() == 0 {
        return Err(ExportError::EmptyCanvas);
    }
    let mut png_bytes = Vec::new();
    let encoder = PngEncoder::new(&mut png_bytes);
    encoder.write_image(
        image.as_raw(),
        image.width(),
        image.height(),
        image::ExtendedColorType::Rgba8,
    )?;
    Ok(png_bytes)
}

/// Encode the current contents of `canvas` as PNG bytes.
///
/// # Errors
///
/// Same as [`to_png`].
pub fn canvas_to_png(canvas: &Canvas) -> Result<Vec<u8>, ExportError> {
    to_png(canvas.image())
}
