//! Blob handling for rasters: preview URLs and file downloads.
//!
//! Converts canvas pixels to browser-displayable Blob URLs by encoding
//! to PNG and creating object URLs via the Web API. Dioxus has no file
//! download API, so [`trigger_download`] wraps bytes in a Blob and clicks
//! a temporary `<a>` element.

use blurface_export::{ExportError, PNG_MIME_TYPE};
use blurface_pipeline::RgbaImage;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::BlobPropertyBag;

/// Errors from Blob creation, preview URLs and downloads.
#[derive(Debug, thiserror::Error)]
pub enum RasterError {
    /// PNG encoding failed.
    #[error(transparent)]
    Export(#[from] ExportError),

    /// A browser API call returned an error.
    #[error("browser API error: {0}")]
    JsError(String),
}

impl From<JsValue> for RasterError {
    fn from(value: JsValue) -> Self {
        Self::JsError(format!("{value:?}"))
    }
}

/// Wrap raw bytes in a `Blob` with the given MIME type.
///
/// # Errors
///
/// Returns the JS exception if the `Blob` constructor throws.
pub fn bytes_to_blob(bytes: &[u8], mime_type: &str) -> Result<web_sys::Blob, JsValue> {
    let uint8_array = js_sys::Uint8Array::from(bytes);
    let parts = js_sys::Array::new();
    parts.push(&uint8_array);

    let opts = BlobPropertyBag::new();
    opts.set_type(mime_type);
    web_sys::Blob::new_with_u8_array_sequence_and_options(&parts, &opts)
}

/// Encode an `RgbaImage` as a PNG Blob URL for use as an `<img src>`.
///
/// The returned URL must be revoked via [`revoke_blob_url`] when no
/// longer needed to avoid memory leaks.
///
/// # Errors
///
/// Returns [`RasterError::Export`] if PNG encoding fails.
/// Returns [`RasterError::JsError`] if Blob or URL creation fails.
pub fn rgba_image_to_blob_url(image: &RgbaImage) -> Result<String, RasterError> {
    let png_bytes = blurface_export::to_png(image)?;
    let blob = bytes_to_blob(&png_bytes, PNG_MIME_TYPE)?;
    let url = web_sys::Url::create_object_url_with_blob(&blob)?;
    Ok(url)
}

/// Revoke a Blob URL previously created by [`rgba_image_to_blob_url`].
///
/// Best-effort: failures are silently ignored since the URL may have
/// already been revoked or garbage collected.
pub fn revoke_blob_url(url: &str) {
    let _ = web_sys::Url::revoke_object_url(url);
}

/// Trigger a download of binary `data` in the browser.
///
/// Wraps the bytes in a `Blob` of type `mime_type`, generates an object
/// URL, and programmatically clicks a temporary `<a download="filename">`
/// element. The object URL is revoked after the click.
///
/// # Errors
///
/// Returns [`RasterError::JsError`] if any browser API call fails
/// (e.g., `Blob` creation, `URL.createObjectURL`, element creation).
pub fn trigger_download(data: &[u8], filename: &str, mime_type: &str) -> Result<(), RasterError> {
    let window =
        web_sys::window().ok_or_else(|| RasterError::JsError("no global window".into()))?;
    let document = window
        .document()
        .ok_or_else(|| RasterError::JsError("no document".into()))?;

    let blob = bytes_to_blob(data, mime_type)?;
    let url = web_sys::Url::create_object_url_with_blob(&blob)?;

    let anchor: web_sys::HtmlAnchorElement = document
        .create_element("a")?
        .dyn_into::<web_sys::HtmlAnchorElement>()
        .map_err(|e| RasterError::JsError(format!("failed to cast element: {e:?}")))?;

    anchor.set_href(&url);
    anchor.set_download(filename);

    let body = document
        .body()
        .ok_or_else(|| RasterError::JsError("no document body".into()))?;
    body.append_child(&anchor)?;
    anchor.click();

    // The download has already started; cleanup failures are not errors.
    let _ = body.remove_child(&anchor);
    revoke_blob_url(&url);

    Ok(())
}
