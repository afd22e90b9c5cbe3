//! Face model fetching.
//!
//! The SeetaFace model is a static asset served next to the app. It is
//! fetched once with `window.fetch()` and parsed into a
//! [`RustfaceDetector`]. Requires a browser environment
//! (`wasm32-unknown-unknown` target).

use blurface_pipeline::{DetectError, RustfaceDetector};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;

/// Where the app serves the frontal face model from.
pub const MODEL_URL: &str = "/models/seeta_fd_frontal_v1.0.bin";

/// Errors that can occur while loading the face model.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// A browser API call returned an error or a required object was missing.
    #[error("browser API error: {0}")]
    JsError(String),

    /// The server answered with a non-success status.
    #[error("failed to fetch {url}: HTTP {status}")]
    Http {
        /// Requested URL.
        url: String,
        /// HTTP status code.
        status: u16,
    },

    /// The bytes arrived but are not a usable model.
    #[error(transparent)]
    Detect(#[from] DetectError),
}

impl From<JsValue> for ModelError {
    fn from(value: JsValue) -> Self {
        Self::JsError(format!("{value:?}"))
    }
}

/// Fetch raw bytes from `url`.
///
/// # Errors
///
/// Returns [`ModelError::Http`] on a non-2xx response and
/// [`ModelError::JsError`] if the request or body read fails.
#[allow(clippy::future_not_send)] // WASM is single-threaded; JsFuture is !Send
pub async fn fetch_bytes(url: &str) -> Result<Vec<u8>, ModelError> {
    let window =
        web_sys::window().ok_or_else(|| ModelError::JsError("no global window".into()))?;
    let response: web_sys::Response = JsFuture::from(window.fetch_with_str(url))
        .await?
        .dyn_into()
        .map_err(|e| ModelError::JsError(format!("fetch did not return a Response: {e:?}")))?;

    if !response.ok() {
        return Err(ModelError::Http {
            url: url.to_owned(),
            status: response.status(),
        });
    }

    let buffer = JsFuture::from(response.array_buffer()?).await?;
    Ok(js_sys::Uint8Array::new(&buffer).to_vec())
}

/// Fetch and parse the face model at [`MODEL_URL`].
///
/// # Errors
///
/// Returns [`ModelError`] if the fetch fails or the model is invalid.
#[allow(clippy::future_not_send)] // WASM is single-threaded; JsFuture is !Send
pub async fn load_detector() -> Result<RustfaceDetector, ModelError> {
    let bytes = fetch_bytes(MODEL_URL).await?;
    log::info!("fetched {MODEL_URL} ({} bytes)", bytes.len());
    Ok(RustfaceDetector::from_bytes(&bytes)?)
}
