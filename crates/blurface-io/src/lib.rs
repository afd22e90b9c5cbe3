//! blurface-io: Browser I/O and Dioxus component library.
//!
//! Handles file uploads, face model fetching, Blob downloads, preview
//! Blob URLs, and provides reusable UI components for the blurface web
//! application.

pub mod components;
pub mod logging;
pub mod model;
pub mod raster;

pub use components::{ExportPanel, FileUpload, Preview};
pub use model::{MODEL_URL, ModelError, load_detector};
