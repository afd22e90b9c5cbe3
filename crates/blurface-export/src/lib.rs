//! blurface-export: Pure output serializers (sans-IO)
//!
//! Turns a blurred [`Canvas`](blurface_pipeline::Canvas) into bytes a
//! browser or filesystem can store. Currently supports PNG.

pub mod png;

pub use png::{DOWNLOAD_FILENAME, ExportError, PNG_MIME_TYPE, canvas_to_png, to_png};
