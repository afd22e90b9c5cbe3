//! Dioxus UI components for blurface.
//!
//! Provides the file picker with drag-and-drop, the blurred image
//! preview, and the download panel.

mod export;
mod preview;
mod upload;

pub use export::ExportPanel;
pub use preview::Preview;
pub use upload::FileUpload;
