//! Export panel component with the download button.

use std::rc::Rc;

use blurface_export::{DOWNLOAD_FILENAME, PNG_MIME_TYPE};
use blurface_pipeline::Canvas;
use dioxus::prelude::*;
use dioxus_free_icons::Icon;
use dioxus_free_icons::icons::ld_icons::LdDownload;

use crate::raster;

/// Props for the [`ExportPanel`] component.
#[derive(Props, Clone)]
pub struct ExportPanelProps {
    /// The processed canvas. `None` disables the button.
    canvas: Option<Rc<Canvas>>,
}

impl PartialEq for ExportPanelProps {
    fn eq(&self, other: &Self) -> bool {
        match (&self.canvas, &other.canvas) {
            (Some(a), Some(b)) => Rc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }
}

/// Download button that saves the canvas as `blurred-image.png`.
#[component]
pub fn ExportPanel(props: ExportPanelProps) -> Element {
    let has_result = props.canvas.is_some();
    let mut export_error = use_signal(|| Option::<String>::None);

    // Clear stale export errors when the result changes.
    let result_present = props.canvas.is_some();
    use_effect(move || {
        let _ = result_present;
        export_error.set(None);
    });

    let on_click = {
        let canvas = props.canvas.clone();
        move |_| {
            let Some(ref canvas) = canvas else {
                return;
            };
            let outcome = blurface_export::canvas_to_png(canvas)
                .map_err(|e| e.to_string())
                .and_then(|png| {
                    raster::trigger_download(&png, DOWNLOAD_FILENAME, PNG_MIME_TYPE)
                        .map_err(|e| e.to_string())
                });
            match outcome {
                Ok(()) => export_error.set(None),
                Err(e) => {
                    log::error!("download failed: {e}");
                    export_error.set(Some(format!("Download failed: {e}")));
                }
            }
        }
    };

    rsx! {
        div { class: "export-panel",
            if let Some(ref err) = export_error() {
                p { class: "text-error text-sm", "{err}" }
            }

            button {
                class: if has_result { "btn btn-primary" } else { "btn btn-disabled" },
                disabled: !has_result,
                onclick: on_click,
                Icon { width: 16, height: 16, icon: LdDownload }
                "Download"
            }
        }
    }
}
