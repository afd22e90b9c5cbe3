//! Preview of the blurred canvas.

use std::rc::Rc;

use blurface_pipeline::Canvas;
use dioxus::prelude::*;

use crate::raster;

/// Props for the [`Preview`] component.
#[derive(Props, Clone)]
pub struct PreviewProps {
    /// The processed canvas to show.
    canvas: Rc<Canvas>,
    /// Number of faces that were blurred.
    face_count: usize,
}

impl PartialEq for PreviewProps {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.canvas, &other.canvas) && self.face_count == other.face_count
    }
}

/// Renders the canvas as an `<img>` backed by a PNG Blob URL.
///
/// The URL is revoked once the image has loaded, when it is replaced by
/// a newer one, or when the component unmounts.
#[component]
pub fn Preview(props: PreviewProps) -> Element {
    // Track the current blob URL so it is revoked even if the <img> is
    // replaced before onload/onerror fires.
    let mut prev_blob_url: Signal<Option<String>> = use_signal(|| None);

    {
        let prev_blob_url = prev_blob_url;
        use_drop(move || {
            if let Some(ref url) = *prev_blob_url.peek() {
                raster::revoke_blob_url(url);
            }
        });
    }

    if let Some(ref prev) = prev_blob_url.take() {
        raster::revoke_blob_url(prev);
    }

    let dims = props.canvas.dimensions();
    let summary = match props.face_count {
        0 => "No faces found".to_owned(),
        1 => "Blurred 1 face".to_owned(),
        n => format!("Blurred {n} faces"),
    };

    match raster::rgba_image_to_blob_url(props.canvas.image()) {
        Ok(url) => {
            prev_blob_url.set(Some(url.clone()));
            let url_for_error = url.clone();
            rsx! {
                figure { class: "preview",
                    img {
                        src: "{url}",
                        class: "preview-image",
                        width: "{dims.width}",
                        height: "{dims.height}",
                        alt: "Image with faces blurred",
                        onload: move |_| raster::revoke_blob_url(&url),
                        onerror: move |_| raster::revoke_blob_url(&url_for_error),
                    }
                    figcaption { class: "text-secondary text-sm",
                        "{summary} ({dims.width}\u{d7}{dims.height})"
                    }
                }
            }
        }
        Err(e) => rsx! {
            p { class: "text-error text-sm", "Failed to render preview: {e}" }
        },
    }
}
