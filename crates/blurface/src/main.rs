use std::rc::Rc;

use blurface_io::{ExportPanel, FileUpload, Preview};
use blurface_pipeline::{Canvas, PipelineConfig, RustfaceDetector};
use dioxus::prelude::*;

fn main() {
    blurface_io::logging::init(log::LevelFilter::Info);
    dioxus::launch(app);
}

/// Face model lifecycle.
#[derive(Clone)]
enum ModelState {
    Loading,
    Ready(Rc<RustfaceDetector>),
    Failed(String),
}

/// Output of one successful pipeline pass.
#[derive(Clone)]
struct Processed {
    canvas: Rc<Canvas>,
    face_count: usize,
}

/// Root application component.
///
/// Loads the face model once at mount, then blurs every uploaded image
/// as soon as both the image and the model are available.
#[allow(clippy::too_many_lines)]
fn app() -> Element {
    // --- Application state ---
    let mut model = use_signal(|| ModelState::Loading);
    let mut image_bytes = use_signal(|| Option::<Vec<u8>>::None);
    let mut result = use_signal(|| Option::<Processed>::None);
    let mut processing = use_signal(|| false);
    let mut error = use_signal(|| Option::<String>::None);
    let mut generation = use_signal(|| 0u64);
    let config = use_signal(PipelineConfig::default);

    // --- Model loading ---
    use_future(move || async move {
        match blurface_io::load_detector().await {
            Ok(detector) => model.set(ModelState::Ready(Rc::new(detector))),
            Err(e) => {
                log::error!("face model failed to load: {e}");
                model.set(ModelState::Failed(e.to_string()));
            }
        }
    });

    // --- File upload handler ---
    let on_upload = move |(bytes, name): (Vec<u8>, String)| {
        log::info!("uploaded {name} ({} bytes)", bytes.len());
        result.set(None);
        error.set(None);
        image_bytes.set(Some(bytes));
    };

    // --- Pipeline processing effect ---
    // Re-runs whenever image_bytes, the model or config changes, so an
    // upload made while the model is still loading is processed as soon
    // as it is ready. Spawns an async task so the "Processing..."
    // indicator renders before the synchronous pipeline blocks the thread.
    use_effect(move || {
        let Some(bytes) = image_bytes() else {
            return;
        };
        let ModelState::Ready(detector) = model() else {
            return;
        };
        let cfg = config();

        // Any in-flight task from an earlier upload is now stale.
        generation += 1;
        let my_generation = *generation.peek();

        processing.set(true);
        error.set(None);

        spawn(async move {
            // Yield so the browser can paint the "Processing..." state.
            gloo_timers::future::TimeoutFuture::new(0).await;

            let outcome = blurface_pipeline::process_image(&bytes, &*detector, &cfg);

            if *generation.peek() != my_generation {
                return;
            }

            match outcome {
                Ok((canvas, blurred)) => {
                    let face_count = blurred.iter().filter(|b| b.was_applied()).count();
                    result.set(Some(Processed {
                        canvas: Rc::new(canvas),
                        face_count,
                    }));
                    error.set(None);
                }
                Err(e) => {
                    log::error!("processing failed: {e}");
                    result.set(None);
                    error.set(Some(e.to_string()));
                }
            }

            processing.set(false);
        });
    });

    let model_status = match model() {
        ModelState::Loading if image_bytes().is_some() => {
            Some("Waiting for the face detection model...".to_owned())
        }
        ModelState::Loading => Some("Loading face detection model...".to_owned()),
        ModelState::Failed(e) => Some(format!("Face detection model failed to load: {e}")),
        ModelState::Ready(_) => None,
    };
    let model_failed = matches!(model(), ModelState::Failed(_));

    // --- Layout ---
    rsx! {
        style { dangerous_inner_html: include_str!("../assets/main.css") }

        div { class: "app",
            header { class: "app-header",
                h1 { "blurface" }
                p { class: "text-muted text-sm",
                    "Blur every face in a photo. Nothing leaves your browser."
                }
            }

            div { class: "app-main",
                if let Some(ref status) = model_status {
                    p {
                        class: if model_failed { "text-error" } else { "text-secondary pulse" },
                        "{status}"
                    }
                }

                if processing() {
                    div { class: "placeholder",
                        p { class: "text-secondary pulse", "Processing..." }
                    }
                } else if let Some(ref processed) = result() {
                    Preview {
                        canvas: Rc::clone(&processed.canvas),
                        face_count: processed.face_count,
                    }
                } else if image_bytes().is_none() {
                    div { class: "placeholder",
                        p { class: "text-muted", "Upload a photo to get started" }
                    }
                }

                if let Some(ref err) = error() {
                    div { class: "error-box",
                        p { class: "text-error text-sm", "{err}" }
                    }
                }

                ExportPanel {
                    canvas: result().map(|p| p.canvas),
                }
            }

            div { class: "app-footer",
                FileUpload {
                    on_upload: on_upload,
                }
            }
        }
    }
}
