//! Pipeline diagnostics: timing and counts for each stage.
//!
//! [`process_with_diagnostics`] runs the same steps as
//! [`process`](crate::process) while recording how long each one took
//! and what it produced. Useful for tuning the detector threshold and
//! blur parameters from the CLI.
//!
//! Timestamps are captured via the `web-time` crate, which uses
//! `performance.now()` on WASM and `std::time::Instant` on native.
//!
//! Durations are serialized as fractional seconds (`f64`) for JSON
//! compatibility, since `std::time::Duration` does not implement serde
//! traits.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use web_time::Instant;

use crate::canvas::Canvas;
use crate::detect::FaceDetector;
use crate::types::{BlurredRegion, PipelineConfig, PipelineError};

/// Serde support for `std::time::Duration` as fractional seconds.
mod duration_serde {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a `Duration` as fractional seconds (`f64`).
    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs_f64().serialize(serializer)
    }

    /// Deserialize a `Duration` from fractional seconds (`f64`).
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(|_| {
            serde::de::Error::custom(
                "duration seconds must be finite, non-negative, and representable as a Duration",
            )
        })
    }
}

/// Diagnostics collected from a single pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessDiagnostics {
    /// Image decoding and drawing onto the canvas.
    pub decode: StageDiagnostics,
    /// Face detection.
    pub detect: StageDiagnostics,
    /// Clamping and blurring every detected region.
    pub blur: StageDiagnostics,
    /// Total wall-clock duration of the entire pipeline (seconds).
    #[serde(with = "duration_serde")]
    pub total_duration: Duration,
}

/// Diagnostics for a single pipeline stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageDiagnostics {
    /// Wall-clock duration of this stage (seconds).
    #[serde(with = "duration_serde")]
    pub duration: Duration,
    /// Stage-specific metrics.
    pub metrics: StageMetrics,
}

/// Stage-specific metrics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StageMetrics {
    /// Image decoding metrics.
    Decode {
        /// Size of the input image bytes.
        input_bytes: usize,
        /// Decoded image width in pixels.
        width: u32,
        /// Decoded image height in pixels.
        height: u32,
        /// Total pixel count (`width * height`).
        pixel_count: u64,
    },
    /// Face detection metrics.
    Detect {
        /// Confidence floor passed to the detector.
        min_confidence: f32,
        /// Number of boxes returned.
        face_count: usize,
    },
    /// Region blur metrics.
    Blur {
        /// Regions actually blurred.
        blurred_count: usize,
        /// Detections that clamped to an empty region.
        skipped_count: usize,
        /// Smallest radius applied (0 when nothing was blurred).
        min_radius: u32,
        /// Largest radius applied (0 when nothing was blurred).
        max_radius: u32,
    },
}

impl ProcessDiagnostics {
    /// Format diagnostics as a human-readable report.
    #[must_use]
    pub fn report(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Pipeline Diagnostics Report\n{}", "=".repeat(60)));
        lines.push(format!(
            "Total duration: {:.3}ms",
            duration_ms(self.total_duration),
        ));
        lines.push(String::new());

        lines.push(format!(
            "{:<12} {:>10} {:>10}  {}",
            "Stage", "Duration", "% Total", "Details"
        ));
        lines.push("-".repeat(72));

        let total_ms = duration_ms(self.total_duration);
        for (name, diag) in [
            ("Decode", &self.decode),
            ("Detect", &self.detect),
            ("Blur", &self.blur),
        ] {
            let ms = duration_ms(diag.duration);
            let pct = if total_ms > 0.0 {
                ms / total_ms * 100.0
            } else {
                0.0
            };
            let details = format_metrics(&diag.metrics);
            lines.push(format!("{name:<12} {ms:>8.3}ms {pct:>9.1}%  {details}"));
        }

        lines.join("\n")
    }
}

/// Run [`process`](crate::process) with per-stage diagnostics.
///
/// # Errors
///
/// Same as [`process`](crate::process).
pub fn process_with_diagnostics<D: FaceDetector + ?Sized>(
    canvas: &mut Canvas,
    image_bytes: &[u8],
    detector: &D,
    config: &PipelineConfig,
) -> Result<(Vec<BlurredRegion>, ProcessDiagnostics), PipelineError> {
    config.validate()?;
    let start = Instant::now();

    let t = Instant::now();
    let image = crate::decode_onto(canvas, image_bytes)?;
    let decode = StageDiagnostics {
        duration: t.elapsed(),
        metrics: StageMetrics::Decode {
            input_bytes: image_bytes.len(),
            width: image.width(),
            height: image.height(),
            pixel_count: canvas.dimensions().pixel_count(),
        },
    };

    let t = Instant::now();
    let detections = crate::detect_faces(detector, &image, config)?;
    let detect = StageDiagnostics {
        duration: t.elapsed(),
        metrics: StageMetrics::Detect {
            min_confidence: config.min_confidence,
            face_count: detections.len(),
        },
    };

    let t = Instant::now();
    let blurred = crate::blur_detections(canvas, &detections, config);
    let blur = StageDiagnostics {
        duration: t.elapsed(),
        metrics: blur_metrics(&blurred),
    };

    let diagnostics = ProcessDiagnostics {
        decode,
        detect,
        blur,
        total_duration: start.elapsed(),
    };
    Ok((blurred, diagnostics))
}

/// Summarize the output of the blur stage.
fn blur_metrics(blurred: &[BlurredRegion]) -> StageMetrics {
    let applied = || blurred.iter().filter(|b| b.was_applied()).map(|b| b.radius);
    let blurred_count = applied().count();
    StageMetrics::Blur {
        blurred_count,
        skipped_count: blurred.len() - blurred_count,
        min_radius: applied().min().unwrap_or(0),
        max_radius: applied().max().unwrap_or(0),
    }
}

/// Convert a `Duration` to milliseconds as `f64`.
fn duration_ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

/// Format stage metrics into a compact detail string.
fn format_metrics(metrics: &StageMetrics) -> String {
    match metrics {
        StageMetrics::Decode {
            input_bytes,
            width,
            height,
            ..
        } => format!("{input_bytes} bytes -> {width}x{height}"),
        StageMetrics::Detect {
            min_confidence,
            face_count,
        } => format!("{face_count} face(s) at min_confidence={min_confidence:.2}"),
        StageMetrics::Blur {
            blurred_count,
            skipped_count,
            min_radius,
            max_radius,
        } => format!(
            "{blurred_count} blurred, {skipped_count} skipped, radius {min_radius}..={max_radius}"
        ),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::detect::DetectError;
    use crate::types::{DetectionBox, Region, RgbaImage};

    struct TwoFaces;

    impl FaceDetector for TwoFaces {
        fn detect(&self, _: &RgbaImage, _: f32) -> Result<Vec<DetectionBox>, DetectError> {
            Ok(vec![
                DetectionBox::new(2.0, 2.0, 30.0, 30.0, 0.9),
                DetectionBox::new(500.0, 500.0, 30.0, 30.0, 0.4),
            ])
        }
    }

    fn png(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_fn(width, height, |x, _| {
            if x % 2 == 0 {
                image::Rgba([0, 0, 0, 255])
            } else {
                image::Rgba([255, 255, 255, 255])
            }
        });
        let mut buf = Vec::new();
        let encoder = image::codecs::png::PngEncoder::new(&mut buf);
        image::ImageEncoder::write_image(
            encoder,
            img.as_raw(),
            width,
            height,
            image::ExtendedColorType::Rgba8,
        )
        .unwrap();
        buf
    }

    #[test]
    fn duration_ms_converts_correctly() {
        let d = Duration::from_millis(1234);
        let ms = duration_ms(d);
        assert!((ms - 1234.0).abs() < 0.01);
    }

    #[test]
    fn diagnostics_match_process_output() {
        let bytes = png(64, 48);
        let mut canvas = Canvas::new();
        let (blurred, diag) = process_with_diagnostics(
            &mut canvas,
            &bytes,
            &TwoFaces,
            &PipelineConfig::default(),
        )
        .unwrap();

        assert_eq!(blurred.len(), 2);
        assert_eq!(blurred[0].region, Region::new(2, 2, 30, 30));

        assert!(matches!(
            diag.decode.metrics,
            StageMetrics::Decode {
                width: 64,
                height: 48,
                pixel_count: 3072,
                ..
            }
        ));
        assert!(matches!(
            diag.detect.metrics,
            StageMetrics::Detect { face_count: 2, .. }
        ));
        assert!(matches!(
            diag.blur.metrics,
            StageMetrics::Blur {
                blurred_count: 1,
                skipped_count: 1,
                min_radius: 5,
                max_radius: 5,
            }
        ));
        assert!(diag.total_duration >= diag.detect.duration);
    }

    #[test]
    fn diagnostics_run_leaves_same_canvas_as_process() {
        let bytes = png(64, 48);
        let config = PipelineConfig::default();

        let mut plain = Canvas::new();
        let expected = crate::process(&mut plain, &bytes, &TwoFaces, &config).unwrap();

        let mut timed = Canvas::new();
        let (blurred, _) = process_with_diagnostics(&mut timed, &bytes, &TwoFaces, &config).unwrap();

        assert_eq!(blurred, expected);
        assert_eq!(timed, plain);
    }

    #[test]
    fn diagnostics_propagate_errors() {
        let mut canvas = Canvas::new();
        let result =
            process_with_diagnostics(&mut canvas, &[], &TwoFaces, &PipelineConfig::default());
        assert!(matches!(result, Err(PipelineError::EmptyInput)));
    }

    #[test]
    fn blur_metrics_empty() {
        assert!(matches!(
            blur_metrics(&[]),
            StageMetrics::Blur {
                blurred_count: 0,
                skipped_count: 0,
                min_radius: 0,
                max_radius: 0,
            }
        ));
    }

    #[test]
    fn report_lists_every_stage() {
        let diag = ProcessDiagnostics {
            decode: StageDiagnostics {
                duration: Duration::from_millis(10),
                metrics: StageMetrics::Decode {
                    input_bytes: 1000,
                    width: 100,
                    height: 80,
                    pixel_count: 8000,
                },
            },
            detect: StageDiagnostics {
                duration: Duration::from_millis(80),
                metrics: StageMetrics::Detect {
                    min_confidence: 0.2,
                    face_count: 3,
                },
            },
            blur: StageDiagnostics {
                duration: Duration::from_millis(10),
                metrics: StageMetrics::Blur {
                    blurred_count: 3,
                    skipped_count: 0,
                    min_radius: 5,
                    max_radius: 12,
                },
            },
            total_duration: Duration::from_millis(100),
        };

        let report = diag.report();
        assert!(report.contains("Pipeline Diagnostics Report"));
        assert!(report.contains("Detect"));
        assert!(report.contains("3 face(s)"));
        assert!(report.contains("radius 5..=12"));
        assert!(report.contains("100x80"));
    }

    #[test]
    fn diagnostics_serialize_durations_as_seconds() {
        let stage = StageDiagnostics {
            duration: Duration::from_millis(1500),
            metrics: StageMetrics::Detect {
                min_confidence: 0.2,
                face_count: 0,
            },
        };
        let json = serde_json::to_value(&stage).unwrap();
        assert!((json["duration"].as_f64().unwrap() - 1.5).abs() < 1e-9);
    }
}
