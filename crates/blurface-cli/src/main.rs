//! blurface-cli: blur faces in an image file and report what happened.
//!
//! Runs the same pipeline as the web app on a local file, writes the
//! blurred PNG, and prints per-stage diagnostics. Useful for:
//!
//! - Blurring photos without a browser
//! - Tuning the confidence threshold and blur radius parameters
//! - Seeing which boxes the detector found (`--annotate`)
//!
//! # Usage
//!
//! ```text
//! cargo run --release --bin blurface-cli -- [OPTIONS] <INPUT>
//! ```
//!
//! Log verbosity follows `RUST_LOG` (default `info`); logs go to stderr.

#![allow(clippy::print_stdout, clippy::print_stderr)]

mod annotate;

use std::path::PathBuf;
use std::process::ExitCode;

use blurface_pipeline::{BlurKind, Canvas, PipelineConfig, RustfaceDetector};
use clap::{Parser, ValueEnum};

/// Blur every face in an image.
///
/// Detects faces with a SeetaFace model, blurs each one, writes the
/// result as PNG and prints per-stage timing and count diagnostics.
#[derive(Parser)]
#[command(name = "blurface-cli", version)]
struct Cli {
    /// Path to the input image (PNG, JPEG).
    input: PathBuf,

    /// Where to write the blurred PNG.
    #[arg(short, long, default_value = blurface_export::DOWNLOAD_FILENAME)]
    output: PathBuf,

    /// Path to the SeetaFace frontal face model.
    #[arg(long, default_value = "models/seeta_fd_frontal_v1.0.bin")]
    model: PathBuf,

    /// Minimum detection score passed to the detector.
    #[arg(long, default_value_t = PipelineConfig::DEFAULT_MIN_CONFIDENCE)]
    min_confidence: f32,

    /// Smallest blur radius applied to any face, in pixels.
    #[arg(long, default_value_t = PipelineConfig::DEFAULT_MIN_BLUR_RADIUS)]
    min_blur_radius: u32,

    /// The blur radius is the face's shorter side divided by this.
    #[arg(long, default_value_t = PipelineConfig::DEFAULT_BLUR_RADIUS_DIVISOR)]
    blur_radius_divisor: f64,

    /// Blur algorithm.
    #[arg(long, value_enum, default_value_t = Blur::Stack)]
    blur: Blur,

    /// Full pipeline config as a JSON string.
    ///
    /// When provided, all other pipeline parameter flags are ignored.
    /// The JSON must be a valid `PipelineConfig` serialization.
    #[arg(long)]
    config_json: Option<String>,

    /// Also write the unblurred image with every detection box outlined.
    #[arg(long, value_name = "PATH")]
    annotate: Option<PathBuf>,

    /// Output diagnostics as JSON instead of human-readable report.
    #[arg(long)]
    json: bool,
}

/// Blur algorithm selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Blur {
    /// Stack blur (triangular kernel).
    Stack,
    /// Gaussian blur.
    Gaussian,
}

/// Build a [`PipelineConfig`] from CLI arguments.
///
/// If `--config-json` is provided, the JSON is parsed directly and all
/// individual parameter flags are ignored.  Otherwise, a config is
/// assembled from the individual flags.
fn config_from_cli(cli: &Cli) -> Result<PipelineConfig, String> {
    if let Some(ref json) = cli.config_json {
        return serde_json::from_str(json).map_err(|e| format!("Error parsing --config-json: {e}"));
    }

    Ok(PipelineConfig {
        min_confidence: cli.min_confidence,
        min_blur_radius: cli.min_blur_radius,
        blur_radius_divisor: cli.blur_radius_divisor,
        blur: match cli.blur {
            Blur::Stack => BlurKind::Stack,
            Blur::Gaussian => BlurKind::Gaussian,
        },
    })
}

/// Route `log` records to stderr, honouring `RUST_LOG`.
fn init_logging() -> Result<flexi_logger::LoggerHandle, flexi_logger::FlexiLoggerError> {
    flexi_logger::Logger::try_with_env_or_str("info")?
        .log_to_stderr()
        .start()
}

fn run(cli: &Cli) -> Result<(), String> {
    let config = config_from_cli(cli)?;
    config.validate().map_err(|e| e.to_string())?;

    let image_bytes = std::fs::read(&cli.input)
        .map_err(|e| format!("Error reading {}: {e}", cli.input.display()))?;
    log::info!(
        "image: {} ({} bytes)",
        cli.input.display(),
        image_bytes.len()
    );
    log::debug!("config: {config:?}");

    let detector = RustfaceDetector::from_path(&cli.model)
        .map_err(|e| format!("Error loading model {}: {e}", cli.model.display()))?;

    let mut canvas = Canvas::new();
    let (blurred, diagnostics) = blurface_pipeline::diagnostics::process_with_diagnostics(
        &mut canvas,
        &image_bytes,
        &detector,
        &config,
    )
    .map_err(|e| format!("Pipeline error: {e}"))?;

    if cli.json {
        let json = serde_json::to_string_pretty(&diagnostics)
            .map_err(|e| format!("Error serializing diagnostics: {e}"))?;
        println!("{json}");
    } else {
        println!("{}", diagnostics.report());
    }

    let png = blurface_export::canvas_to_png(&canvas).map_err(|e| format!("Export error: {e}"))?;
    std::fs::write(&cli.output, &png)
        .map_err(|e| format!("Error writing {}: {e}", cli.output.display()))?;
    log::info!("wrote {} ({} bytes)", cli.output.display(), png.len());

    if let Some(ref path) = cli.annotate {
        // The canvas is already blurred; outline boxes on a fresh decode.
        let original = blurface_pipeline::decode::decode_rgba(&image_bytes)
            .map_err(|e| format!("Pipeline error: {e}"))?;
        let boxes: Vec<_> = blurred.iter().map(|b| b.detection).collect();
        let annotated = annotate::annotate(&original, &boxes);
        let png = blurface_export::to_png(&annotated).map_err(|e| format!("Export error: {e}"))?;
        std::fs::write(path, &png)
            .map_err(|e| format!("Error writing {}: {e}", path.display()))?;
        log::info!("wrote annotated image to {}", path.display());
    }

    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Keep the handle alive so buffered records are flushed on exit.
    let _logger = match init_logging() {
        Ok(handle) => Some(handle),
        Err(e) => {
            eprintln!("Logger initialization failed: {e}");
            None
        }
    };

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(msg) => {
            eprintln!("{msg}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_pipeline_defaults() {
        let cli = Cli::try_parse_from(["blurface-cli", "photo.jpg"]).unwrap();
        assert_eq!(cli.output, PathBuf::from("blurred-image.png"));
        assert_eq!(
            cli.model,
            PathBuf::from("models/seeta_fd_frontal_v1.0.bin")
        );
        assert!(!cli.json);
        assert!(cli.annotate.is_none());
        assert_eq!(config_from_cli(&cli).unwrap(), PipelineConfig::default());
    }

    #[test]
    fn individual_flags_build_config() {
        let cli = Cli::try_parse_from([
            "blurface-cli",
            "photo.png",
            "-o",
            "out.png",
            "--min-confidence",
            "3.5",
            "--min-blur-radius",
            "9",
            "--blur-radius-divisor",
            "4",
            "--blur",
            "gaussian",
        ])
        .unwrap();
        let config = config_from_cli(&cli).unwrap();
        assert_eq!(cli.output, PathBuf::from("out.png"));
        assert!((config.min_confidence - 3.5).abs() < f32::EPSILON);
        assert_eq!(config.min_blur_radius, 9);
        assert!((config.blur_radius_divisor - 4.0).abs() < f64::EPSILON);
        assert_eq!(config.blur, BlurKind::Gaussian);
    }

    #[test]
    fn config_json_overrides_flags() {
        let cli = Cli::try_parse_from([
            "blurface-cli",
            "photo.png",
            "--min-blur-radius",
            "9",
            "--config-json",
            r#"{"min_blur_radius": 12}"#,
        ])
        .unwrap();
        let config = config_from_cli(&cli).unwrap();
        assert_eq!(config.min_blur_radius, 12);
        assert_eq!(config.blur, BlurKind::Stack);
    }

    #[test]
    fn malformed_config_json_is_reported() {
        let cli = Cli::try_parse_from(["blurface-cli", "photo.png", "--config-json", "{"]).unwrap();
        assert!(
            config_from_cli(&cli)
                .unwrap_err()
                .contains("--config-json")
        );
    }

    #[test]
    fn input_is_required() {
        assert!(Cli::try_parse_from(["blurface-cli"]).is_err());
    }

    #[test]
    fn unknown_blur_is_rejected() {
        assert!(Cli::try_parse_from(["blurface-cli", "a.png", "--blur", "box"]).is_err());
    }

    #[test]
    fn missing_input_file_fails_before_model_load() {
        let cli = Cli::try_parse_from([
            "blurface-cli",
            "/nonexistent/photo.png",
            "--model",
            "/nonexistent/model.bin",
        ])
        .unwrap();
        let err = run(&cli).unwrap_err();
        assert!(err.contains("/nonexistent/photo.png"), "{err}");
    }
}
