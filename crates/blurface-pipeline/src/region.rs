//! Detection-box clamping and blur-radius derivation.
//!
//! A detector reports fractional boxes that may start left of or above
//! the image and may run past its right or bottom edge. Before a box can
//! be blurred it is snapped outward to whole pixels and clipped to the
//! canvas:
//!
//! ```text
//! x      = max(0, floor(box.x))
//! y      = max(0, floor(box.y))
//! width  = min(canvas.width  - x, ceil(box.width))
//! height = min(canvas.height - y, ceil(box.height))
//! ```
//!
//! The blur radius then scales with the face size:
//!
//! ```text
//! radius = min(MAX_BLUR_RADIUS, max(min_blur_radius, round(min(width, height) / divisor)))
//! ```

use crate::types::{DetectionBox, Dimensions, PipelineConfig, Region};

/// Convert a non-negative float to `u32`, saturating at the `u32` range.
///
/// `NaN` maps to zero.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn saturating_u32(value: f64) -> u32 {
    if value.is_nan() {
        return 0;
    }
    value.clamp(0.0, f64::from(u32::MAX)) as u32
}

/// Clamp a detection box to the canvas.
///
/// The returned region always satisfies
/// `x + width <= dims.width` and `y + height <= dims.height`. A box that
/// starts at or beyond the right or bottom edge yields an empty region
/// anchored at that edge; so does a box with a non-positive width or
/// height.
///
/// Note that a box starting left of the canvas keeps its full (ceiled)
/// width: only the origin is moved to zero, so the region may extend
/// further right than the original box did.
#[must_use]
pub fn clamp_to_surface(bbox: &DetectionBox, dims: Dimensions) -> Region {
    let x = saturating_u32(bbox.x.floor()).min(dims.width);
    let y = saturating_u32(bbox.y.floor()).min(dims.height);
    let width = (dims.width - x).min(saturating_u32(bbox.width.ceil()));
    let height = (dims.height - y).min(saturating_u32(bbox.height.ceil()));
    Region::new(x, y, width, height)
}

/// Blur radius for a clamped region.
///
/// One `blur_radius_divisor`-th of the region's shorter side, rounded to
/// the nearest pixel (halves round up), never less than
/// `min_blur_radius` and never more than
/// [`PipelineConfig::MAX_BLUR_RADIUS`].
#[must_use]
pub fn blur_radius(region: Region, config: &PipelineConfig) -> u32 {
    let scaled = f64::from(region.min_side()) / config.blur_radius_divisor;
    saturating_u32(scaled.round())
        .max(config.min_blur_radius)
        .min(PipelineConfig::MAX_BLUR_RADIUS)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CANVAS: Dimensions = Dimensions::new(800, 600);

    fn bbox(x: f64, y: f64, width: f64, height: f64) -> DetectionBox {
        DetectionBox::new(x, y, width, height, 0.9)
    }

    #[test]
    fn box_inside_canvas_is_unchanged() {
        let region = clamp_to_surface(&bbox(100.0, 100.0, 50.0, 50.0), CANVAS);
        assert_eq!(region, Region::new(100, 100, 50, 50));
        assert_eq!(blur_radius(region, &PipelineConfig::default()), 8);
    }

    #[test]
    fn fractional_box_snaps_outward() {
        let region = clamp_to_surface(&bbox(10.7, 20.2, 30.1, 40.9), CANVAS);
        assert_eq!(region, Region::new(10, 20, 31, 41));
    }

    #[test]
    fn box_past_right_edge_is_trimmed() {
        let region = clamp_to_surface(&bbox(780.0, 100.0, 50.0, 50.0), CANVAS);
        assert_eq!(region, Region::new(780, 100, 20, 50));
        assert_eq!(blur_radius(region, &PipelineConfig::default()), 5);
    }

    #[test]
    fn box_past_bottom_edge_is_trimmed() {
        let region = clamp_to_surface(&bbox(10.0, 590.0, 40.0, 40.0), CANVAS);
        assert_eq!(region, Region::new(10, 590, 40, 10));
    }

    #[test]
    fn negative_origin_moves_to_zero() {
        let region = clamp_to_surface(&bbox(-12.5, -3.0, 40.0, 30.0), CANVAS);
        assert_eq!(region, Region::new(0, 0, 40, 30));
    }

    #[test]
    fn box_outside_canvas_is_empty() {
        let region = clamp_to_surface(&bbox(900.0, 700.0, 50.0, 50.0), CANVAS);
        assert!(region.is_empty());
        assert_eq!(region.x, 800);
        assert_eq!(region.y, 600);
    }

    #[test]
    fn degenerate_box_is_empty() {
        assert!(clamp_to_surface(&bbox(10.0, 10.0, 0.0, 20.0), CANVAS).is_empty());
        assert!(clamp_to_surface(&bbox(10.0, 10.0, 20.0, -5.0), CANVAS).is_empty());
        assert!(clamp_to_surface(&bbox(f64::NAN, 10.0, f64::NAN, 20.0), CANVAS).is_empty());
    }

    #[test]
    fn clamped_region_always_fits() {
        let boxes = [
            bbox(-100.0, -100.0, 2000.0, 2000.0),
            bbox(799.9, 599.9, 1.0, 1.0),
            bbox(0.0, 0.0, 800.0, 600.0),
            bbox(400.5, 300.5, f64::INFINITY, f64::INFINITY),
            bbox(f64::NEG_INFINITY, 5.0, 10.0, 10.0),
        ];
        for b in &boxes {
            let r = clamp_to_surface(b, CANVAS);
            assert!(r.x + r.width <= CANVAS.width, "{b:?} -> {r:?}");
            assert!(r.y + r.height <= CANVAS.height, "{b:?} -> {r:?}");
        }
    }

    #[test]
    fn radius_never_below_minimum() {
        let config = PipelineConfig::default();
        for side in 0..40 {
            let radius = blur_radius(Region::new(0, 0, side, side), &config);
            assert!(radius >= 5, "side {side} gave radius {radius}");
        }
    }

    #[test]
    fn radius_grows_with_shorter_side() {
        let config = PipelineConfig::default();
        let mut previous = 0;
        for side in (30..600).step_by(30) {
            let radius = blur_radius(Region::new(0, 0, side, side * 2), &config);
            assert!(radius >= previous, "radius shrank at side {side}");
            previous = radius;
        }
        assert_eq!(blur_radius(Region::new(0, 0, 600, 900), &config), 100);
    }

    #[test]
    fn radius_rounds_halves_up() {
        // 45 / 6 = 7.5
        let config = PipelineConfig::default();
        assert_eq!(blur_radius(Region::new(0, 0, 45, 100), &config), 8);
    }

    #[test]
    fn radius_respects_custom_config() {
        let config = PipelineConfig {
            min_blur_radius: 1,
            blur_radius_divisor: 2.0,
            ..PipelineConfig::default()
        };
        assert_eq!(blur_radius(Region::new(0, 0, 10, 20), &config), 5);
        assert_eq!(blur_radius(Region::new(0, 0, 0, 20), &config), 1);
    }

    #[test]
    fn radius_is_capped() {
        let config = PipelineConfig {
            blur_radius_divisor: 1e-9,
            ..PipelineConfig::default()
        };
        assert!(config.validate().is_ok());
        assert_eq!(
            blur_radius(Region::new(0, 0, 10, 10), &config),
            PipelineConfig::MAX_BLUR_RADIUS
        );

        let config = PipelineConfig {
            min_blur_radius: PipelineConfig::MAX_BLUR_RADIUS,
            ..PipelineConfig::default()
        };
        assert_eq!(
            blur_radius(Region::new(0, 0, 1, 1), &config),
            PipelineConfig::MAX_BLUR_RADIUS
        );
    }
}
