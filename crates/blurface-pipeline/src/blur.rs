//! Region blur effects.
//!
//! This module defines the [`BlurEffect`] trait for blurring a
//! rectangular region of an RGBA image in place, and the [`BlurKind`]
//! enum for selecting which implementation to use at runtime.
//!
//! Both implementations blur the R, G and B channels only and leave
//! alpha untouched. Pixels outside the region are never read or written:
//! at the region's borders the edge pixels are replicated, so a face at
//! the edge of the frame is not smeared with its surroundings.

use image::RgbImage;
use serde::{Deserialize, Serialize};

use crate::types::{PipelineConfig, Region, RgbaImage};

/// Selects which blur algorithm to apply to each face region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BlurKind {
    /// Stack blur: a triangular kernel of weights `r + 1 - |i|`, applied
    /// horizontally then vertically. Cheap, and close to Gaussian.
    #[default]
    Stack,
    /// Gaussian blur via [`imageproc::filter::gaussian_blur_f32`], with
    /// `sigma = radius / sqrt(6)` so its variance matches the stack kernel.
    Gaussian,
}

/// Trait for region blur strategies.
pub trait BlurEffect {
    /// Blur `region` of `image` in place with the given `radius`.
    ///
    /// A zero radius or an empty region is a no-op. Radii above
    /// [`PipelineConfig::MAX_BLUR_RADIUS`] are clamped to it. `region`
    /// must lie inside `image`; regions produced by
    /// [`clamp_to_surface`](crate::region::clamp_to_surface) always do.
    fn blur_region(&self, image: &mut RgbaImage, region: Region, radius: u32);
}

impl BlurEffect for BlurKind {
    fn blur_region(&self, image: &mut RgbaImage, region: Region, radius: u32) {
        if radius == 0 || region.is_empty() {
            return;
        }
        debug_assert!(
            region.x + region.width <= image.width() && region.y + region.height <= image.height(),
            "region {region:?} exceeds image {}x{}",
            image.width(),
            image.height(),
        );
        let radius = radius.min(PipelineConfig::MAX_BLUR_RADIUS);
        match *self {
            Self::Stack => stack_blur_region(image, region, radius),
            Self::Gaussian => gaussian_blur_region(image, region, radius),
        }
    }
}

/// Stack blur over the RGB channels of `region`.
///
/// Each pass slides a triangular window across one line. Moving the
/// centre one pixel to the right removes one unit of weight from every
/// pixel in the left half (`sum_out`) and adds one to every pixel in the
/// right half (`sum_in`), so each output costs O(1) regardless of radius.
fn stack_blur_region(image: &mut RgbaImage, region: Region, radius: u32) {
    let Region {
        x: x0,
        y: y0,
        width,
        height,
    } = region;

    let mut line = Vec::with_capacity(width.max(height) as usize);

    for y in y0..y0 + height {
        line.clear();
        line.extend((x0..x0 + width).map(|x| rgb(image, x, y)));
        blur_line(&mut line, radius);
        for (x, px) in (x0..).zip(&line) {
            set_rgb(image, x, y, *px);
        }
    }

    for x in x0..x0 + width {
        line.clear();
        line.extend((y0..y0 + height).map(|y| rgb(image, x, y)));
        blur_line(&mut line, radius);
        for (y, px) in (y0..).zip(&line) {
            set_rgb(image, x, y, *px);
        }
    }
}

fn rgb(image: &RgbaImage, x: u32, y: u32) -> [u64; 3] {
    let p = image.get_pixel(x, y).0;
    [u64::from(p[0]), u64::from(p[1]), u64::from(p[2])]
}

#[allow(clippy::cast_possible_truncation)]
fn set_rgb(image: &mut RgbaImage, x: u32, y: u32, px: [u64; 3]) {
    let p = image.get_pixel_mut(x, y);
    // Weighted means of u8 samples always fit in u8.
    p.0[0] = px[0] as u8;
    p.0[1] = px[1] as u8;
    p.0[2] = px[2] as u8;
}

/// Blur one line of RGB samples in place with a triangular kernel.
///
/// Samples beyond either end of the line repeat the end sample.
fn blur_line(line: &mut [[u64; 3]], radius: u32) {
    let n = line.len();
    if n < 2 {
        return;
    }
    let side = u64::from(radius) + 1;
    let Some(divisor) = side.checked_mul(side) else {
        log::warn!("blur radius {radius} overflows the kernel weight; line left as is");
        return;
    };
    let r = radius as usize;
    let src: Vec<[u64; 3]> = line.to_vec();
    let at = |i: isize| -> [u64; 3] {
        #[allow(clippy::cast_sign_loss)]
        let idx = i.clamp(0, n as isize - 1) as usize;
        src[idx]
    };

    let mut sum = [0u64; 3];
    let mut sum_in = [0u64; 3];
    let mut sum_out = [0u64; 3];

    // Initial window centred on sample 0.
    let ri = r as isize;
    for i in -ri..=ri {
        let p = at(i);
        let weight = (ri + 1 - i.abs()) as u64;
        for c in 0..3 {
            sum[c] += p[c] * weight;
            if i <= 0 {
                sum_out[c] += p[c];
            } else {
                sum_in[c] += p[c];
            }
        }
    }

    for (x, out) in line.iter_mut().enumerate() {
        for c in 0..3 {
            out[c] = sum[c] / divisor;
        }

        // Advance the window centre from x to x + 1.
        let xi = x as isize;
        let entering = at(xi + ri + 1);
        let leaving = at(xi - ri);
        let next = at(xi + 1);
        for c in 0..3 {
            sum_in[c] += entering[c];
            sum[c] = sum[c] - sum_out[c] + sum_in[c];
            sum_out[c] = sum_out[c] - leaving[c] + next[c];
            sum_in[c] -= next[c];
        }
    }
}

/// Gaussian blur over the RGB channels of `region`.
///
/// The region is copied out as an `RgbImage`, blurred in one call, and
/// its colour written back over the original alpha. `imageproc` clamps
/// reads at the image border, which here is the region border.
#[allow(clippy::cast_precision_loss)]
fn gaussian_blur_region(image: &mut RgbaImage, region: Region, radius: u32) {
    let sigma = radius as f32 / 6.0_f32.sqrt();
    let Region {
        x: x0,
        y: y0,
        width: w,
        height: h,
    } = region;

    let cropped = RgbImage::from_fn(w, h, |x, y| {
        let [r, g, b, _] = image.get_pixel(x0 + x, y0 + y).0;
        image::Rgb([r, g, b])
    });
    let blurred = imageproc::filter::gaussian_blur_f32(&cropped, sigma);

    for (x, y, px) in blurred.enumerate_pixels() {
        let p = image.get_pixel_mut(x0 + x, y0 + y);
        p.0[..3].copy_from_slice(&px.0);
    }
}
