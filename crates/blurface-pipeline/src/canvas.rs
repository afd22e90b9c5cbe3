//! The drawable surface the pipeline blurs into.

use crate::blur::BlurEffect;
use crate::types::{Dimensions, Region, RgbaImage};

/// An owned RGBA pixel buffer.
///
/// Starts empty (0×0). [`draw`](Self::draw) resizes it to an image and
/// copies the image in at the origin; blur effects then mutate it in
/// place, and export reads it back.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Canvas {
    pixels: RgbaImage,
}

impl Canvas {
    /// Create an empty canvas.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a canvas holding a copy of `image`.
    #[must_use]
    pub fn from_image(image: RgbaImage) -> Self {
        Self { pixels: image }
    }

    /// Resize the canvas to `image` and draw it at (0, 0).
    ///
    /// Prior contents are discarded.
    pub fn draw(&mut self, image: &RgbaImage) {
        self.pixels.clone_from(image);
    }

    /// Canvas size in pixels.
    #[must_use]
    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.pixels.width(), self.pixels.height())
    }

    /// Returns `true` if nothing has been drawn yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pixels.width() == 0 || self.pixels.height() == 0
    }

    /// Apply `effect` to `region` with the given `radius`.
    pub fn blur<E: BlurEffect + ?Sized>(&mut self, effect: &E, region: Region, radius: u32) {
        effect.blur_region(&mut self.pixels, region, radius);
    }

    /// The current pixels.
    #[must_use]
    pub const fn image(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Consume the canvas and return its pixels.
    #[must_use]
    pub fn into_image(self) -> RgbaImage {
        self.pixels
    }
}
