//! Detection box overlay for tuning the detector.
//!
//! Strokes every detection box onto a copy of the *unblurred* image so
//! it is easy to see what the detector found, including boxes that fell
//! outside the canvas.

use blurface_pipeline::{DetectionBox, RgbaImage};
use image::Rgba;
use tiny_skia::{LineJoin, Paint, PathBuilder, Pixmap, Rect, Stroke, Transform};

/// Stroke colour for detection boxes.
const BOX_COLOR: [u8; 3] = [255, 40, 40];

/// Stroke width for an image of the given size: thin on small images,
/// still visible on large ones.
#[allow(clippy::cast_precision_loss)]
fn stroke_width(width: u32, height: u32) -> f32 {
    (width.min(height) as f32 / 200.0).max(2.0)
}

/// Render the outlines of `boxes` as anti-aliased strokes on a
/// transparent background.
#[allow(clippy::cast_possible_truncation)]
fn render_boxes(boxes: &[DetectionBox], width: u32, height: u32) -> RgbaImage {
    let blank = || RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 0]));

    let mut pb = PathBuilder::new();
    for b in boxes {
        if let Some(rect) =
            Rect::from_xywh(b.x as f32, b.y as f32, b.width as f32, b.height as f32)
        {
            pb.push_rect(rect);
        }
    }
    let Some(path) = pb.finish() else {
        return blank();
    };

    let stroke = Stroke {
        width: stroke_width(width, height),
        line_join: LineJoin::Miter,
        ..Stroke::default()
    };

    let mut paint = Paint::default();
    paint.set_color_rgba8(BOX_COLOR[0], BOX_COLOR[1], BOX_COLOR[2], 255);
    paint.anti_alias = true;

    let Some(mut pixmap) = Pixmap::new(width, height) else {
        return blank();
    };
    pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);

    // Pixmap data is premultiplied; RgbaImage is straight alpha.
    let pixmap_data = pixmap.data();
    let mut img = RgbaImage::new(width, height);
    for (i, pixel) in img.pixels_mut().enumerate() {
        let off = i * 4;
        let a = pixmap_data[off + 3];
        if a == 0 {
            *pixel = Rgba([0, 0, 0, 0]);
        } else {
            let r = u16::from(pixmap_data[off]) * 255 / u16::from(a);
            let g = u16::from(pixmap_data[off + 1]) * 255 / u16::from(a);
            let b = u16::from(pixmap_data[off + 2]) * 255 / u16::from(a);
            *pixel = Rgba([r as u8, g as u8, b as u8, a]);
        }
    }
    img
}

/// Return a copy of `image` with every box in `boxes` outlined.
pub fn annotate(image: &RgbaImage, boxes: &[DetectionBox]) -> RgbaImage {
    let (width, height) = image.dimensions();
    let overlay = render_boxes(boxes, width, height);
    let mut out = image.clone();
    image::imageops::overlay(&mut out, &overlay, 0, 0);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gray(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_pixel(width, height, Rgba([128, 128, 128, 255]))
    }

    #[test]
    fn no_boxes_leaves_image_unchanged() {
        let img = gray(40, 30);
        assert_eq!(annotate(&img, &[]), img);
    }

    #[test]
    fn box_outline_is_drawn_but_interior_is_not() {
        let img = gray(100, 100);
        let boxes = [DetectionBox::new(20.0, 20.0, 50.0, 50.0, 3.0)];
        let out = annotate(&img, &boxes);

        // On the top edge.
        let edge = out.get_pixel(45, 20);
        assert!(edge[0] > 200 && edge[1] < 100, "edge pixel {edge:?}");
        // Centre of the box and far outside it.
        assert_eq!(out.get_pixel(45, 45), img.get_pixel(45, 45));
        assert_eq!(out.get_pixel(95, 95), img.get_pixel(95, 95));
    }

    #[test]
    fn degenerate_boxes_are_ignored() {
        let img = gray(20, 20);
        let boxes = [DetectionBox::new(5.0, 5.0, 0.0, 0.0, 1.0)];
        assert_eq!(annotate(&img, &boxes), img);
    }

    #[test]
    fn stroke_width_has_a_floor() {
        assert!((stroke_width(100, 100) - 2.0).abs() < f32::EPSILON);
        assert!((stroke_width(2000, 1000) - 5.0).abs() < f32::EPSILON);
    }
}
