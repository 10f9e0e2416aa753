use crate::types::{BoundingBox, Ellipse, GeometricFit};
use image::{GrayImage, Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_rect_mut, draw_line_segment_mut};
use imageproc::rect::Rect;
use std::f64::consts::PI;

/// Outline color of the fitted shape
pub const OUTLINE: Rgb<u8> = Rgb([0, 255, 0]);

const ELLIPSE_SEGMENTS: usize = 90;

/// Draws the fitted shape over an RGB copy of `image`
///
/// `image` must be on the same grid the fit was computed on.
pub fn annotate(image: &GrayImage, fit: &GeometricFit) -> RgbImage {
    let mut canvas = RgbImage::from_fn(image.width(), image.height(), |x, y| {
        let v = image.get_pixel(x, y).0[0];
        Rgb([v, v, v])
    });
    match fit {
        GeometricFit::Ellipse(ellipse) => draw_ellipse(&mut canvas, ellipse),
        GeometricFit::BoundingBox(bbox) => draw_box(&mut canvas, bbox),
    }
    canvas
}

fn draw_ellipse(canvas: &mut RgbImage, ellipse: &Ellipse) {
    let points: Vec<(f32, f32)> = (0..=ELLIPSE_SEGMENTS)
        .map(|i| {
            let (x, y) = ellipse.point_at(2.0 * PI * i as f64 / ELLIPSE_SEGMENTS as f64);
            (x as f32, y as f32)
        })
        .collect();
    for pair in points.windows(2) {
        draw_line_segment_mut(canvas, pair[0], pair[1], OUTLINE);
    }
}

fn draw_box(canvas: &mut RgbImage, bbox: &BoundingBox) {
    if bbox.width == 0 || bbox.height == 0 {
        return;
    }
    let rect = Rect::at(bbox.x, bbox.y).of_size(bbox.width, bbox.height);
    draw_hollow_rect_mut(canvas, rect, OUTLINE);
}
