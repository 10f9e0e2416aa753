use crate::types::{BinaryMask, BoundingBox, FOREGROUND};
use image::Luma;
use imageproc::contours::{find_contours, BorderType};
use imageproc::drawing::{draw_line_segment_mut, draw_polygon_mut};
use imageproc::point::Point;
use std::cmp::Ordering;

/// Closed outer boundary of one connected region
///
/// Points are pixel coordinates in tracing order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contour {
    points: Vec<Point<i32>>,
}

impl Contour {
    pub fn new(points: Vec<Point<i32>>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[Point<i32>] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Points as floating-point `(x, y)` pairs
    pub fn to_f64(&self) -> Vec<(f64, f64)> {
        self.points
            .iter()
            .map(|p| (p.x as f64, p.y as f64))
            .collect()
    }

    /// Enclosed polygon area (shoelace formula)
    ///
    /// Degenerate contours (single pixel, one-pixel-wide lines) have area 0.
    pub fn area(&self) -> f64 {
        let n = self.points.len();
        if n < 3 {
            return 0.0;
        }
        let twice: i64 = (0..n)
            .map(|i| {
                let a = self.points[i];
                let b = self.points[(i + 1) % n];
                a.x as i64 * b.y as i64 - b.x as i64 * a.y as i64
            })
            .sum();
        (twice as f64 / 2.0).abs()
    }

    /// Axis-aligned bounding box with inclusive pixel extent
    pub fn bounding_box(&self) -> BoundingBox {
        let (mut min_x, mut min_y) = (i32::MAX, i32::MAX);
        let (mut max_x, mut max_y) = (i32::MIN, i32::MIN);
        for p in &self.points {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        if self.points.is_empty() {
            return BoundingBox {
                x: 0,
                y: 0,
                width: 0,
                height: 0,
            };
        }
        BoundingBox {
            x: min_x,
            y: min_y,
            width: (max_x - min_x + 1) as u32,
            height: (max_y - min_y + 1) as u32,
        }
    }

    /// Sets every pixel on or inside the contour
    pub fn fill_into(&self, mask: &mut BinaryMask) {
        let mut points = self.points.clone();
        points.dedup();
        if points.len() > 1 && points.first() == points.last() {
            points.pop();
        }

        let foreground = Luma([FOREGROUND]);
        match points.as_slice() {
            [] => {}
            [p] => mask.set(p.x as i64, p.y as i64),
            [a, b] => draw_line_segment_mut(
                mask.as_image_mut(),
                (a.x as f32, a.y as f32),
                (b.x as f32, b.y as f32),
                foreground,
            ),
            _ => draw_polygon_mut(mask.as_image_mut(), &points, foreground),
        }
    }
}

/// Drops the interior points of straight horizontal, vertical and diagonal runs
///
/// Only the end points of each run remain, so an axis-aligned rectangle keeps
/// its four corners. Area, bounding box and fill are unchanged.
pub fn compress_runs(points: &[Point<i32>]) -> Vec<Point<i32>> {
    let mut points = points.to_vec();
    points.dedup();
    if points.len() > 1 && points.first() == points.last() {
        points.pop();
    }
    let n = points.len();
    if n < 3 {
        return points;
    }

    let step = |a: Point<i32>, b: Point<i32>| ((b.x - a.x).signum(), (b.y - a.y).signum());
    (0..n)
        .filter(|&i| {
            let prev = points[(i + n - 1) % n];
            let next = points[(i + 1) % n];
            step(prev, points[i]) != step(points[i], next)
        })
        .map(|i| points[i])
        .collect()
}

/// Outer boundaries of all top-level regions in the mask; holes are ignored
///
/// Straight runs are compressed to their end points (see [`compress_runs`]).
pub fn external_contours(mask: &BinaryMask) -> Vec<Contour> {
    find_contours::<i32>(mask.as_image())
        .into_iter()
        .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
        .map(|c| Contour::new(compress_runs(&c.points)))
        .collect()
}

/// Orders contours largest first
///
/// Equal areas fall back to the bounding-box origin, top row then left column.
pub fn by_size_descending(a: &Contour, b: &Contour) -> Ordering {
    b.area().total_cmp(&a.area()).then_with(|| {
        let (ba, bb) = (a.bounding_box(), b.bounding_box());
        (ba.y, ba.x).cmp(&(bb.y, bb.x))
    })
}

/// Contour with the largest enclosed area
pub fn select_largest(contours: &[Contour]) -> Option<&Contour> {
    contours.iter().min_by(|a, b| by_size_descending(a, b))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect_mask(size: u32, rects: &[(i64, i64, i64, i64)]) -> BinaryMask {
        let mut mask = BinaryMask::new(size, size);
        for &(x0, y0, w, h) in rects {
            for y in y0..y0 + h {
                for x in x0..x0 + w {
                    mask.set(x, y);
                }
            }
        }
        mask
    }

    #[test]
    fn test_empty_mask_has_no_contours() {
        assert!(external_contours(&BinaryMask::new(16, 16)).is_empty());
    }

    #[test]
    fn test_holes_are_ignored() {
        // Square frame: outer boundary plus one hole boundary
        let mask = rect_mask(
            32,
            &[(4, 4, 20, 6), (4, 18, 20, 6), (4, 10, 6, 8), (18, 10, 6, 8)],
        );
        let contours = external_contours(&mask);
        assert_eq!(contours.len(), 1);
        assert_eq!(contours[0].bounding_box().width, 20);
    }

    #[test]
    fn test_area_and_bounding_box_of_rectangle() {
        let mask = rect_mask(32, &[(3, 5, 10, 4)]);
        let contours = external_contours(&mask);
        assert_eq!(contours.len(), 1);

        let contour = &contours[0];
        // Polygon through pixel centers spans (w - 1) x (h - 1)
        assert_eq!(contour.area(), 27.0);
        assert_eq!(
            contour.bounding_box(),
            BoundingBox {
                x: 3,
                y: 5,
                width: 10,
                height: 4
            }
        );
    }

    #[test]
    fn test_rectangle_keeps_only_corners() {
        let mask = rect_mask(64, &[(30, 40, 40, 20)]);
        let contours = external_contours(&mask);
        let mut corners: Vec<(i32, i32)> = contours[0].points().iter().map(|p| (p.x, p.y)).collect();
        corners.sort();
        assert_eq!(corners, vec![(30, 40), (30, 59), (69, 40), (69, 59)]);
    }

    #[test]
    fn test_compress_runs_keeps_turns() {
        let path: Vec<Point<i32>> = [(0, 0), (1, 0), (2, 0), (3, 1), (4, 2), (4, 3), (3, 3), (2, 3), (1, 2), (0, 1), (0, 0)]
            .iter()
            .map(|&(x, y)| Point::new(x, y))
            .collect();
        let compressed = compress_runs(&path);
        let expected: Vec<Point<i32>> = [(0, 0), (2, 0), (4, 2), (4, 3), (2, 3), (0, 1)]
            .iter()
            .map(|&(x, y)| Point::new(x, y))
            .collect();
        assert_eq!(compressed, expected);
    }

    #[test]
    fn test_single_pixel_region() {
        let mask = rect_mask(8, &[(2, 2, 1, 1)]);
        let contours = external_contours(&mask);
        assert_eq!(contours.len(), 1);
        assert_eq!(contours[0].area(), 0.0);
        assert_eq!(contours[0].bounding_box().width, 1);
    }

    #[test]
    fn test_largest_wins() {
        let mask = rect_mask(64, &[(2, 2, 5, 5), (20, 20, 15, 12), (40, 2, 8, 8)]);
        let contours = external_contours(&mask);
        assert_eq!(contours.len(), 3);
        let largest = select_largest(&contours).unwrap();
        assert_eq!(largest.bounding_box().x, 20);
    }

    #[test]
    fn test_equal_area_tie_breaks_on_origin() {
        let mask = rect_mask(64, &[(40, 30, 6, 6), (10, 30, 6, 6), (30, 5, 6, 6)]);
        let contours = external_contours(&mask);
        let largest = select_largest(&contours).unwrap().bounding_box();
        assert_eq!((largest.x, largest.y), (30, 5));

        let same_row = rect_mask(64, &[(40, 30, 6, 6), (10, 30, 6, 6)]);
        let contours = external_contours(&same_row);
        let largest = select_largest(&contours).unwrap().bounding_box();
        assert_eq!((largest.x, largest.y), (10, 30));
    }

    #[test]
    fn test_fill_restores_solid_region() {
        let mut ring = BinaryMask::new(40, 40);
        for y in 0..40i64 {
            for x in 0..40i64 {
                let d2 = (x - 20).pow(2) + (y - 20).pow(2);
                if (100..=144).contains(&d2) {
                    ring.set(x, y);
                }
            }
        }
        let contours = external_contours(&ring);
        let outer = select_largest(&contours).unwrap();

        let mut filled = BinaryMask::new(40, 40);
        outer.fill_into(&mut filled);
        assert!(filled.contains(20, 20));
        assert!(filled.contains(8, 20));
        assert!(!filled.contains(2, 2));
        assert!(filled.count() > ring.count());
    }

    #[test]
    fn test_fill_matches_solid_rectangle() {
        let mask = rect_mask(32, &[(3, 5, 10, 4)]);
        let contours = external_contours(&mask);
        let mut filled = BinaryMask::new(32, 32);
        contours[0].fill_into(&mut filled);
        assert_eq!(filled, mask);
    }

    #[test]
    fn test_fill_of_thin_line_covers_the_segment() {
        let mask = rect_mask(32, &[(4, 9, 12, 1)]);
        let contours = external_contours(&mask);
        assert_eq!(contours[0].len(), 2);

        let mut filled = BinaryMask::new(32, 32);
        contours[0].fill_into(&mut filled);
        assert_eq!(filled, mask);
    }
}
