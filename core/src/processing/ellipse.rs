//! Direct least-squares ellipse fitting
//!
//! Numerically stable variant of the Fitzgibbon direct fit (Halir and
//! Flusser, 1998). The scatter matrix is split into quadratic and linear
//! blocks, the linear part is eliminated, and the remaining 3x3 generalized
//! eigenproblem is solved under the ellipse constraint `4ac - b^2 > 0`.

use crate::types::Ellipse;
use nalgebra::{Matrix3, Vector3};

/// Minimum number of points that determine a conic
pub const MIN_ELLIPSE_POINTS: usize = 5;

/// Fits an ellipse to `(x, y)` points
///
/// Returns `None` when fewer than five points are given or when the points
/// admit no real ellipse (collinear, hyperbolic or numerically degenerate).
pub fn fit_ellipse(points: &[(f64, f64)]) -> Option<Ellipse> {
    if points.len() < MIN_ELLIPSE_POINTS {
        return None;
    }

    // Center and scale to keep the scatter matrix well conditioned
    let n = points.len() as f64;
    let mx = points.iter().map(|p| p.0).sum::<f64>() / n;
    let my = points.iter().map(|p| p.1).sum::<f64>() / n;
    let spread = (points
        .iter()
        .map(|p| (p.0 - mx).powi(2) + (p.1 - my).powi(2))
        .sum::<f64>()
        / n)
        .sqrt();
    if !spread.is_finite() || spread < 1e-9 {
        return None;
    }

    let mut s1 = Matrix3::<f64>::zeros();
    let mut s2 = Matrix3::<f64>::zeros();
    let mut s3 = Matrix3::<f64>::zeros();
    for &(px, py) in points {
        let x = (px - mx) / spread;
        let y = (py - my) / spread;
        let quad = Vector3::new(x * x, x * y, y * y);
        let lin = Vector3::new(x, y, 1.0);
        s1 += quad * quad.transpose();
        s2 += quad * lin.transpose();
        s3 += lin * lin.transpose();
    }

    // Collinear points make the linear block singular
    if s3.determinant().abs() < 1e-10 * n.powi(3) {
        return None;
    }
    let s3_inv = s3.try_inverse()?;
    let t = -(s3_inv * s2.transpose());
    let m = s1 + s2 * t;

    // Premultiply by the inverse of the constraint matrix [[0,0,2],[0,-1,0],[2,0,0]]
    let reduced = Matrix3::new(
        m[(2, 0)] / 2.0,
        m[(2, 1)] / 2.0,
        m[(2, 2)] / 2.0,
        -m[(1, 0)],
        -m[(1, 1)],
        -m[(1, 2)],
        m[(0, 0)] / 2.0,
        m[(0, 1)] / 2.0,
        m[(0, 2)] / 2.0,
    );

    let quadratic = ellipse_eigenvector(&reduced)?;
    let linear = t * quadratic;

    let conic = [
        quadratic[0],
        quadratic[1],
        quadratic[2],
        linear[0],
        linear[1],
        linear[2],
    ];
    let normalized = conic_to_ellipse(conic)?;

    Some(Ellipse {
        center: (
            normalized.center.0 * spread + mx,
            normalized.center.1 * spread + my,
        ),
        major_axis: normalized.major_axis * spread,
        minor_axis: normalized.minor_axis * spread,
        angle: normalized.angle,
    })
}

// Eigenvector of a real eigenvalue that satisfies the ellipse constraint
fn ellipse_eigenvector(reduced: &Matrix3<f64>) -> Option<Vector3<f64>> {
    let mut best: Option<(f64, Vector3<f64>)> = None;

    for lambda in reduced.complex_eigenvalues().iter() {
        if lambda.im.abs() > 1e-9 * (1.0 + lambda.re.abs()) {
            continue;
        }
        let shifted = reduced - Matrix3::identity() * lambda.re;
        let Some(v) = null_vector(&shifted) else {
            continue;
        };
        let constraint = 4.0 * v[0] * v[2] - v[1] * v[1];
        if constraint > 0.0 && best.as_ref().map_or(true, |(c, _)| constraint > *c) {
            best = Some((constraint, v));
        }
    }

    best.map(|(_, v)| v)
}

// Null vector of a rank-2 matrix: the best-conditioned cross product of two rows, unit length
fn null_vector(m: &Matrix3<f64>) -> Option<Vector3<f64>> {
    let rows: [Vector3<f64>; 3] = [
        m.row(0).transpose(),
        m.row(1).transpose(),
        m.row(2).transpose(),
    ];
    let candidate = [
        rows[0].cross(&rows[1]),
        rows[0].cross(&rows[2]),
        rows[1].cross(&rows[2]),
    ]
    .into_iter()
    .max_by(|a, b| a.norm().total_cmp(&b.norm()))?;

    let norm = candidate.norm();
    if !norm.is_finite() || norm < 1e-12 {
        return None;
    }
    Some(candidate / norm)
}

/// Converts conic coefficients `A x^2 + B xy + C y^2 + D x + E y + F = 0`
/// into center, full axis lengths and major-axis angle
fn conic_to_ellipse(conic: [f64; 6]) -> Option<Ellipse> {
    let sign = if conic[0] < 0.0 { -1.0 } else { 1.0 };
    let [a, b, c, d, e, f] = conic.map(|v| v * sign);

    let den = b * b - 4.0 * a * c;
    if den >= 0.0 {
        return None;
    }

    let x0 = (2.0 * c * d - b * e) / den;
    let y0 = (2.0 * a * e - b * d) / den;

    let num = 2.0 * (a * e * e + c * d * d - b * d * e + den * f);
    if num <= 0.0 {
        return None;
    }

    let root = ((a - c).powi(2) + b * b).sqrt();
    let semi_major = (num * (a + c + root)).sqrt() / -den;
    let semi_minor = (num * (a + c - root)).sqrt() / -den;

    let mut angle = (0.5 * f64::atan2(-b, c - a)).to_degrees().rem_euclid(180.0);
    if angle >= 180.0 {
        angle = 0.0;
    }

    let ellipse = Ellipse {
        center: (x0, y0),
        major_axis: 2.0 * semi_major,
        minor_axis: 2.0 * semi_minor,
        angle,
    };

    let finite = [
        ellipse.center.0,
        ellipse.center.1,
        ellipse.major_axis,
        ellipse.minor_axis,
    ]
    .iter()
    .all(|v| v.is_finite());
    (finite && ellipse.minor_axis > 0.0).then_some(ellipse)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn sample(ellipse: &Ellipse, n: usize) -> Vec<(f64, f64)> {
        (0..n)
            .map(|i| ellipse.point_at(2.0 * PI * i as f64 / n as f64))
            .collect()
    }

    fn angle_diff(a: f64, b: f64) -> f64 {
        let d = (a - b).rem_euclid(180.0);
        d.min(180.0 - d)
    }

    #[test]
    fn test_recovers_exact_rotated_ellipse() {
        let truth = Ellipse {
            center: (64.0, 50.0),
            major_axis: 60.0,
            minor_axis: 36.0,
            angle: 30.0,
        };
        let fit = fit_ellipse(&sample(&truth, 40)).unwrap();

        assert!((fit.center.0 - 64.0).abs() < 1e-6);
        assert!((fit.center.1 - 50.0).abs() < 1e-6);
        assert!((fit.major_axis - 60.0).abs() < 1e-6);
        assert!((fit.minor_axis - 36.0).abs() < 1e-6);
        assert!(angle_diff(fit.angle, 30.0) < 1e-6);
    }

    #[test]
    fn test_vertical_major_axis() {
        let truth = Ellipse {
            center: (20.0, 30.0),
            major_axis: 24.0,
            minor_axis: 10.0,
            angle: 90.0,
        };
        let fit = fit_ellipse(&sample(&truth, 24)).unwrap();
        assert!(angle_diff(fit.angle, 90.0) < 1e-6);
        assert!(fit.major_axis >= fit.minor_axis);
        assert!((0.0..180.0).contains(&fit.angle));
    }

    #[test]
    fn test_circle_gives_equal_axes() {
        let truth = Ellipse {
            center: (0.0, 0.0),
            major_axis: 20.0,
            minor_axis: 20.0,
            angle: 0.0,
        };
        let fit = fit_ellipse(&sample(&truth, 16)).unwrap();
        assert!((fit.major_axis - 20.0).abs() < 1e-6);
        assert!((fit.minor_axis - 20.0).abs() < 1e-6);
    }

    #[test]
    fn test_too_few_points() {
        let pts = [(0.0, 0.0), (1.0, 0.0), (0.0, 1.0), (1.0, 1.0)];
        assert!(fit_ellipse(&pts).is_none());
    }

    #[test]
    fn test_collinear_points_are_degenerate() {
        let pts: Vec<(f64, f64)> = (0..10).map(|i| (i as f64, 2.0 * i as f64)).collect();
        assert!(fit_ellipse(&pts).is_none());
    }

    #[test]
    fn test_coincident_points_are_degenerate() {
        let pts = vec![(5.0, 5.0); 8];
        assert!(fit_ellipse(&pts).is_none());
    }
}
