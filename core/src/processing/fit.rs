use super::contour::{external_contours, select_largest};
use super::ellipse::{fit_ellipse, MIN_ELLIPSE_POINTS};
use crate::error::{FetalscanError, Result};
use crate::types::{BinaryMask, FitShape, GeometricFit, Target};
use log::debug;

/// Fits the target's shape to the largest external region of `mask`
///
/// The ellipse passes through boundary pixel centers, so a filled disc of
/// radius `r` measures about one pixel short of `2r`.
///
/// # Errors
///
/// - `NoRegionDetected` if the mask has no region at all
/// - `InsufficientContourPoints` if an ellipse target's compressed contour has
///   fewer than 5 points (an axis-aligned rectangle has 4)
/// - `DegenerateFit` if those points admit no real ellipse
pub fn fit_shape(mask: &BinaryMask, target: Target) -> Result<GeometricFit> {
    let contours = external_contours(mask);
    debug!("Found {} contours in {} mask", contours.len(), target);

    let largest = select_largest(&contours).ok_or(FetalscanError::NoRegionDetected(target))?;
    debug!(
        "Largest contour has {} points and area {}",
        largest.len(),
        largest.area()
    );

    match target.fit_shape() {
        FitShape::Ellipse => {
            if largest.len() < MIN_ELLIPSE_POINTS {
                return Err(FetalscanError::InsufficientContourPoints {
                    target,
                    points: largest.len(),
                });
            }
            fit_ellipse(&largest.to_f64())
                .map(GeometricFit::Ellipse)
                .ok_or(FetalscanError::DegenerateFit(target))
        }
        FitShape::BoundingBox => Ok(GeometricFit::BoundingBox(largest.bounding_box())),
    }
}
