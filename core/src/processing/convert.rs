use crate::error::{FetalscanError, Result};
use crate::types::{GeometricFit, MeasurementKind, PixelSpacing, Target};
use std::f64::consts::PI;
use std::fmt;

/// Physical quantity in millimeters
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
pub struct Measurement {
    pub kind: MeasurementKind,
    pub value_mm: f64,
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {:.2} mm", self.kind, self.value_mm)
    }
}

/// Converts fitted geometry to calibrated measurements
///
/// - BPD = minor axis x spacing
/// - HC = pi x (major + minor) / 2 x spacing
/// - TCD = major axis x spacing
/// - LVW = bounding-box width x spacing
///
/// Values are passed through unchecked; the reference evaluator decides what is normal.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct UnitConverter {
    spacing: PixelSpacing,
}

impl UnitConverter {
    pub fn new(spacing: PixelSpacing) -> Self {
        Self { spacing }
    }

    pub fn spacing(&self) -> PixelSpacing {
        self.spacing
    }

    /// One measurement of `kind`, or `None` if the fit has the wrong shape
    pub fn measure(&self, kind: MeasurementKind, fit: &GeometricFit) -> Option<f64> {
        let pixels = match (kind, fit) {
            (MeasurementKind::Bpd, GeometricFit::Ellipse(e)) => e.minor_axis,
            (MeasurementKind::Hc, GeometricFit::Ellipse(e)) => {
                PI * (e.major_axis + e.minor_axis) / 2.0
            }
            (MeasurementKind::Tcd, GeometricFit::Ellipse(e)) => e.major_axis,
            (MeasurementKind::Lvw, GeometricFit::BoundingBox(b)) => b.width as f64,
            _ => return None,
        };
        Some(self.spacing.to_mm(pixels))
    }

    /// All measurements of `target`, in report order
    ///
    /// # Errors
    ///
    /// Returns `InvalidValue` if `fit` is not the shape the target measures
    pub fn convert(&self, target: Target, fit: &GeometricFit) -> Result<Vec<Measurement>> {
        target
            .measurements()
            .iter()
            .map(|&kind| {
                self.measure(kind, fit)
                    .map(|value_mm| Measurement { kind, value_mm })
                    .ok_or_else(|| {
                        FetalscanError::InvalidValue(format!(
                            "{} cannot be measured from {}",
                            kind, fit
                        ))
                    })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BoundingBox, Ellipse};

    fn ellipse(major: f64, minor: f64) -> GeometricFit {
        GeometricFit::Ellipse(Ellipse {
            center: (64.0, 64.0),
            major_axis: major,
            minor_axis: minor,
            angle: 0.0,
        })
    }

    #[test]
    fn test_brain_measurements() {
        let converter = UnitConverter::new(PixelSpacing::new(0.3).unwrap());
        let m = converter.convert(Target::Brain, &ellipse(200.0, 160.0)).unwrap();

        assert_eq!(m.len(), 2);
        assert_eq!(m[0].kind, MeasurementKind::Bpd);
        assert!((m[0].value_mm - 48.0).abs() < 1e-9);
        assert_eq!(m[1].kind, MeasurementKind::Hc);
        assert!((m[1].value_mm - PI * 180.0 * 0.3).abs() < 1e-9);
    }

    #[test]
    fn test_circle_gives_diameter_and_circumference() {
        let r = 25.0;
        let converter = UnitConverter::new(PixelSpacing::new(1.0).unwrap());
        let m = converter
            .convert(Target::Brain, &ellipse(2.0 * r, 2.0 * r))
            .unwrap();
        assert!((m[0].value_mm - 2.0 * r).abs() < 1e-9);
        assert!((m[1].value_mm - 2.0 * PI * r).abs() < 1e-9);
    }

    #[test]
    fn test_tcd_uses_major_axis() {
        let converter = UnitConverter::default();
        let m = converter
            .convert(Target::Cerebellum, &ellipse(70.0, 40.0))
            .unwrap();
        assert_eq!(m.len(), 1);
        assert!((m[0].value_mm - 21.0).abs() < 1e-9);
    }

    #[test]
    fn test_lvw_uses_box_width() {
        let fit = GeometricFit::BoundingBox(BoundingBox {
            x: 10,
            y: 10,
            width: 30,
            height: 12,
        });
        let m = UnitConverter::default().convert(Target::Ventricle, &fit).unwrap();
        assert!((m[0].value_mm - 9.0).abs() < 1e-9);
    }

    #[test]
    fn test_shape_mismatch_is_rejected() {
        let fit = GeometricFit::BoundingBox(BoundingBox {
            x: 0,
            y: 0,
            width: 3,
            height: 3,
        });
        assert!(UnitConverter::default().convert(Target::Brain, &fit).is_err());
        assert!(UnitConverter::default()
            .measure(MeasurementKind::Lvw, &ellipse(10.0, 5.0))
            .is_none());
    }
}
