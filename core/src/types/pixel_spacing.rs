use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

/// Default calibration of the 128x128 working grid, in mm per pixel
pub const DEFAULT_PIXEL_SPACING_MM: f64 = 0.3;

/// Pixel spacing in millimeters per pixel
///
/// Isotropic calibration constant that converts distances measured on the
/// working grid into physical lengths.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
pub struct PixelSpacing(f64);

impl PixelSpacing {
    /// Creates a new PixelSpacing
    ///
    /// # Errors
    ///
    /// Returns an error if `mm_per_pixel` is not a finite positive number
    pub fn new(mm_per_pixel: f64) -> Result<Self, String> {
        if mm_per_pixel.is_finite() && mm_per_pixel > 0.0 {
            Ok(Self(mm_per_pixel))
        } else {
            Err(format!(
                "Pixel spacing must be a positive number of mm, got {}",
                mm_per_pixel
            ))
        }
    }

    /// Millimeters per pixel
    pub fn mm(&self) -> f64 {
        self.0
    }

    /// Converts a length in pixels to millimeters
    pub fn to_mm(&self, pixels: f64) -> f64 {
        pixels * self.0
    }

    /// Parses pixel spacing from string
    ///
    /// Accepts formats like:
    /// - "0.3"
    /// - "0.3mm"
    /// - "0.3 mm/px"
    /// - Exponential notation: "3e-1"
    ///
    /// # Errors
    ///
    /// Returns an error if no number can be parsed or the value is not positive
    pub fn parse(s: &str) -> Result<Self, String> {
        static REGEX: OnceLock<Regex> = OnceLock::new();
        let re = REGEX.get_or_init(|| {
            Regex::new(r"^\s*([-+]?\d*\.?\d+(?:[eE][-+]?\d+)?)\s*(?:mm)?\s*(?:/\s*px)?\s*$")
                .expect("Failed to compile regex")
        });

        let value = re
            .captures(s)
            .and_then(|caps| caps.get(1))
            .ok_or_else(|| format!("Failed to parse pixel spacing from '{}'", s))?;

        let mm: f64 = value
            .as_str()
            .parse()
            .map_err(|e| format!("Failed to parse pixel spacing value: {}", e))?;

        Self::new(mm)
    }
}

impl Default for PixelSpacing {
    fn default() -> Self {
        Self(DEFAULT_PIXEL_SPACING_MM)
    }
}

impl fmt::Display for PixelSpacing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} mm/px", self.0)
    }
}
