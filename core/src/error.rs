use crate::types::Target;
use thiserror::Error;

/// Result type for fetalscan operations
pub type Result<T> = std::result::Result<T, FetalscanError>;

/// Error types for fetalscan operations
///
/// Every failure is terminal for the request that produced it. Each variant
/// carries its own diagnostic string; [`FetalscanError::user_message`] gives the
/// shorter caller-facing sentence.
#[derive(Error, Debug)]
pub enum FetalscanError {
    /// Image could not be decoded, is empty, or a probability grid is malformed
    #[error("Invalid image: {0}")]
    InvalidImage(String),

    /// No external contour survived binarization (including the CV fallback)
    #[error("No {0} region detected in the binary mask")]
    NoRegionDetected(Target),

    /// Largest contour is too small for a least-squares ellipse fit
    #[error("Largest {target} contour has {points} points, at least 5 are required for ellipse fitting")]
    InsufficientContourPoints { target: Target, points: usize },

    /// Contour points admit no real ellipse (collinear or otherwise degenerate)
    #[error("Could not fit an ellipse to the largest {0} contour")]
    DegenerateFit(Target),

    /// Gestational age rejected by the target's age policy
    #[error("Gestational age {weeks} weeks is outside the {min}-{max} week reference range for {target}")]
    OutOfRangeGestationalAge {
        target: Target,
        weeks: u32,
        min: u32,
        max: u32,
    },

    /// Unparsable or inconsistent configuration / argument value
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    /// Failure reported by the injected segmentation model
    #[error("Model error: {0}")]
    Model(String),

    /// I/O error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl FetalscanError {
    /// Short message suitable for showing to the requester
    ///
    /// Region and fit failures use target-specific wording.
    pub fn user_message(&self) -> String {
        match self {
            FetalscanError::InvalidImage(_) => "Invalid image".to_string(),
            FetalscanError::NoRegionDetected(target)
            | FetalscanError::InsufficientContourPoints { target, .. }
            | FetalscanError::DegenerateFit(target) => target.failure_message().to_string(),
            FetalscanError::OutOfRangeGestationalAge { min, max, .. } => {
                format!("Gestational age must be between {}-{} weeks", min, max)
            }
            FetalscanError::InvalidValue(msg) => msg.clone(),
            FetalscanError::Model(_) => "Could not analyze image".to_string(),
            FetalscanError::IoError(_) => "Could not read input".to_string(),
        }
    }

    /// Whether the failure was caused by the request itself rather than by the analysis
    ///
    /// Input errors correspond to a 400-class response; everything else is 500-class.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            FetalscanError::InvalidImage(_)
                | FetalscanError::OutOfRangeGestationalAge { .. }
                | FetalscanError::InvalidValue(_)
        )
    }
}

// Helper conversions
impl From<String> for FetalscanError {
    fn from(s: String) -> Self {
        FetalscanError::InvalidValue(s)
    }
}

impl From<&str> for FetalscanError {
    fn from(s: &str) -> Self {
        FetalscanError::InvalidValue(s.to_string())
    }
}

impl From<image::ImageError> for FetalscanError {
    fn from(e: image::ImageError) -> Self {
        match e {
            image::ImageError::IoError(io) => FetalscanError::IoError(io),
            other => FetalscanError::InvalidImage(format!("{}", other)),
        }
    }
}
