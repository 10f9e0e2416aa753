//! Segmentation model collaborator
//!
//! The pipeline never looks inside the model: it hands over a
//! [`ModelInput`] and receives a 128x128 probability grid.

use crate::error::{FetalscanError, Result};
use crate::processing::{preprocess, ModelInput};
use crate::types::{ProbabilityMask, MASK_SIZE};
use std::path::Path;

/// Image tensor in, probability grid out
///
/// Implementations must be safe to call from several requests at once.
pub trait SegmentationModel: Send + Sync {
    fn predict(&self, input: &ModelInput) -> Result<ProbabilityMask>;
}

impl<F> SegmentationModel for F
where
    F: Fn(&ModelInput) -> Result<ProbabilityMask> + Send + Sync,
{
    fn predict(&self, input: &ModelInput) -> Result<ProbabilityMask> {
        self(input)
    }
}

/// Model that always answers with the same grid, e.g. an exported prediction
#[derive(Debug, Clone, PartialEq)]
pub struct PrecomputedMask {
    mask: ProbabilityMask,
}

impl PrecomputedMask {
    pub fn new(mask: ProbabilityMask) -> Self {
        Self { mask }
    }

    /// Loads a grayscale image as probabilities (`value / 255`), resized to the working grid
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let image = preprocess::open_grayscale(path)?;
        let resized = preprocess::resize_to_grid(&image);
        Ok(Self::new(ProbabilityMask::from_image(&resized)))
    }

    pub fn mask(&self) -> &ProbabilityMask {
        &self.mask
    }
}

impl SegmentationModel for PrecomputedMask {
    fn predict(&self, _input: &ModelInput) -> Result<ProbabilityMask> {
        Ok(self.mask.clone())
    }
}

/// Model with no response at all; every request goes through the CV fallback
#[derive(Debug, Clone, Copy, Default)]
pub struct NullModel;

impl SegmentationModel for NullModel {
    fn predict(&self, input: &ModelInput) -> Result<ProbabilityMask> {
        Ok(ProbabilityMask::zeros(input.size(), input.size()))
    }
}

/// Checks that a model answered on the working grid
pub(crate) fn validate_output(mask: &ProbabilityMask) -> Result<()> {
    if (mask.width(), mask.height()) != (MASK_SIZE, MASK_SIZE) {
        return Err(FetalscanError::Model(format!(
            "expected a {}x{} probability grid, got {}x{}",
            MASK_SIZE,
            MASK_SIZE,
            mask.width(),
            mask.height()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};
    use tempfile::TempDir;

    fn input() -> ModelInput {
        ModelInput::from_image(&GrayImage::from_pixel(64, 64, Luma([100])))
    }

    #[test]
    fn test_closure_is_a_model() {
        let model = |input: &ModelInput| -> Result<ProbabilityMask> {
            Ok(ProbabilityMask::from_fn(input.size(), input.size(), |_, _| 0.7))
        };
        let mask = model.predict(&input()).unwrap();
        assert_eq!(mask.get(5, 5), 0.7);
    }

    #[test]
    fn test_null_model_is_all_zero() {
        let mask = NullModel.predict(&input()).unwrap();
        assert_eq!((mask.width(), mask.height()), (MASK_SIZE, MASK_SIZE));
        assert_eq!(mask.threshold(0.0).count(), 0);
    }

    #[test]
    fn test_precomputed_mask_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("mask.png");
        GrayImage::from_fn(256, 256, |x, _| Luma([if x < 128 { 255 } else { 0 }]))
            .save(&path)
            .unwrap();

        let model = PrecomputedMask::open(&path).unwrap();
        let mask = model.predict(&input()).unwrap();
        assert_eq!((mask.width(), mask.height()), (MASK_SIZE, MASK_SIZE));
        assert!(mask.get(10, 10) > 0.99);
        assert!(mask.get(120, 10) < 0.01);
    }

    #[test]
    fn test_output_validation() {
        assert!(validate_output(&ProbabilityMask::zeros(MASK_SIZE, MASK_SIZE)).is_ok());
        let err = validate_output(&ProbabilityMask::zeros(64, 64)).unwrap_err();
        assert!(matches!(err, FetalscanError::Model(_)));
    }
}
