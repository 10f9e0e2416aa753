use super::fallback;
use crate::debug::{self, DebugSnapshots};
use crate::types::{BinaryMask, FallbackConfig, ProbabilityMask, ThresholdPolicy};
use image::GrayImage;
use log::{debug, info, warn};
use std::fmt;

/// Where the binary mask handed to the fitter came from
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "json", serde(tag = "kind", rename_all = "snake_case"))]
pub enum MaskSource {
    /// Model probabilities cut at an accepted threshold
    Threshold { threshold: f32 },
    /// Rule-based mask computed from the image
    CvFallback,
}

impl MaskSource {
    pub fn is_fallback(&self) -> bool {
        matches!(self, MaskSource::CvFallback)
    }
}

impl fmt::Display for MaskSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MaskSource::Threshold { threshold } => write!(f, "model threshold {}", threshold),
            MaskSource::CvFallback => write!(f, "cv fallback"),
        }
    }
}

/// One evaluated step of the threshold cascade
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
pub struct ThresholdAttempt {
    pub threshold: f32,
    pub pixels: usize,
    pub accepted: bool,
}

/// Result of binarizing a probability mask
#[derive(Debug, Clone)]
pub struct Binarized {
    pub mask: BinaryMask,
    pub source: MaskSource,
    pub attempts: Vec<ThresholdAttempt>,
}

/// Turns model probabilities into a binary region, relaxing the threshold
/// step by step and falling back to the image itself when nothing clears
/// the pixel floor
#[derive(Debug, Clone, Default)]
pub struct Binarizer {
    policy: ThresholdPolicy,
    fallback: FallbackConfig,
}

impl Binarizer {
    pub fn new(policy: ThresholdPolicy, fallback: FallbackConfig) -> Self {
        Self { policy, fallback }
    }

    pub fn policy(&self) -> &ThresholdPolicy {
        &self.policy
    }

    /// Binarizes `probabilities`, using `image` only if every threshold step fails
    ///
    /// Stops at the first accepted step. The fallback mask may be empty when
    /// the image has no usable structure; the fitter reports that case.
    pub fn binarize(
        &self,
        probabilities: &ProbabilityMask,
        image: &GrayImage,
        snapshots: &DebugSnapshots,
    ) -> Binarized {
        snapshots.save_gray(debug::RAW_PREDICTION, &probabilities.to_image());

        let mut attempts = Vec::with_capacity(self.policy.steps().len());
        for step in self.policy.steps() {
            let mask = probabilities.threshold(step.threshold);
            let pixels = mask.count();
            let accepted = pixels > step.min_pixels;
            debug!(
                "Threshold {} - {} pixels (floor {})",
                step.threshold, pixels, step.min_pixels
            );
            snapshots.save_gray(&debug::threshold_file_name(step.threshold), mask.as_image());
            attempts.push(ThresholdAttempt {
                threshold: step.threshold,
                pixels,
                accepted,
            });

            if accepted {
                info!("Using threshold {}", step.threshold);
                return self.finish(
                    mask,
                    MaskSource::Threshold {
                        threshold: step.threshold,
                    },
                    attempts,
                    snapshots,
                );
            }
        }

        let (min, max, mean) = probabilities.stats();
        warn!(
            "Model response too weak (min {:.3}, max {:.3}, mean {:.3}), using cv fallback mask",
            min, max, mean
        );
        let mask = fallback::generate_mask(
            image,
            probabilities.width(),
            probabilities.height(),
            &self.fallback,
        );
        snapshots.save_gray(debug::CV_GENERATED_MASK, mask.as_image());
        self.finish(mask, MaskSource::CvFallback, attempts, snapshots)
    }

    fn finish(
        &self,
        mask: BinaryMask,
        source: MaskSource,
        attempts: Vec<ThresholdAttempt>,
        snapshots: &DebugSnapshots,
    ) -> Binarized {
        snapshots.save_gray(debug::FINAL_BINARY_MASK, mask.as_image());
        Binarized {
            mask,
            source,
            attempts,
        }
    }
}
