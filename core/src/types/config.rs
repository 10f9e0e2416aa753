use super::{AgePolicy, PixelSpacing, Target};
use std::path::PathBuf;

/// One step of the mask binarization cascade
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
pub struct ThresholdStep {
    /// Pixels with probability strictly above this value are set
    pub threshold: f32,

    /// The step is accepted only if strictly more pixels than this are set
    pub min_pixels: usize,
}

impl ThresholdStep {
    pub const fn new(threshold: f32, min_pixels: usize) -> Self {
        Self {
            threshold,
            min_pixels,
        }
    }
}

/// Ordered threshold cascade, evaluated first to last, stopping at the first accepted step
///
/// # Example
///
/// ```
/// use fetalscan_core::ThresholdPolicy;
///
/// let policy = ThresholdPolicy::default();
/// let thresholds: Vec<f32> = policy.steps().iter().map(|s| s.threshold).collect();
/// assert_eq!(thresholds, vec![0.5, 0.25, 0.1, 0.05]);
/// assert!(policy.steps().iter().all(|s| s.min_pixels == 200));
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
pub struct ThresholdPolicy {
    steps: Vec<ThresholdStep>,
}

impl ThresholdPolicy {
    /// Builds a policy from explicit steps
    ///
    /// # Errors
    ///
    /// Returns an error if `steps` is empty or a threshold is outside `[0, 1)`
    pub fn new(steps: Vec<ThresholdStep>) -> Result<Self, String> {
        if steps.is_empty() {
            return Err("Threshold policy needs at least one step".to_string());
        }
        if let Some(step) = steps.iter().find(|s| !(0.0..1.0).contains(&s.threshold)) {
            return Err(format!(
                "Threshold {} is outside [0, 1)",
                step.threshold
            ));
        }
        Ok(Self { steps })
    }

    pub fn steps(&self) -> &[ThresholdStep] {
        &self.steps
    }
}

impl Default for ThresholdPolicy {
    fn default() -> Self {
        Self {
            steps: vec![
                ThresholdStep::new(0.5, 200),
                ThresholdStep::new(0.25, 200),
                ThresholdStep::new(0.1, 200),
                ThresholdStep::new(0.05, 200),
            ],
        }
    }
}

/// Constants of the rule-based mask generator used when the model response is too weak
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
pub struct FallbackConfig {
    /// CLAHE clip limit, relative to a uniform histogram
    pub clahe_clip_limit: f32,

    /// CLAHE tiles per side
    pub clahe_grid: u32,

    /// Odd kernel size of the pre-threshold Gaussian blur
    pub blur_kernel: u32,

    /// Odd block size of the Gaussian-weighted adaptive threshold
    pub adaptive_block: u32,

    /// Constant subtracted from the local mean
    pub adaptive_c: i32,

    /// Canny hysteresis thresholds
    pub canny_low: f32,
    pub canny_high: f32,

    /// Radius of the morphology structuring element
    pub morph_radius: u8,

    /// Largest contours considered for filling
    pub max_regions: usize,

    /// Minimum area for every region after the largest one
    pub min_secondary_area: f64,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            clahe_clip_limit: 2.0,
            clahe_grid: 8,
            blur_kernel: 5,
            adaptive_block: 21,
            adaptive_c: 5,
            canny_low: 30.0,
            canny_high: 150.0,
            morph_radius: 2,
            max_regions: 3,
            min_secondary_area: 100.0,
        }
    }
}

/// Age policy for each target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
pub struct AgePolicies {
    pub brain: AgePolicy,
    pub cerebellum: AgePolicy,
    pub ventricle: AgePolicy,
}

impl AgePolicies {
    pub fn policy_for(&self, target: Target) -> AgePolicy {
        match target {
            Target::Brain => self.brain,
            Target::Cerebellum => self.cerebellum,
            Target::Ventricle => self.ventricle,
        }
    }
}

impl Default for AgePolicies {
    fn default() -> Self {
        Self {
            brain: AgePolicy::Reject,
            cerebellum: AgePolicy::RuleOfThumb,
            ventricle: AgePolicy::Clamp,
        }
    }
}

/// Tolerances used by the reference evaluator
///
/// # Example
///
/// ```
/// use fetalscan_core::EvaluationConfig;
///
/// let config = EvaluationConfig::default().with_tcd_tolerance_mm(3.0);
/// assert_eq!(config.tcd_tolerance_mm, 3.0);
/// assert_eq!(config.brain_tolerance_ratio, 0.10);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "json", serde(default))]
pub struct EvaluationConfig {
    /// Relative half-width of the BPD/HC normal band
    pub brain_tolerance_ratio: f64,

    /// Allowed absolute TCD deviation from the expected value, inclusive
    pub tcd_tolerance_mm: f64,

    /// LVW at or above this value is moderate to severe ventriculomegaly
    pub lvw_severe_mm: f64,

    /// Out-of-range age handling per target
    pub age_policies: AgePolicies,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            brain_tolerance_ratio: 0.10,
            tcd_tolerance_mm: 2.0,
            lvw_severe_mm: 12.0,
            age_policies: AgePolicies::default(),
        }
    }
}

impl EvaluationConfig {
    /// Builder: Set the BPD/HC relative tolerance
    pub fn with_brain_tolerance_ratio(mut self, ratio: f64) -> Self {
        self.brain_tolerance_ratio = ratio;
        self
    }

    /// Builder: Set the TCD absolute tolerance
    pub fn with_tcd_tolerance_mm(mut self, mm: f64) -> Self {
        self.tcd_tolerance_mm = mm;
        self
    }

    /// Builder: Set the moderate-to-severe LVW threshold
    pub fn with_lvw_severe_mm(mut self, mm: f64) -> Self {
        self.lvw_severe_mm = mm;
        self
    }

    /// Builder: Set the age policy of one target
    pub fn with_age_policy(mut self, target: Target, policy: AgePolicy) -> Self {
        match target {
            Target::Brain => self.age_policies.brain = policy,
            Target::Cerebellum => self.age_policies.cerebellum = policy,
            Target::Ventricle => self.age_policies.ventricle = policy,
        }
        self
    }

    /// Checks that all tolerances are usable
    pub fn validate(&self) -> Result<(), String> {
        let ratio = self.brain_tolerance_ratio;
        if !(ratio.is_finite() && (0.0..1.0).contains(&ratio)) {
            return Err(format!(
                "Brain tolerance ratio must be in [0, 1), got {}",
                self.brain_tolerance_ratio
            ));
        }
        if !(self.tcd_tolerance_mm.is_finite() && self.tcd_tolerance_mm >= 0.0) {
            return Err(format!(
                "TCD tolerance must be non-negative, got {}",
                self.tcd_tolerance_mm
            ));
        }
        if !(self.lvw_severe_mm.is_finite() && self.lvw_severe_mm > 0.0) {
            return Err(format!(
                "LVW severe threshold must be positive, got {}",
                self.lvw_severe_mm
            ));
        }
        Ok(())
    }
}

/// Configuration of the measurement pipeline
///
/// # Example
///
/// ```
/// use fetalscan_core::{AnalyzerConfig, PixelSpacing};
///
/// let config = AnalyzerConfig::default()
///     .with_pixel_spacing(PixelSpacing::new(0.25).unwrap())
///     .with_debug_dir("/tmp/fetalscan");
///
/// assert_eq!(config.pixel_spacing.mm(), 0.25);
/// assert!(config.debug_dir.is_some());
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
pub struct AnalyzerConfig {
    /// Calibration of the working grid
    pub pixel_spacing: PixelSpacing,

    /// Threshold cascade applied to the model output
    pub threshold_policy: ThresholdPolicy,

    /// Constants of the rule-based fallback mask
    pub fallback: FallbackConfig,

    /// Base directory for per-request diagnostic snapshots; disabled when `None`
    pub debug_dir: Option<PathBuf>,
}

impl AnalyzerConfig {
    /// Builder: Set pixel spacing
    pub fn with_pixel_spacing(mut self, spacing: PixelSpacing) -> Self {
        self.pixel_spacing = spacing;
        self
    }

    /// Builder: Set threshold cascade
    pub fn with_threshold_policy(mut self, policy: ThresholdPolicy) -> Self {
        self.threshold_policy = policy;
        self
    }

    /// Builder: Set fallback constants
    pub fn with_fallback(mut self, fallback: FallbackConfig) -> Self {
        self.fallback = fallback;
        self
    }

    /// Builder: Enable diagnostic snapshots under `dir`
    pub fn with_debug_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.debug_dir = Some(dir.into());
        self
    }
}
