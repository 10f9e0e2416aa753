use crate::annotate;
use crate::debug::{self, DebugSnapshots};
use crate::error::Result;
use crate::model::{self, SegmentationModel};
use crate::processing::preprocess::{self, ensure_not_empty};
use crate::processing::{fit_shape, Binarizer, MaskSource, Measurement, ModelInput, UnitConverter};
use crate::reference::{ReferenceData, ReferenceEvaluator, Verdict};
use crate::types::{
    AnalyzerConfig, GeometricFit, GestationalAge, MeasurementKind, ProbabilityMask, Target,
};
use image::{GrayImage, RgbImage};
use log::info;

/// Fetal biometry pipeline
///
/// Runs one request end to end: age check, model input, segmentation,
/// binarization, shape fit, unit conversion and reference evaluation.
/// All methods take `&self`, so one analyzer can serve concurrent requests.
///
/// # Example
///
/// ```
/// use fetalscan_core::{
///     FetalBiometryAnalyzer, GestationalAge, PrecomputedMask, ProbabilityMask, Target,
///     MASK_SIZE,
/// };
/// use image::{GrayImage, Luma};
///
/// // Model output: a disc of diameter 100 px on the 128 px grid
/// let mask = ProbabilityMask::from_fn(MASK_SIZE, MASK_SIZE, |x, y| {
///     let (dx, dy) = (x as f32 - 64.0, y as f32 - 64.0);
///     if dx * dx + dy * dy <= 50.0 * 50.0 { 0.9 } else { 0.0 }
/// });
/// let analyzer = FetalBiometryAnalyzer::with_defaults(PrecomputedMask::new(mask));
///
/// let image = GrayImage::from_pixel(256, 256, Luma([90]));
/// let assessment = analyzer
///     .analyze(&image, GestationalAge::new(22), Target::Cerebellum)
///     .unwrap();
///
/// // TCD = about 100 px x 0.3 mm/px
/// let tcd = assessment.verdicts[0].measurement_mm;
/// assert!((tcd - 30.0).abs() < 1.5);
/// assert_eq!(assessment.summary, "TCD abnormal");
/// ```
pub struct FetalBiometryAnalyzer<M> {
    model: M,
    evaluator: ReferenceEvaluator,
    binarizer: Binarizer,
    converter: UnitConverter,
    config: AnalyzerConfig,
}

impl<M: SegmentationModel> FetalBiometryAnalyzer<M> {
    pub fn new(model: M, reference: ReferenceData, config: AnalyzerConfig) -> Self {
        Self {
            model,
            evaluator: ReferenceEvaluator::new(reference),
            binarizer: Binarizer::new(config.threshold_policy.clone(), config.fallback.clone()),
            converter: UnitConverter::new(config.pixel_spacing),
            config,
        }
    }

    /// Analyzer with the standard reference table and default configuration
    pub fn with_defaults(model: M) -> Self {
        Self::new(model, ReferenceData::default(), AnalyzerConfig::default())
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    pub fn reference(&self) -> &ReferenceData {
        self.evaluator.reference()
    }

    /// Measures `target` on `image` and evaluates it at `age`
    ///
    /// # Errors
    ///
    /// - `OutOfRangeGestationalAge` before any image work if the age is rejected
    /// - `InvalidImage` for an empty image
    /// - `Model` if the model fails or answers on the wrong grid
    /// - `NoRegionDetected`, `InsufficientContourPoints`, `DegenerateFit` from the fitter
    pub fn analyze(
        &self,
        image: &GrayImage,
        age: GestationalAge,
        target: Target,
    ) -> Result<Assessment> {
        self.evaluator.check_age(target, age)?;
        ensure_not_empty(image)?;

        let input = ModelInput::from_image(image);
        let probabilities = self.model.predict(&input)?;
        model::validate_output(&probabilities)?;

        self.run(&input, &probabilities, age, target)
    }

    /// Same as [`analyze`](Self::analyze), with the model output supplied by the caller
    pub fn analyze_mask(
        &self,
        image: &GrayImage,
        probabilities: &ProbabilityMask,
        age: GestationalAge,
        target: Target,
    ) -> Result<Assessment> {
        self.evaluator.check_age(target, age)?;
        ensure_not_empty(image)?;
        model::validate_output(probabilities)?;

        let input = ModelInput::from_image(image);
        self.run(&input, probabilities, age, target)
    }

    fn run(
        &self,
        input: &ModelInput,
        probabilities: &ProbabilityMask,
        age: GestationalAge,
        target: Target,
    ) -> Result<Assessment> {
        let snapshots = DebugSnapshots::for_base(self.config.debug_dir.as_deref());

        let binarized = self
            .binarizer
            .binarize(probabilities, input.working_image(), &snapshots);
        let fit = fit_shape(&binarized.mask, target)?;
        let measurements = self.converter.convert(target, &fit)?;
        for m in &measurements {
            info!("Calculated {}", m);
        }

        if snapshots.is_enabled() {
            snapshots.save_rgb(
                debug::ANNOTATED,
                &annotate::annotate(input.working_image(), &fit),
            );
        }

        let evaluation = self.evaluator.evaluate(target, &measurements, age)?;

        Ok(Assessment {
            target,
            gestational_age: age,
            verdicts: evaluation.verdicts,
            summary: evaluation.summary,
            fit,
            mask_source: binarized.source,
            mask_pixels: binarized.mask.count(),
        })
    }
}

/// Outcome of one analysis request
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct Assessment {
    /// Anatomical target that was measured
    pub target: Target,

    /// Gestational age the measurements were evaluated at
    pub gestational_age: GestationalAge,

    /// One verdict per measurement, in report order
    pub verdicts: Vec<Verdict>,

    /// One-line summary across all verdicts
    pub summary: String,

    /// Shape fitted on the 128x128 working grid
    pub fit: GeometricFit,

    /// Origin of the binary mask
    pub mask_source: MaskSource,

    /// Set pixels in the binary mask
    pub mask_pixels: usize,
}

impl Assessment {
    /// Whether every measurement is normal
    pub fn is_normal(&self) -> bool {
        self.verdicts.iter().all(Verdict::is_normal)
    }

    /// Verdict of one measurement kind
    pub fn verdict(&self, kind: MeasurementKind) -> Option<&Verdict> {
        self.verdicts.iter().find(|v| v.kind == kind)
    }

    /// Calibrated measurements, in report order
    pub fn measurements(&self) -> Vec<Measurement> {
        self.verdicts
            .iter()
            .map(|v| Measurement {
                kind: v.kind,
                value_mm: v.measurement_mm,
            })
            .collect()
    }

    /// Draws the fitted shape over `image` resized to the working grid
    pub fn annotate(&self, image: &GrayImage) -> RgbImage {
        let working = preprocess::resize_to_grid(image);
        annotate::annotate(&working, &self.fit)
    }
}
