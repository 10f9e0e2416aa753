//! Core type definitions for fetal biometry
//!
//! This module provides the fundamental types used throughout the fetalscan library:
//! - [`Target`]: Anatomical target of a request (brain, cerebellum, ventricle)
//! - [`MeasurementKind`]: Physical quantity derived from a target (BPD, HC, TCD, LVW)
//! - [`ProbabilityMask`] / [`BinaryMask`]: Model output and its binarized region
//! - [`GeometricFit`]: Ellipse or bounding box fitted to the dominant contour
//! - [`PixelSpacing`] / [`GestationalAge`]: Calibration and clinical context of a request
//! - [`AnalyzerConfig`] / [`EvaluationConfig`]: Pipeline and evaluator configuration

mod config;
mod enums;
mod geometry;
mod gestational_age;
mod mask;
mod pixel_spacing;

pub use config::{
    AgePolicies, AnalyzerConfig, EvaluationConfig, FallbackConfig, ThresholdPolicy, ThresholdStep,
};
pub use enums::{
    AgePolicy, Deviation, FitShape, MeasurementKind, Severity, Status, Target,
};
pub use geometry::{BoundingBox, Ellipse, GeometricFit};
pub use gestational_age::GestationalAge;
pub use mask::{BinaryMask, ProbabilityMask, BACKGROUND, FOREGROUND, MASK_SIZE};
pub use pixel_spacing::{PixelSpacing, DEFAULT_PIXEL_SPACING_MM};
