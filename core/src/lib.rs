pub mod annotate;
pub mod api;
pub mod cli;
pub mod debug;
pub mod error;
pub mod model;
pub mod processing;
pub mod reference;
pub mod types;

pub use api::{Assessment, FetalBiometryAnalyzer};
pub use cli::report::TextReport;
pub use error::{FetalscanError, Result};
pub use model::{NullModel, PrecomputedMask, SegmentationModel};
pub use processing::{MaskSource, Measurement, ModelInput};
pub use reference::{BrainSummary, Evaluation, ReferenceData, ReferenceEvaluator, Verdict};
pub use types::*;
