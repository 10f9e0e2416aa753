//! Measurement extraction pipeline
//!
//! Stages, in order:
//! - [`preprocess`]: decoding and model-input preparation
//! - [`binarize`]: probability mask to binary region, with threshold cascade and CV fallback
//! - [`fit`]: largest external contour to ellipse or bounding box
//! - [`convert`]: pixel geometry to millimeter measurements

pub mod binarize;
pub mod contour;
pub mod convert;
pub mod ellipse;
pub mod fallback;
pub mod fit;
pub mod preprocess;

pub use binarize::{Binarized, Binarizer, MaskSource, ThresholdAttempt};
pub use contour::{external_contours, select_largest, Contour};
pub use convert::{Measurement, UnitConverter};
pub use ellipse::fit_ellipse;
pub use fit::fit_shape;
pub use preprocess::{decode_grayscale, open_grayscale, ModelInput};
