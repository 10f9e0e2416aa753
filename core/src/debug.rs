//! Per-request diagnostic snapshots
//!
//! Every request writes into its own freshly created `request-XXXXXX`
//! directory, so concurrent requests never touch the same paths. Snapshot
//! failures are logged and otherwise ignored.

use image::{GrayImage, RgbImage};
use log::{debug, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// Raw model output rendered as grayscale
pub const RAW_PREDICTION: &str = "raw_prediction.png";
/// Mask produced by the rule-based fallback
pub const CV_GENERATED_MASK: &str = "cv_generated_mask.png";
/// Mask handed to the contour fitter
pub const FINAL_BINARY_MASK: &str = "final_binary_mask.png";
/// Working image with the fitted shape drawn on it
pub const ANNOTATED: &str = "annotated.png";

/// File name of one threshold attempt, e.g. `threshold_0.25.png`
pub fn threshold_file_name(threshold: f32) -> String {
    format!("threshold_{}.png", threshold)
}

/// Sink for diagnostic images of a single request
#[derive(Debug, Clone, Default)]
pub struct DebugSnapshots {
    dir: Option<PathBuf>,
}

impl DebugSnapshots {
    /// Snapshots that are never written
    pub fn disabled() -> Self {
        Self { dir: None }
    }

    /// Creates a unique request directory under `base`
    ///
    /// Falls back to [`DebugSnapshots::disabled`] if the directory cannot be created.
    pub fn create(base: &Path) -> Self {
        let created = fs::create_dir_all(base).and_then(|_| {
            tempfile::Builder::new()
                .prefix("request-")
                .tempdir_in(base)
        });

        match created {
            Ok(dir) => {
                let path = dir.keep();
                debug!("Writing debug snapshots to {}", path.display());
                Self { dir: Some(path) }
            }
            Err(e) => {
                warn!(
                    "Debug snapshots disabled, cannot create directory under {}: {}",
                    base.display(),
                    e
                );
                Self::disabled()
            }
        }
    }

    /// Snapshots for an optional base directory
    pub fn for_base(base: Option<&Path>) -> Self {
        base.map(Self::create).unwrap_or_default()
    }

    /// Request directory, if snapshots are enabled
    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    pub fn is_enabled(&self) -> bool {
        self.dir.is_some()
    }

    /// Writes a grayscale snapshot
    pub fn save_gray(&self, name: &str, image: &GrayImage) {
        if let Some(path) = self.path_for(name) {
            if let Err(e) = image.save(&path) {
                warn!("Failed to write debug snapshot {}: {}", path.display(), e);
            }
        }
    }

    /// Writes a color snapshot
    pub fn save_rgb(&self, name: &str, image: &RgbImage) {
        if let Some(path) = self.path_for(name) {
            if let Err(e) = image.save(&path) {
                warn!("Failed to write debug snapshot {}: {}", path.display(), e);
            }
        }
    }

    fn path_for(&self, name: &str) -> Option<PathBuf> {
        self.dir.as_ref().map(|dir| dir.join(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;
    use tempfile::TempDir;

    #[test]
    fn test_disabled_writes_nothing() {
        let snapshots = DebugSnapshots::disabled();
        assert!(!snapshots.is_enabled());
        snapshots.save_gray(RAW_PREDICTION, &GrayImage::new(4, 4));
    }

    #[test]
    fn test_requests_get_distinct_directories() {
        let base = TempDir::new().unwrap();
        let a = DebugSnapshots::create(base.path());
        let b = DebugSnapshots::create(base.path());

        let (dir_a, dir_b) = (a.dir().unwrap(), b.dir().unwrap());
        assert_ne!(dir_a, dir_b);
        assert!(dir_a.starts_with(base.path()));
        assert!(dir_a
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("request-"));
    }

    #[test]
    fn test_save_writes_png() {
        let base = TempDir::new().unwrap();
        let snapshots = DebugSnapshots::create(base.path());
        let image = GrayImage::from_pixel(8, 8, Luma([200]));
        snapshots.save_gray(&threshold_file_name(0.25), &image);

        let written = snapshots.dir().unwrap().join("threshold_0.25.png");
        let loaded = image::open(written).unwrap().to_luma8();
        assert_eq!(loaded.get_pixel(3, 3).0[0], 200);
    }

    #[test]
    fn test_nested_base_is_created() {
        let base = TempDir::new().unwrap();
        let nested = base.path().join("a").join("b");
        let snapshots = DebugSnapshots::create(&nested);
        assert!(snapshots.is_enabled());
        assert!(nested.is_dir());
    }
}
