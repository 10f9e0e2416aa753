pub mod report;

use crate::types::{GestationalAge, PixelSpacing, Target};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Command-line arguments for fetalscan
#[derive(Parser, Debug)]
#[command(name = "fetalscan")]
#[command(about = "Fetal head, cerebellum and ventricle biometry from 2D ultrasound")]
#[command(version)]
pub struct Cli {
    /// Path to the ultrasound image (PNG, JPEG, BMP, ...)
    #[arg(value_name = "IMAGE")]
    pub image: PathBuf,

    /// Anatomical target to measure
    #[arg(short, long)]
    pub target: TargetArg,

    /// Gestational age, e.g. "20", "20w" or "20+3"
    #[arg(short, long, value_parser = GestationalAge::parse)]
    pub age: GestationalAge,

    /// Precomputed segmentation output (grayscale, 255 = certain foreground)
    ///
    /// Without it the classical fallback segmenter is used.
    #[arg(short, long, value_name = "FILE")]
    pub mask: Option<PathBuf>,

    /// Pixel spacing in mm per pixel of the working grid
    #[arg(short, long, default_value = "0.3", value_parser = PixelSpacing::parse)]
    pub pixel_spacing: PixelSpacing,

    /// Output format
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,

    /// Reference table in JSON (requires the `json` feature)
    #[arg(short, long, value_name = "FILE")]
    pub reference: Option<PathBuf>,

    /// Directory for per-request diagnostic images
    #[arg(long, value_name = "DIR")]
    pub debug_dir: Option<PathBuf>,

    /// Write the fitted shape drawn over the working image to this file
    #[arg(long, value_name = "FILE")]
    pub annotate: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Anatomical target options
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum TargetArg {
    /// Fetal head: BPD and HC
    Brain,
    /// Cerebellum: TCD
    Cerebellum,
    /// Lateral ventricle: LVW
    Ventricle,
}

impl From<TargetArg> for Target {
    fn from(arg: TargetArg) -> Self {
        match arg {
            TargetArg::Brain => Target::Brain,
            TargetArg::Cerebellum => Target::Cerebellum,
            TargetArg::Ventricle => Target::Ventricle,
        }
    }
}

/// Output format options
#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text format
    Text,
    /// JSON format
    Json,
}
