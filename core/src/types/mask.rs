use crate::error::{FetalscanError, Result};
use image::{GrayImage, Luma};

/// Side length of the square grid the segmentation model works on
pub const MASK_SIZE: u32 = 128;

/// Pixel value of a set pixel in a [`BinaryMask`]
pub const FOREGROUND: u8 = 255;

/// Pixel value of an unset pixel in a [`BinaryMask`]
pub const BACKGROUND: u8 = 0;

/// Per-pixel foreground probability produced by a segmentation model
///
/// Row-major grid of values in `[0, 1]`. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbabilityMask {
    width: u32,
    height: u32,
    values: Vec<f32>,
}

impl ProbabilityMask {
    /// Creates a mask from row-major values
    ///
    /// # Errors
    ///
    /// Returns `InvalidImage` if the grid is empty, the value count does not
    /// match `width * height`, or a value is outside `[0, 1]`
    pub fn new(width: u32, height: u32, values: Vec<f32>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(FetalscanError::InvalidImage(format!(
                "probability grid must not be empty, got {}x{}",
                width, height
            )));
        }
        let expected = width as usize * height as usize;
        if values.len() != expected {
            return Err(FetalscanError::InvalidImage(format!(
                "probability grid {}x{} needs {} values, got {}",
                width,
                height,
                expected,
                values.len()
            )));
        }
        if let Some(bad) = values.iter().find(|v| !(0.0..=1.0).contains(*v)) {
            return Err(FetalscanError::InvalidImage(format!(
                "probability {} is outside [0, 1]",
                bad
            )));
        }
        Ok(Self {
            width,
            height,
            values,
        })
    }

    /// All-zero mask of the given size
    pub fn zeros(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            values: vec![0.0; width as usize * height as usize],
        }
    }

    /// Builds a mask by evaluating `f(x, y)` for every pixel
    ///
    /// Values are clamped to `[0, 1]`; NaN becomes 0.
    pub fn from_fn<F>(width: u32, height: u32, mut f: F) -> Self
    where
        F: FnMut(u32, u32) -> f32,
    {
        let mut values = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                let v = f(x, y);
                values.push(if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) });
            }
        }
        Self {
            width,
            height,
            values,
        }
    }

    /// Interprets an 8-bit grayscale image as probabilities (`value / 255`)
    pub fn from_image(image: &GrayImage) -> Self {
        Self {
            width: image.width(),
            height: image.height(),
            values: image.pixels().map(|p| p.0[0] as f32 / 255.0).collect(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Probability at column `x`, row `y`
    ///
    /// # Panics
    ///
    /// Panics if the coordinate is out of bounds
    pub fn get(&self, x: u32, y: u32) -> f32 {
        assert!(x < self.width && y < self.height, "index out of bounds");
        self.values[(y * self.width + x) as usize]
    }

    /// Row-major values
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Binarizes the mask: a pixel is set iff its probability is strictly above `threshold`
    pub fn threshold(&self, threshold: f32) -> BinaryMask {
        let image = GrayImage::from_fn(self.width, self.height, |x, y| {
            if self.values[(y * self.width + x) as usize] > threshold {
                Luma([FOREGROUND])
            } else {
                Luma([BACKGROUND])
            }
        });
        BinaryMask(image)
    }

    /// (min, max, mean) of all probabilities
    pub fn stats(&self) -> (f32, f32, f32) {
        let (min, max, sum) = self.values.iter().fold(
            (f32::INFINITY, f32::NEG_INFINITY, 0.0f64),
            |(min, max, sum), &v| (min.min(v), max.max(v), sum + v as f64),
        );
        (min, max, (sum / self.values.len() as f64) as f32)
    }

    /// Renders the probabilities as an 8-bit grayscale image
    pub fn to_image(&self) -> GrayImage {
        GrayImage::from_fn(self.width, self.height, |x, y| {
            let v = self.values[(y * self.width + x) as usize];
            Luma([(v * 255.0).round() as u8])
        })
    }
}

/// Binary region-of-interest on the working grid
///
/// Backed by a grayscale image whose pixels are either [`FOREGROUND`] or
/// [`BACKGROUND`], so it can be handed to `imageproc` directly.
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryMask(GrayImage);

impl BinaryMask {
    /// Empty mask of the given size
    pub fn new(width: u32, height: u32) -> Self {
        Self(GrayImage::new(width, height))
    }

    /// Wraps an image, treating every non-zero pixel as set
    pub fn from_image(mut image: GrayImage) -> Self {
        for p in image.pixels_mut() {
            if p.0[0] != BACKGROUND {
                *p = Luma([FOREGROUND]);
            }
        }
        Self(image)
    }

    pub fn width(&self) -> u32 {
        self.0.width()
    }

    pub fn height(&self) -> u32 {
        self.0.height()
    }

    /// Whether the pixel at column `x`, row `y` is set
    pub fn contains(&self, x: u32, y: u32) -> bool {
        x < self.width() && y < self.height() && self.0.get_pixel(x, y).0[0] != BACKGROUND
    }

    /// Sets the pixel at column `x`, row `y`; out-of-bounds coordinates are ignored
    pub fn set(&mut self, x: i64, y: i64) {
        if x >= 0 && y >= 0 && (x as u32) < self.width() && (y as u32) < self.height() {
            self.0.put_pixel(x as u32, y as u32, Luma([FOREGROUND]));
        }
    }

    /// Number of set pixels
    pub fn count(&self) -> usize {
        self.0.pixels().filter(|p| p.0[0] != BACKGROUND).count()
    }

    /// Whether no pixel is set
    pub fn is_empty(&self) -> bool {
        self.0.pixels().all(|p| p.0[0] == BACKGROUND)
    }

    /// Pixel-wise logical OR with a mask of the same size
    ///
    /// # Panics
    ///
    /// Panics if the sizes differ
    pub fn union(&self, other: &BinaryMask) -> BinaryMask {
        assert_eq!(self.0.dimensions(), other.0.dimensions());
        let image = GrayImage::from_fn(self.width(), self.height(), |x, y| {
            if self.contains(x, y) || other.contains(x, y) {
                Luma([FOREGROUND])
            } else {
                Luma([BACKGROUND])
            }
        });
        BinaryMask(image)
    }

    /// Underlying 0/255 image
    pub fn as_image(&self) -> &GrayImage {
        &self.0
    }

    /// Mutable 0/255 image, for drawing regions into the mask
    ///
    /// Callers must only write [`FOREGROUND`] or [`BACKGROUND`].
    pub(crate) fn as_image_mut(&mut self) -> &mut GrayImage {
        &mut self.0
    }
}
