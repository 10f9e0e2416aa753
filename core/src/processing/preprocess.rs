use crate::error::{FetalscanError, Result};
use crate::types::MASK_SIZE;
use image::imageops::{self, FilterType};
use image::GrayImage;
use imageproc::contrast::equalize_histogram;
use std::path::Path;

/// Decodes an encoded image (PNG, JPEG, ...) into 8-bit grayscale
///
/// # Errors
///
/// Returns `InvalidImage` if the bytes cannot be decoded or the image is empty
pub fn decode_grayscale(bytes: &[u8]) -> Result<GrayImage> {
    let image = image::load_from_memory(bytes)?.to_luma8();
    ensure_not_empty(&image)?;
    Ok(image)
}

/// Reads and decodes an image file into 8-bit grayscale
pub fn open_grayscale<P: AsRef<Path>>(path: P) -> Result<GrayImage> {
    let image = image::open(path.as_ref())?.to_luma8();
    ensure_not_empty(&image)?;
    Ok(image)
}

pub(crate) fn ensure_not_empty(image: &GrayImage) -> Result<()> {
    if image.width() == 0 || image.height() == 0 {
        return Err(FetalscanError::InvalidImage(
            "image has no pixels".to_string(),
        ));
    }
    Ok(())
}

/// Resizes an image onto the square working grid
pub fn resize_to_grid(image: &GrayImage) -> GrayImage {
    if image.dimensions() == (MASK_SIZE, MASK_SIZE) {
        return image.clone();
    }
    imageops::resize(image, MASK_SIZE, MASK_SIZE, FilterType::Triangle)
}

/// Input handed to a segmentation model
///
/// Holds both the resized working image (used by the fallback mask generator
/// and for annotation) and the normalized tensor the model consumes.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelInput {
    working: GrayImage,
    tensor: Vec<f32>,
}

impl ModelInput {
    /// Resizes to 128x128, equalizes the histogram and scales to `[0, 1]`
    pub fn from_image(image: &GrayImage) -> Self {
        let working = resize_to_grid(image);
        let tensor = equalize_histogram(&working)
            .pixels()
            .map(|p| p.0[0] as f32 / 255.0)
            .collect();
        Self { working, tensor }
    }

    /// Side length of the square grid
    pub fn size(&self) -> u32 {
        self.working.width()
    }

    /// Resized image before equalization
    pub fn working_image(&self) -> &GrayImage {
        &self.working
    }

    /// Row-major `size x size x 1` tensor in `[0, 1]`
    pub fn tensor(&self) -> &[f32] {
        &self.tensor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Luma};
    use std::io::Cursor;

    #[test]
    fn test_model_input_shape_and_range() {
        let image = GrayImage::from_fn(300, 200, |x, y| Luma([((x + y) % 256) as u8]));
        let input = ModelInput::from_image(&image);

        assert_eq!(input.size(), MASK_SIZE);
        assert_eq!(input.tensor().len(), (MASK_SIZE * MASK_SIZE) as usize);
        assert!(input.tensor().iter().all(|v| (0.0..=1.0).contains(v)));
        // Equalization stretches the brightest value to full scale
        let max = input.tensor().iter().cloned().fold(0.0f32, f32::max);
        assert!((max - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_resize_keeps_grid_sized_image() {
        let image = GrayImage::from_pixel(MASK_SIZE, MASK_SIZE, Luma([7]));
        assert_eq!(resize_to_grid(&image), image);
    }

    #[test]
    fn test_decode_roundtrip_png() {
        let image = GrayImage::from_pixel(10, 6, Luma([90]));
        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();

        let decoded = decode_grayscale(&bytes).unwrap();
        assert_eq!(decoded.dimensions(), (10, 6));
        assert_eq!(decoded.get_pixel(0, 0).0[0], 90);
    }

    #[test]
    fn test_decode_garbage_is_invalid_image() {
        let err = decode_grayscale(b"definitely not an image").unwrap_err();
        assert!(matches!(err, FetalscanError::InvalidImage(_)));
    }

    #[test]
    fn test_open_missing_file_is_io_error() {
        let err = open_grayscale("/nonexistent/scan.png").unwrap_err();
        assert!(matches!(err, FetalscanError::IoError(_)));
    }
}
