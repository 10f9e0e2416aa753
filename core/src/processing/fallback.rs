//! Rule-based mask generator used when the model response is too weak
//!
//! Pipeline on the working-grid image:
//! 1. Contrast-limited adaptive histogram equalization
//! 2. Gaussian blur
//! 3. Inverse Gaussian adaptive threshold, opened then closed
//! 4. Canny edges on the blurred image, closed
//! 5. Union of (3) and (4); the largest external contours are filled
//! 6. Final closing

use super::contour::{by_size_descending, external_contours};
use crate::types::{BinaryMask, FallbackConfig, BACKGROUND, FOREGROUND};
use image::imageops::{self, FilterType};
use image::{GrayImage, Luma};
use imageproc::distance_transform::Norm;
use imageproc::edges::canny;
use imageproc::filter::gaussian_blur_f32;
use imageproc::morphology::{close, open};

/// Builds a binary mask of size `width x height` directly from the image
pub fn generate_mask(
    image: &GrayImage,
    width: u32,
    height: u32,
    config: &FallbackConfig,
) -> BinaryMask {
    let working = if image.dimensions() == (width, height) {
        image.clone()
    } else {
        imageops::resize(image, width, height, FilterType::Triangle)
    };

    let equalized = clahe(&working, config.clahe_clip_limit, config.clahe_grid);
    let blurred = gaussian_blur_f32(&equalized, kernel_sigma(config.blur_kernel));

    let thresh = adaptive_threshold_inv(&blurred, config.adaptive_block, config.adaptive_c);
    let thresh = close_iter(
        &open(&thresh, Norm::LInf, config.morph_radius),
        config.morph_radius,
        2,
    );

    let edges = canny(&blurred, config.canny_low, config.canny_high);
    let edges = close_iter(&edges, config.morph_radius, 1);

    let combined = BinaryMask::from_image(thresh).union(&BinaryMask::from_image(edges));

    let mut contours = external_contours(&combined);
    contours.sort_by(by_size_descending);

    let mut filled = BinaryMask::new(width, height);
    for (i, contour) in contours.iter().take(config.max_regions).enumerate() {
        if i == 0 || contour.area() > config.min_secondary_area {
            contour.fill_into(&mut filled);
        }
    }

    BinaryMask::from_image(close_iter(filled.as_image(), config.morph_radius, 2))
}

/// Gaussian sigma of a `k x k` kernel when no sigma is given explicitly
///
/// Same rule the common imaging toolkits use: `0.3 * ((k - 1) / 2 - 1) + 0.8`.
pub fn kernel_sigma(kernel: u32) -> f32 {
    let k = kernel.max(1) as f32;
    0.3 * ((k - 1.0) * 0.5 - 1.0) + 0.8
}

// Closing repeated `iterations` times; square dilations compose additively
fn close_iter(image: &GrayImage, radius: u8, iterations: u8) -> GrayImage {
    let k = radius.saturating_mul(iterations);
    if k == 0 {
        return image.clone();
    }
    close(image, Norm::LInf, k)
}

/// Inverse adaptive threshold with a Gaussian-weighted local mean
///
/// A pixel is set when it is at least `c` below the weighted mean of its
/// `block x block` neighbourhood.
pub fn adaptive_threshold_inv(image: &GrayImage, block: u32, c: i32) -> GrayImage {
    let mean = gaussian_blur_f32(image, kernel_sigma(block));
    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        let src = image.get_pixel(x, y).0[0] as i32;
        let local = mean.get_pixel(x, y).0[0] as i32;
        if src > local - c {
            Luma([BACKGROUND])
        } else {
            Luma([FOREGROUND])
        }
    })
}

/// Contrast-limited adaptive histogram equalization
///
/// The image is split into a `grid x grid` set of tiles. Each tile histogram
/// is clipped at `clip_limit` times the uniform bin height, the excess is
/// redistributed evenly, and the resulting lookup tables are bilinearly
/// interpolated between tile centers.
pub fn clahe(image: &GrayImage, clip_limit: f32, grid: u32) -> GrayImage {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return image.clone();
    }
    let grid = grid.clamp(1, width.min(height));
    let tile_w = width.div_ceil(grid);
    let tile_h = height.div_ceil(grid);

    let mut luts = vec![[0u8; 256]; (grid * grid) as usize];
    for ty in 0..grid {
        for tx in 0..grid {
            let x0 = tx * tile_w;
            let y0 = ty * tile_h;
            let x1 = (x0 + tile_w).min(width);
            let y1 = (y0 + tile_h).min(height);

            let mut hist = [0u32; 256];
            for y in y0..y1 {
                for x in x0..x1 {
                    hist[image.get_pixel(x, y).0[0] as usize] += 1;
                }
            }
            let area = (x1.saturating_sub(x0) * y1.saturating_sub(y0)).max(1);
            luts[(ty * grid + tx) as usize] = tile_lut(&mut hist, area, clip_limit);
        }
    }

    GrayImage::from_fn(width, height, |x, y| {
        let fx = x as f32 / tile_w as f32 - 0.5;
        let fy = y as f32 / tile_h as f32 - 0.5;
        let tx1 = fx.floor();
        let ty1 = fy.floor();
        let xa = fx - tx1;
        let ya = fy - ty1;

        let last = grid as i64 - 1;
        let clamp = |v: i64| v.clamp(0, last) as u32;
        let (tx1, tx2) = (clamp(tx1 as i64), clamp(tx1 as i64 + 1));
        let (ty1, ty2) = (clamp(ty1 as i64), clamp(ty1 as i64 + 1));

        let v = image.get_pixel(x, y).0[0] as usize;
        let lut = |tx: u32, ty: u32| luts[(ty * grid + tx) as usize][v] as f32;

        let top = lut(tx1, ty1) * (1.0 - xa) + lut(tx2, ty1) * xa;
        let bottom = lut(tx1, ty2) * (1.0 - xa) + lut(tx2, ty2) * xa;
        let value = top * (1.0 - ya) + bottom * ya;
        Luma([value.round().clamp(0.0, 255.0) as u8])
    })
}

fn tile_lut(hist: &mut [u32; 256], area: u32, clip_limit: f32) -> [u8; 256] {
    if clip_limit > 0.0 {
        let limit = ((clip_limit * area as f32 / 256.0) as u32).max(1);
        let mut excess = 0u32;
        for bin in hist.iter_mut() {
            if *bin > limit {
                excess += *bin - limit;
                *bin = limit;
            }
        }

        let batch = excess / 256;
        let mut residual = excess - batch * 256;
        for bin in hist.iter_mut() {
            *bin += batch;
        }
        if residual > 0 {
            let step = (256 / residual).max(1) as usize;
            let mut i = 0;
            while i < 256 && residual > 0 {
                hist[i] += 1;
                residual -= 1;
                i += step;
            }
        }
    }

    let scale = 255.0 / area as f32;
    let mut lut = [0u8; 256];
    let mut sum = 0u32;
    for (i, bin) in hist.iter().enumerate() {
        sum += bin;
        lut[i] = (sum as f32 * scale).round().clamp(0.0, 255.0) as u8;
    }
    lut
}
