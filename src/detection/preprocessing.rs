use image::{DynamicImage, GrayImage, Luma, RgbImage};
use imageproc::edges::canny;
use imageproc::filter::gaussian_blur_f32;

use crate::config::SkinMaskConfig;

/// Convert image to grayscale
pub fn to_grayscale(img: &DynamicImage) -> GrayImage {
    img.to_luma8()
}

/// Apply Gaussian blur to reduce noise
pub fn apply_blur(img: &GrayImage, sigma: f32) -> GrayImage {
    gaussian_blur_f32(img, sigma)
}

/// Blur all three colour channels
pub fn smooth_color(img: &RgbImage, sigma: f32) -> RgbImage {
    gaussian_blur_f32(img, sigma)
}

/// HSV saturation on the 0-255 scale: `255 * (max - min) / max`.
pub fn saturation_channel(img: &RgbImage) -> GrayImage {
    GrayImage::from_fn(img.width(), img.height(), |x, y| {
        let [r, g, b] = img.get_pixel(x, y).0;
        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        if max == 0 {
            return Luma([0]);
        }
        let s = 255.0 * (max - min) as f32 / max as f32;
        Luma([s.round().min(255.0) as u8])
    })
}

/// Zero every value `<= threshold`, keep the rest unchanged.
pub fn threshold_to_zero(img: &mut GrayImage, threshold: u8) {
    for p in img.pixels_mut() {
        if p[0] <= threshold {
            p[0] = 0;
        }
    }
}

/// Single-channel mask of probable skin pixels.
///
/// Skin is noticeably more saturated than a plain floor or paper background,
/// so the saturation channel of the smoothed image is kept and low values are
/// suppressed.
pub fn skin_mask(img: &DynamicImage, config: &SkinMaskConfig) -> GrayImage {
    let smoothed = smooth_color(&img.to_rgb8(), config.blur_sigma);
    let mut mask = saturation_channel(&smoothed);
    threshold_to_zero(&mut mask, config.saturation_threshold);
    mask
}

/// Grayscale input of the circle transform: the colour image is smoothed,
/// converted, then the gray is smoothed again.
pub fn circle_input(img: &DynamicImage, sigma: f32) -> GrayImage {
    let smoothed = DynamicImage::ImageRgb8(smooth_color(&img.to_rgb8(), sigma));
    apply_blur(&to_grayscale(&smoothed), sigma)
}

/// Detect edges using Canny edge detector
pub fn detect_edges(img: &GrayImage, low_threshold: f32, high_threshold: f32) -> GrayImage {
    canny(img, low_threshold, high_threshold)
}
