use image::{DynamicImage, Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_filled_rect_mut};
use imageproc::rect::Rect;
use tempfile::NamedTempFile;

/// Colour constants for tests
pub const BACKGROUND: Rgb<u8> = Rgb([90, 90, 90]);
pub const SKIN: Rgb<u8> = Rgb([230, 110, 70]);
pub const COIN: Rgb<u8> = Rgb([215, 215, 215]);

/// Skin-coloured rectangle drawn into a scene
#[derive(Debug, Clone, Copy)]
pub struct FootSpec {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// Grey disc drawn into a scene
#[derive(Debug, Clone, Copy)]
pub struct CoinSpec {
    pub x: i32,
    pub y: i32,
    pub radius: i32,
}

pub const FOOT: FootSpec = FootSpec {
    x: 60,
    y: 50,
    width: 120,
    height: 280,
};

pub const TOONIE: CoinSpec = CoinSpec {
    x: 300,
    y: 120,
    radius: 22,
};

/// Builds a 400x400 scene on a flat grey background.
pub fn scene(feet: &[FootSpec], coins: &[CoinSpec]) -> DynamicImage {
    let mut img = RgbImage::from_pixel(400, 400, BACKGROUND);
    for foot in feet {
        draw_filled_rect_mut(
            &mut img,
            Rect::at(foot.x, foot.y).of_size(foot.width, foot.height),
            SKIN,
        );
    }
    for coin in coins {
        draw_filled_circle_mut(&mut img, (coin.x, coin.y), coin.radius, COIN);
    }
    DynamicImage::ImageRgb8(img)
}

/// The standard scene: one foot and one coin.
pub fn foot_with_coin() -> DynamicImage {
    scene(&[FOOT], &[TOONIE])
}

/// Saves an image to a temp PNG and returns the temp file.
/// The file will be automatically cleaned up when dropped.
pub fn save_temp_png(img: &DynamicImage) -> NamedTempFile {
    let file = tempfile::Builder::new()
        .suffix(".png")
        .tempfile()
        .expect("Failed to create temp image file");
    img.save_with_format(file.path(), image::ImageFormat::Png)
        .expect("Failed to save test image");
    file
}

pub fn assert_close(actual: f64, expected: f64, tolerance: f64, what: &str) {
    assert!(
        (actual - expected).abs() <= tolerance,
        "{what}: expected {expected} ± {tolerance}, got {actual}"
    );
}
