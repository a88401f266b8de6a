use ab_glyph::{FontRef, PxScale};
use image::{DynamicImage, GrayImage, Luma, Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_circle_mut, draw_hollow_rect_mut, draw_text_mut};
use imageproc::rect::Rect;
use serde::Serialize;
use std::fmt;
use std::path::Path;
use std::time::Duration;

use crate::error::{MeasureError, Result};
use crate::models::{BoundingBox, Circle, FootMeasurement};
use crate::pipeline::PipelineData;

const ANNOTATION: Rgb<u8> = Rgb([0, 128, 0]);
const CAPTION_FONT: &[u8] = include_bytes!("../assets/DejaVuSans.ttf");
const CAPTION_SCALE: f32 = 24.0;

/// Console report of a measurement run
#[derive(Debug, Clone, Serialize)]
pub struct MeasurementReport {
    pub unit: String,
    pub coin_radius_px: f32,
    pub coin_radius: f64,
    pub units_per_pixel: f64,
    pub foot: FootMeasurement,
    pub foot_box: BoundingBox,
    pub coin: Circle,
    pub contour_count: usize,
    pub circle_count: usize,
}

impl MeasurementReport {
    pub fn from_data(data: &PipelineData, unit: &str) -> Result<Self> {
        let step = "Report";
        let foot_box = data.require_foot(step)?;
        let coin = data.require_coin(step)?;
        let scale = data.require_scale(step)?;

        Ok(Self {
            unit: unit.to_string(),
            coin_radius_px: coin.radius,
            coin_radius: scale.known_radius,
            units_per_pixel: scale.units_per_pixel,
            foot: FootMeasurement::from_box(&foot_box, &scale),
            foot_box,
            coin,
            contour_count: data.contour_count,
            circle_count: data.circles.len(),
        })
    }

    fn unit_name(&self) -> String {
        match self.unit.as_str() {
            "cm" => "Centimetres".to_string(),
            "mm" => "Millimetres".to_string(),
            "in" => "Inches".to_string(),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for MeasurementReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "COIN MEASUREMENT OUTPUTS")?;
        writeln!(f, "**********************************")?;
        writeln!(f, "Radius in image (pixels) - {:.1}", self.coin_radius_px)?;
        writeln!(f, "Radius in real-life (known constant) - {}", self.coin_radius)?;
        writeln!(f, "{}-Per-Pixel - {:.5}", self.unit_name(), self.units_per_pixel)?;
        writeln!(f)?;
        writeln!(f, "FOOT MEASUREMENT OUTPUTS")?;
        writeln!(f, "**********************************")?;
        writeln!(f, "Foot Length (pixels) - {}", self.foot.length_px)?;
        writeln!(f, "Foot Length ({}) - {:.2}", self.unit, self.foot.length)?;
        writeln!(f, "Foot Width (pixels) - {}", self.foot.width_px)?;
        write!(f, "Foot Width ({}) - {:.2}", self.unit, self.foot.width)
    }
}

/// One visualisation shown to the user
#[derive(Debug, Clone)]
pub struct Frame {
    pub title: String,
    pub image: DynamicImage,
    /// How long to show the frame before advancing automatically
    pub hold: Duration,
}

impl Frame {
    fn new(title: &str, image: DynamicImage, hold: Duration) -> Self {
        Self {
            title: title.to_string(),
            image,
            hold,
        }
    }

    pub fn file_name(&self, index: usize) -> String {
        format!(
            "{:02}_{}.png",
            index + 1,
            self.title
                .to_lowercase()
                .chars()
                .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
                .collect::<String>()
                .split('_')
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join("_")
        )
    }
}

/// Draw a `thickness` px outline by nesting 1 px rectangles inwards.
fn draw_thick_rect(canvas: &mut RgbImage, bbox: &BoundingBox, thickness: u32) {
    for t in 0..thickness {
        if bbox.width <= 2 * t || bbox.height <= 2 * t {
            break;
        }
        let rect = Rect::at((bbox.x + t) as i32, (bbox.y + t) as i32)
            .of_size(bbox.width - 2 * t, bbox.height - 2 * t);
        draw_hollow_rect_mut(canvas, rect, ANNOTATION);
    }
}

fn draw_thick_circle(canvas: &mut RgbImage, circle: &Circle, thickness: u32) {
    let center = (circle.x.round() as i32, circle.y.round() as i32);
    let radius = circle.radius.round() as i32;
    for t in 0..thickness as i32 {
        draw_hollow_circle_mut(canvas, center, radius + t, ANNOTATION);
    }
}

/// Original image with every detected circle and the foot rectangle
pub fn annotate(data: &PipelineData) -> RgbImage {
    let mut canvas = data.original.to_rgb8();
    for circle in &data.circles {
        draw_thick_circle(&mut canvas, circle, 2);
    }
    if let Some(foot) = &data.foot {
        draw_thick_rect(&mut canvas, foot, 2);
    }
    canvas
}

fn caption_font() -> Result<FontRef<'static>> {
    FontRef::try_from_slice(CAPTION_FONT).map_err(|e| MeasureError::Font(e.to_string()))
}

/// Caption origin: 10 px from the left, a tenth of the way down
fn caption_origin(height: u32) -> (i32, i32) {
    (10, (height / 10) as i32)
}

fn gray_frame(
    image: Option<&GrayImage>,
    missing: &'static str,
    title: &str,
    font: &FontRef<'_>,
) -> Result<DynamicImage> {
    let mut canvas = image.cloned().ok_or_else(|| MeasureError::MissingInput {
        step: "Render".to_string(),
        missing,
    })?;
    let (x, y) = caption_origin(canvas.height());
    draw_text_mut(&mut canvas, Luma([255]), x, y, PxScale::from(CAPTION_SCALE), font, title);
    Ok(DynamicImage::ImageLuma8(canvas))
}

/// The three visualisations: skin mask, edge map, annotated original.
/// Each carries its title as a caption.
pub fn render_frames(data: &PipelineData) -> Result<Vec<Frame>> {
    const MASK: &str = "HSV-Filtered Image";
    const EDGES: &str = "Canny Edge Detection";
    const CONTOURS: &str = "Detected Foot + Coin Contours";

    let font = caption_font()?;
    let mut annotated = annotate(data);
    let (x, y) = caption_origin(annotated.height());
    draw_text_mut(
        &mut annotated,
        Rgb([0, 0, 0]),
        x,
        y,
        PxScale::from(CAPTION_SCALE),
        &font,
        CONTOURS,
    );

    Ok(vec![
        Frame::new(
            MASK,
            gray_frame(data.skin_mask.as_ref(), "a skin mask", MASK, &font)?,
            Duration::from_secs(6),
        ),
        Frame::new(
            EDGES,
            gray_frame(data.edges.as_ref(), "an edge map", EDGES, &font)?,
            Duration::from_secs(4),
        ),
        Frame::new(
            CONTOURS,
            DynamicImage::ImageRgb8(annotated),
            Duration::from_secs(4),
        ),
    ])
}

/// Write frames as numbered PNG files
pub fn save_frames(frames: &[Frame], dir: &Path) -> Result<Vec<std::path::PathBuf>> {
    std::fs::create_dir_all(dir).map_err(|e| MeasureError::io(dir, e))?;
    let mut written = Vec::with_capacity(frames.len());
    for (i, frame) in frames.iter().enumerate() {
        let path = dir.join(frame.file_name(i));
        frame.image.save(&path)?;
        written.push(path);
    }
    Ok(written)
}
