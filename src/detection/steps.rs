use crate::config::{CircleDetectionConfig, ContourConfig, EdgeConfig, SkinMaskConfig};
use crate::detection::{circles, contours, preprocessing};
use crate::error::{MeasureError, Result};
use crate::models::ScaleRatio;
use crate::pipeline::{PipelineContext, PipelineData, PipelineStep};
use image::DynamicImage;
use tracing::{debug, warn};

/// Isolate probable skin pixels through the saturation channel
pub struct SkinMaskStep {
    pub config: SkinMaskConfig,
}

impl PipelineStep for SkinMaskStep {
    fn process(&self, mut data: PipelineData, _context: &PipelineContext) -> Result<PipelineData> {
        let mask = preprocessing::skin_mask(&data.image, &self.config);
        debug!(
            threshold = self.config.saturation_threshold,
            kept = mask.pixels().filter(|p| p[0] > 0).count(),
            "Skin mask built"
        );
        data.image = DynamicImage::ImageLuma8(mask.clone());
        data.skin_mask = Some(mask);
        Ok(data)
    }

    fn name(&self) -> &str {
        "HSV Skin Mask"
    }
}

/// Detect edges of the skin mask using Canny
pub struct EdgeDetectionStep {
    pub config: EdgeConfig,
}

impl PipelineStep for EdgeDetectionStep {
    fn process(&self, mut data: PipelineData, _context: &PipelineContext) -> Result<PipelineData> {
        let mask = data.require_skin_mask(self.name())?;
        let edges = preprocessing::detect_edges(
            mask,
            self.config.low_threshold,
            self.config.high_threshold,
        );
        data.image = DynamicImage::ImageLuma8(edges.clone());
        data.edges = Some(edges);
        Ok(data)
    }

    fn name(&self) -> &str {
        "Edge Detection"
    }
}

/// Pick the largest contour rectangle as the foot
pub struct FootContourStep {
    pub config: ContourConfig,
}

impl PipelineStep for FootContourStep {
    fn process(&self, mut data: PipelineData, _context: &PipelineContext) -> Result<PipelineData> {
        let edges = data.require_edges(self.name())?;
        let (foot, count) = contours::find_foot_region(edges, self.config.epsilon);
        debug!(contours = count, foot = ?foot, "Contours analysed");

        data.contour_count = count;
        data.foot = Some(foot.ok_or(MeasureError::NoFootContour)?);
        Ok(data)
    }

    fn name(&self) -> &str {
        "Foot Contour"
    }
}

/// Find circles on the grayscale original and keep the largest as the coin
pub struct CoinDetectionStep {
    pub config: CircleDetectionConfig,
}

impl PipelineStep for CoinDetectionStep {
    fn process(&self, mut data: PipelineData, _context: &PipelineContext) -> Result<PipelineData> {
        let blurred = preprocessing::circle_input(&data.original, self.config.blur_sigma);
        let found = circles::detect_circles(&blurred, &self.config);
        debug!(circles = found.len(), "Hough circle transform done");

        let coin = circles::select_coin(&found).ok_or(MeasureError::NoReferenceCoin {
            min_radius: self.config.min_radius,
            max_radius: self.config.max_radius,
        })?;
        if coin.radius >= self.config.max_radius - 1.0 {
            warn!(
                radius = coin.radius,
                max_radius = self.config.max_radius,
                "Coin radius is at the search limit; the coin may be larger than max_radius"
            );
        }

        data.image = DynamicImage::ImageLuma8(blurred);
        data.circles = found;
        data.coin = Some(coin);
        Ok(data)
    }

    fn name(&self) -> &str {
        "Coin Detection"
    }
}

/// Derive the length-per-pixel ratio from the coin
pub struct ScaleStep {
    pub known_radius: f64,
}

impl PipelineStep for ScaleStep {
    fn process(&self, mut data: PipelineData, _context: &PipelineContext) -> Result<PipelineData> {
        let coin = data.require_coin(self.name())?;
        let scale = ScaleRatio::new(self.known_radius, coin.radius)?;
        debug!(units_per_pixel = scale.units_per_pixel, "Scale computed");
        data.scale = Some(scale);
        Ok(data)
    }

    fn name(&self) -> &str {
        "Scale"
    }
}
