use serde::Deserialize;
use std::path::Path;

use crate::error::{MeasureError, Result};

/// Skin isolation parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SkinMaskConfig {
    /// Gaussian sigma applied to the colour image (0.8 matches a 3x3 kernel).
    pub blur_sigma: f32,
    /// Saturation values at or below this are zeroed.
    pub saturation_threshold: u8,
}

impl Default for SkinMaskConfig {
    fn default() -> Self {
        Self {
            blur_sigma: 0.8,
            saturation_threshold: 45,
        }
    }
}

/// Canny thresholds for the skin mask.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EdgeConfig {
    pub low_threshold: f32,
    pub high_threshold: f32,
}

impl Default for EdgeConfig {
    fn default() -> Self {
        Self {
            low_threshold: 150.0,
            high_threshold: 225.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ContourConfig {
    /// Douglas-Peucker tolerance in pixels.
    pub epsilon: f64,
}

impl Default for ContourConfig {
    fn default() -> Self {
        Self { epsilon: 3.0 }
    }
}

/// Gradient Hough circle transform parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CircleDetectionConfig {
    /// Gaussian sigma applied to the grayscale image before voting.
    pub blur_sigma: f32,
    /// Inverse accumulator resolution: 1.5 means one cell per 1.5 pixels.
    pub dp: f32,
    /// Minimum distance between accepted circle centres (pixels).
    pub min_distance: f32,
    /// High Canny threshold for the internal edge map (low is half of it).
    pub canny_high: f32,
    /// Minimum accumulator votes for a centre candidate.
    pub accumulator_threshold: f32,
    pub min_radius: f32,
    pub max_radius: f32,
    /// Fraction of the circumference `2πr` that edge pixels must cover.
    pub min_support: f32,
}

impl Default for CircleDetectionConfig {
    fn default() -> Self {
        Self {
            blur_sigma: 0.8,
            dp: 1.5,
            min_distance: 50.0,
            canny_high: 150.0,
            accumulator_threshold: 40.0,
            min_radius: 5.0,
            max_radius: 30.0,
            min_support: 0.5,
        }
    }
}

/// Physical size of the reference coin.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReferenceConfig {
    pub radius: f64,
    /// Unit label of `radius`, used in the report.
    pub unit: String,
}

impl Default for ReferenceConfig {
    fn default() -> Self {
        Self {
            radius: 1.325,
            unit: "cm".to_string(),
        }
    }
}

/// Full parameter set of a measurement run.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MeasureConfig {
    pub skin: SkinMaskConfig,
    pub edges: EdgeConfig,
    pub contours: ContourConfig,
    pub circles: CircleDetectionConfig,
    pub reference: ReferenceConfig,
}

impl MeasureConfig {
    /// Load a JSON config file. Missing fields keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| MeasureError::io(path, e))?;
        let config: Self = serde_json::from_str(&raw)
            .map_err(|e| MeasureError::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let positive = |name: &str, v: f64| {
            if v.is_finite() && v > 0.0 {
                Ok(())
            } else {
                Err(MeasureError::Config(format!("{name} must be positive, got {v}")))
            }
        };

        let non_negative = |name: &str, v: f64| {
            if v.is_finite() && v >= 0.0 {
                Ok(())
            } else {
                Err(MeasureError::Config(format!("{name} must not be negative, got {v}")))
            }
        };

        positive("skin.blur_sigma", self.skin.blur_sigma as f64)?;
        positive("circles.blur_sigma", self.circles.blur_sigma as f64)?;
        positive("circles.max_radius", self.circles.max_radius as f64)?;
        positive("circles.canny_high", self.circles.canny_high as f64)?;
        positive("contours.epsilon", self.contours.epsilon)?;
        non_negative("edges.low_threshold", self.edges.low_threshold as f64)?;
        non_negative("circles.min_distance", self.circles.min_distance as f64)?;
        non_negative(
            "circles.accumulator_threshold",
            self.circles.accumulator_threshold as f64,
        )?;
        // The accumulator is never finer than the image
        if !self.circles.dp.is_finite() || self.circles.dp < 1.0 {
            return Err(MeasureError::Config(format!(
                "circles.dp must be at least 1.0, got {}",
                self.circles.dp
            )));
        }
        if !(0.0..=1.0).contains(&self.circles.min_support) {
            return Err(MeasureError::Config(format!(
                "circles.min_support must be within 0..=1, got {}",
                self.circles.min_support
            )));
        }
        if self.reference.radius <= 0.0 || !self.reference.radius.is_finite() {
            return Err(MeasureError::InvalidReferenceRadius(self.reference.radius));
        }
        if self.circles.min_radius < 0.0 || self.circles.max_radius < self.circles.min_radius {
            return Err(MeasureError::Config(format!(
                "circle radius window {}..={} is empty",
                self.circles.min_radius, self.circles.max_radius
            )));
        }
        if self.edges.high_threshold < self.edges.low_threshold {
            return Err(MeasureError::Config(
                "edges.high_threshold must not be below edges.low_threshold".to_string(),
            ));
        }
        Ok(())
    }
}
