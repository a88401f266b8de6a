pub mod preprocessing;
pub mod contours;
pub mod circles;
pub mod steps;

use image::{DynamicImage, ImageReader};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use crate::config::MeasureConfig;
use crate::error::{MeasureError, Result};
use crate::pipeline::{Pipeline, PipelineData};
use steps::*;

/// Read and decode an image file, rejecting images without pixels
pub fn load_image(path: &Path) -> Result<DynamicImage> {
    let img = ImageReader::open(path)
        .map_err(|e| MeasureError::io(path, e))?
        .with_guessed_format()
        .map_err(|e| MeasureError::io(path, e))?
        .decode()?;

    if img.width() == 0 || img.height() == 0 {
        return Err(MeasureError::EmptyImage {
            width: img.width(),
            height: img.height(),
        });
    }
    info!(width = img.width(), height = img.height(), "Image loaded");
    Ok(img)
}

/// Build the standard foot measurement pipeline
pub fn build_standard_pipeline(config: &MeasureConfig) -> Pipeline {
    Pipeline::new()
        .add_step(Arc::new(SkinMaskStep {
            config: config.skin.clone(),
        }))
        .add_step(Arc::new(EdgeDetectionStep {
            config: config.edges.clone(),
        }))
        .add_step(Arc::new(FootContourStep {
            config: config.contours.clone(),
        }))
        .add_step(Arc::new(CoinDetectionStep {
            config: config.circles.clone(),
        }))
        .add_step(Arc::new(ScaleStep {
            known_radius: config.reference.radius,
        }))
}

/// Run the standard pipeline on an image
pub fn measure(img: DynamicImage, config: &MeasureConfig) -> Result<PipelineData> {
    config.validate()?;
    build_standard_pipeline(config).run(img)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_pipeline_order() {
        let pipeline = build_standard_pipeline(&MeasureConfig::default());
        assert_eq!(
            pipeline.step_names(),
            vec!["HSV Skin Mask", "Edge Detection", "Foot Contour", "Coin Detection", "Scale"]
        );
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = load_image(Path::new("does/not/exist.png")).unwrap_err();
        assert!(matches!(err, MeasureError::Io { .. }));
    }
}
