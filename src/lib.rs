pub mod config;
pub mod detection;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod report;

pub use config::MeasureConfig;
pub use detection::{build_standard_pipeline, load_image, measure};
pub use error::{MeasureError, Result};
pub use models::{BoundingBox, Circle, FootMeasurement, ScaleRatio};
pub use pipeline::{DebugConfig, Pipeline, PipelineContext, PipelineData, PipelineStep};
pub use report::{Frame, MeasurementReport};

#[cfg(feature = "gui")]
pub mod gui;
