use image::{DynamicImage, GrayImage};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::{MeasureError, Result};
use crate::models::{BoundingBox, Circle, ScaleRatio};

/// Data that flows through the pipeline
///
/// Each step reads what earlier steps produced and fills in its own fields.
#[derive(Clone)]
pub struct PipelineData {
    /// The current working image (colour for the input, single channel after masking)
    pub image: DynamicImage,

    /// Reference to the original image (shared efficiently via Arc)
    pub original: Arc<DynamicImage>,

    /// Saturation-based skin mask
    pub skin_mask: Option<GrayImage>,

    /// Binary edge map of the skin mask
    pub edges: Option<GrayImage>,

    /// Number of contours found in the edge map
    pub contour_count: usize,

    /// Rectangle of the detected foot
    pub foot: Option<BoundingBox>,

    /// Every circle the Hough transform accepted, strongest first
    pub circles: Vec<Circle>,

    /// Circle chosen as the reference coin
    pub coin: Option<Circle>,

    pub scale: Option<ScaleRatio>,
}

impl PipelineData {
    /// Create PipelineData for a full image
    pub fn from_image(image: DynamicImage) -> Self {
        let original = Arc::new(image.clone());
        Self {
            image,
            original,
            skin_mask: None,
            edges: None,
            contour_count: 0,
            foot: None,
            circles: Vec::new(),
            coin: None,
            scale: None,
        }
    }

    pub fn require_skin_mask(&self, step: &str) -> Result<&GrayImage> {
        self.skin_mask.as_ref().ok_or_else(|| missing(step, "a skin mask"))
    }

    pub fn require_edges(&self, step: &str) -> Result<&GrayImage> {
        self.edges.as_ref().ok_or_else(|| missing(step, "an edge map"))
    }

    pub fn require_foot(&self, step: &str) -> Result<BoundingBox> {
        self.foot.ok_or_else(|| missing(step, "a foot rectangle"))
    }

    pub fn require_coin(&self, step: &str) -> Result<Circle> {
        self.coin.ok_or_else(|| missing(step, "a reference coin"))
    }

    pub fn require_scale(&self, step: &str) -> Result<ScaleRatio> {
        self.scale.ok_or_else(|| missing(step, "a scale ratio"))
    }
}

fn missing(step: &str, what: &'static str) -> MeasureError {
    MeasureError::MissingInput {
        step: step.to_string(),
        missing: what,
    }
}

/// Debug configuration for pipeline execution
#[derive(Clone, Debug)]
pub struct DebugConfig {
    /// Root directory for debug outputs
    pub output_dir: PathBuf,
}

/// Context available to all pipeline steps
#[derive(Clone, Default)]
pub struct PipelineContext {
    pub debug: Option<DebugConfig>,
}

/// Trait that all pipeline steps must implement
pub trait PipelineStep: Send + Sync {
    /// Process data and return the enriched data
    fn process(&self, data: PipelineData, context: &PipelineContext) -> Result<PipelineData>;

    /// Human-readable name for this step (used in logs and debug directory names)
    fn name(&self) -> &str;
}

/// Composable pipeline builder
pub struct Pipeline {
    steps: Vec<Arc<dyn PipelineStep>>,
    context: PipelineContext,
}

impl Pipeline {
    /// Create a new empty pipeline
    pub fn new() -> Self {
        Self {
            steps: Vec::new(),
            context: PipelineContext::default(),
        }
    }

    /// Enable debug mode with output directory
    /// The directory must be empty or non-existent
    pub fn with_debug(mut self, output_dir: PathBuf) -> Result<Self> {
        if output_dir.exists() {
            let mut entries =
                std::fs::read_dir(&output_dir).map_err(|e| MeasureError::io(&output_dir, e))?;
            if entries.next().is_some() {
                return Err(MeasureError::DebugDirNotEmpty(output_dir));
            }
        } else {
            std::fs::create_dir_all(&output_dir).map_err(|e| MeasureError::io(&output_dir, e))?;
        }

        self.context.debug = Some(DebugConfig { output_dir });

        Ok(self)
    }

    /// Add a processing step to the pipeline
    pub fn add_step(mut self, step: Arc<dyn PipelineStep>) -> Self {
        self.steps.push(step);
        self
    }

    /// Helper method to add a step from a Box (for convenience)
    pub fn add_step_boxed(mut self, step: Box<dyn PipelineStep>) -> Self {
        self.steps.push(Arc::from(step));
        self
    }

    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    /// Run every step in order on an input image
    pub fn run(&self, input: DynamicImage) -> Result<PipelineData> {
        self.run_partial(input, self.steps.len())
    }

    /// Run the pipeline but stop after `num_steps` steps (useful for debugging)
    pub fn run_partial(&self, input: DynamicImage, num_steps: usize) -> Result<PipelineData> {
        if let Some(dir) = self.debug_dir() {
            save_debug_image(&input, &dir.join("00_input"))?;
        }

        let mut data = PipelineData::from_image(input);

        for (step_idx, step) in self.steps.iter().take(num_steps).enumerate() {
            info!(step = step.name(), "Running step {}", step_idx + 1);
            data = step.process(data, &self.context)?;

            if let Some(dir) = self.debug_dir() {
                let step_dir_name = format!(
                    "{:02}_{}",
                    step_idx + 1,
                    step.name().to_lowercase().replace(' ', "_")
                );
                save_debug_image(&data.image, &dir.join(&step_dir_name))?;
                debug!("Debug: saved {}/01.png", step_dir_name);
            }
        }

        Ok(data)
    }

    fn debug_dir(&self) -> Option<&Path> {
        self.context
            .debug
            .as_ref()
            .map(|d| d.output_dir.as_path())
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

fn save_debug_image(image: &DynamicImage, step_dir: &Path) -> Result<()> {
    std::fs::create_dir_all(step_dir).map_err(|e| MeasureError::io(step_dir, e))?;
    image.save(step_dir.join("01.png"))?;
    Ok(())
}
