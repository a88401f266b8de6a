use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, MeasureError>;

#[derive(Error, Debug)]
pub enum MeasureError {
    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
    #[error("Image has no pixels ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },
    #[error("No foot contour found in the skin mask")]
    NoFootContour,
    #[error("No reference coin found (no circle with radius {min_radius}..={max_radius} px)")]
    NoReferenceCoin { min_radius: f32, max_radius: f32 },
    #[error("Known reference radius must be finite and positive, got {0}")]
    InvalidReferenceRadius(f64),
    #[error("Detected coin radius must be finite and positive, got {0} px")]
    DegeneratePixelRadius(f32),
    #[error("Step '{step}' needs {missing}, which no earlier step produced")]
    MissingInput { step: String, missing: &'static str },
    #[error("Debug directory is not empty: {0}")]
    DebugDirNotEmpty(PathBuf),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Caption font could not be loaded: {0}")]
    Font(String),
}

impl MeasureError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
