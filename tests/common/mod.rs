mod fixtures;
pub use fixtures::*;

// Re-export commonly used types from footscale for tests
pub use footscale::{MeasureConfig, MeasureError, MeasurementReport};
