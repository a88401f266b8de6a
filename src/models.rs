use serde::Serialize;

use crate::error::{MeasureError, Result};

/// Axis-aligned rectangle in image coordinates (inclusive extent)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Bounding box of a point set, `None` when empty
    pub fn enclosing<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = (i32, i32)>,
    {
        let mut iter = points.into_iter();
        let (x0, y0) = iter.next()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (x0, y0, x0, y0);
        for (x, y) in iter {
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }

        let min_x = min_x.max(0);
        let min_y = min_y.max(0);
        if max_x < min_x || max_y < min_y {
            return None;
        }
        Some(Self {
            x: min_x as u32,
            y: min_y as u32,
            width: (max_x - min_x + 1) as u32,
            height: (max_y - min_y + 1) as u32,
        })
    }
}

/// Circle found by the Hough transform
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Circle {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    /// Accumulator votes at the centre
    pub votes: f32,
}

/// Physical length represented by one pixel
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScaleRatio {
    pub units_per_pixel: f64,
    pub known_radius: f64,
    pub pixel_radius: f32,
}

impl ScaleRatio {
    /// `known_radius / pixel_radius`, refusing values that would make the ratio
    /// non-finite or meaningless.
    pub fn new(known_radius: f64, pixel_radius: f32) -> Result<Self> {
        if !known_radius.is_finite() || known_radius <= 0.0 {
            return Err(MeasureError::InvalidReferenceRadius(known_radius));
        }
        if !pixel_radius.is_finite() || pixel_radius <= 0.0 {
            return Err(MeasureError::DegeneratePixelRadius(pixel_radius));
        }

        Ok(Self {
            units_per_pixel: known_radius / pixel_radius as f64,
            known_radius,
            pixel_radius,
        })
    }

    pub fn to_physical(&self, pixels: f64) -> f64 {
        pixels * self.units_per_pixel
    }
}

/// Foot size derived from the foot rectangle and the scale
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FootMeasurement {
    pub length_px: u32,
    pub width_px: u32,
    pub length: f64,
    pub width: f64,
}

impl FootMeasurement {
    /// Length runs along the image's vertical axis, width along the horizontal.
    pub fn from_box(foot: &BoundingBox, scale: &ScaleRatio) -> Self {
        Self {
            length_px: foot.height,
            width_px: foot.width,
            length: scale.to_physical(foot.height as f64),
            width: scale.to_physical(foot.width as f64),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enclosing_box_is_inclusive() {
        let bbox = BoundingBox::enclosing([(3, 4), (10, 4), (10, 20), (3, 20)]).unwrap();
        assert_eq!(
            bbox,
            BoundingBox {
                x: 3,
                y: 4,
                width: 8,
                height: 17
            }
        );
        assert_eq!(bbox.area(), 136);
    }

    #[test]
    fn enclosing_box_of_nothing() {
        assert!(BoundingBox::enclosing(std::iter::empty()).is_none());
    }

    #[test]
    fn scale_reproduces_known_radius() {
        let scale = ScaleRatio::new(1.325, 23.0).unwrap();
        assert!((scale.to_physical(23.0) - 1.325).abs() < 1e-12);
        assert!((scale.units_per_pixel - 1.325 / 23.0).abs() < 1e-12);
    }

    #[test]
    fn zero_pixel_radius_is_rejected() {
        assert!(matches!(
            ScaleRatio::new(1.325, 0.0),
            Err(MeasureError::DegeneratePixelRadius(r)) if r == 0.0
        ));
        assert!(ScaleRatio::new(1.325, f32::NAN).is_err());
    }

    #[test]
    fn negative_known_radius_is_rejected() {
        assert!(matches!(
            ScaleRatio::new(-1.0, 10.0),
            Err(MeasureError::InvalidReferenceRadius(_))
        ));
    }

    #[test]
    fn foot_length_follows_height() {
        let scale = ScaleRatio::new(1.0, 10.0).unwrap();
        let foot = BoundingBox {
            x: 0,
            y: 0,
            width: 90,
            height: 250,
        };
        let m = FootMeasurement::from_box(&foot, &scale);
        assert_eq!(m.length_px, 250);
        assert_eq!(m.width_px, 90);
        assert!((m.length - 25.0).abs() < 1e-9);
        assert!((m.width - 9.0).abs() < 1e-9);
    }
}
