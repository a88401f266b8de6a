//! Gradient Hough transform for circles.
//!
//! Every edge pixel votes along its gradient direction, in both senses, at
//! each radius of the search window. Circle boundaries produce accumulator
//! peaks at their centres because their gradients converge radially. Each
//! peak is then given the radius best supported by the surrounding edge
//! pixels.

use image::GrayImage;
use imageproc::gradients::{horizontal_sobel, vertical_sobel};

use crate::config::CircleDetectionConfig;
use crate::detection::preprocessing::detect_edges;
use crate::models::Circle;

struct Accumulator {
    width: usize,
    height: usize,
    cells: Vec<u32>,
}

impl Accumulator {
    fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![0; width * height],
        }
    }

    #[inline]
    fn get(&self, x: usize, y: usize) -> u32 {
        self.cells[y * self.width + x]
    }

    /// Local maxima above `threshold`, strongest first.
    fn peaks(&self, threshold: f32) -> Vec<(usize, usize, u32)> {
        let mut peaks = Vec::new();
        if self.width < 3 || self.height < 3 {
            return peaks;
        }
        for y in 1..self.height - 1 {
            for x in 1..self.width - 1 {
                let v = self.get(x, y);
                if (v as f32) > threshold
                    && v > self.get(x - 1, y)
                    && v >= self.get(x + 1, y)
                    && v > self.get(x, y - 1)
                    && v >= self.get(x, y + 1)
                {
                    peaks.push((x, y, v));
                }
            }
        }
        peaks.sort_by(|a, b| b.2.cmp(&a.2));
        peaks
    }

    /// Vote-weighted centroid of the 3x3 neighbourhood, in cell units.
    fn refine(&self, x: usize, y: usize) -> (f32, f32) {
        let mut sum = 0.0f32;
        let mut sx = 0.0f32;
        let mut sy = 0.0f32;
        for ny in y - 1..=y + 1 {
            for nx in x - 1..=x + 1 {
                let w = self.get(nx, ny) as f32;
                sum += w;
                sx += w * nx as f32;
                sy += w * ny as f32;
            }
        }
        if sum <= 0.0 {
            return (x as f32, y as f32);
        }
        (sx / sum, sy / sum)
    }
}

/// Detect circles in a (blurred) grayscale image.
///
/// Returned circles are ordered by accumulator votes, strongest first.
pub fn detect_circles(gray: &GrayImage, config: &CircleDetectionConfig) -> Vec<Circle> {
    let (w, h) = gray.dimensions();
    let coarse_enough = config.dp >= 1.0;
    if w < 3 || h < 3 || !coarse_enough || config.max_radius < config.min_radius {
        return Vec::new();
    }

    let edges = detect_edges(gray, config.canny_high / 2.0, config.canny_high);
    let gx = horizontal_sobel(gray);
    let gy = vertical_sobel(gray);

    let dp = config.dp;
    let mut accum = Accumulator::new(
        (w as f32 / dp).ceil() as usize,
        (h as f32 / dp).ceil() as usize,
    );

    let r_first = config.min_radius.max(1.0).ceil() as u32;
    let r_last = config.max_radius.floor() as u32;

    let mut edge_points: Vec<(f32, f32)> = Vec::new();
    for (x, y, p) in edges.enumerate_pixels() {
        if p[0] == 0 {
            continue;
        }
        edge_points.push((x as f32, y as f32));

        let vx = gx.get_pixel(x, y)[0] as f32;
        let vy = gy.get_pixel(x, y)[0] as f32;
        let mag = (vx * vx + vy * vy).sqrt();
        if mag < 1e-6 {
            continue;
        }
        let (dx, dy) = (vx / mag, vy / mag);

        for sign in [-1.0f32, 1.0] {
            for r in r_first..=r_last {
                let px = x as f32 + sign * dx * r as f32;
                let py = y as f32 + sign * dy * r as f32;
                if px < 0.0 || py < 0.0 {
                    break;
                }
                let cx = (px / dp) as usize;
                let cy = (py / dp) as usize;
                if cx >= accum.width || cy >= accum.height {
                    break;
                }
                accum.cells[cy * accum.width + cx] += 1;
            }
        }
    }

    let min_dist = config.min_distance.max(0.0);
    let min_dist_sq = min_dist * min_dist;
    let mut circles: Vec<Circle> = Vec::new();

    for (ax, ay, votes) in accum.peaks(config.accumulator_threshold) {
        let (rx, ry) = accum.refine(ax, ay);
        let cx = (rx + 0.5) * dp;
        let cy = (ry + 0.5) * dp;

        let crowded = circles.iter().any(|c| {
            let (ddx, ddy) = (c.x - cx, c.y - cy);
            ddx * ddx + ddy * ddy < min_dist_sq
        });
        if crowded {
            continue;
        }

        if let Some(radius) = estimate_radius(&edge_points, cx, cy, config) {
            circles.push(Circle {
                x: cx,
                y: cy,
                radius,
                votes: votes as f32,
            });
        }
    }

    circles
}

/// Radius best supported by edge pixels around `(cx, cy)`.
///
/// Distances are histogrammed in 1 px bins; the 3-bin window with the most
/// pixels wins and the radius is the mean distance inside it. `None` when the
/// support covers less than `min_support` of the circumference.
fn estimate_radius(
    edge_points: &[(f32, f32)],
    cx: f32,
    cy: f32,
    config: &CircleDetectionConfig,
) -> Option<f32> {
    let bins = config.max_radius.ceil() as usize + 2;
    let mut counts = vec![0u32; bins];
    let mut sums = vec![0.0f32; bins];
    let reach = config.max_radius + 1.0;

    for &(x, y) in edge_points {
        let (dx, dy) = (x - cx, y - cy);
        if dx.abs() > reach || dy.abs() > reach {
            continue;
        }
        let d = (dx * dx + dy * dy).sqrt();
        if d < config.min_radius || d > reach {
            continue;
        }
        let bin = d as usize;
        if bin < bins {
            counts[bin] += 1;
            sums[bin] += d;
        }
    }

    let mut best: Option<(usize, u32)> = None;
    for b in 1..bins - 1 {
        let support = counts[b - 1] + counts[b] + counts[b + 1];
        if support > best.map_or(0, |(_, s)| s) {
            best = Some((b, support));
        }
    }

    let (b, support) = best?;
    let radius = (sums[b - 1] + sums[b] + sums[b + 1]) / support as f32;
    if radius < config.min_radius || radius > config.max_radius {
        return None;
    }
    let circumference = 2.0 * std::f32::consts::PI * radius;
    if (support as f32) < config.min_support * circumference {
        return None;
    }
    Some(radius)
}

/// The circle with the largest radius. A later circle must be strictly
/// larger to replace the current one.
pub fn select_coin(circles: &[Circle]) -> Option<Circle> {
    let mut best: Option<Circle> = None;
    for circle in circles {
        if circle.radius > best.map_or(0.0, |b| b.radius) {
            best = Some(*circle);
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use imageproc::drawing::draw_filled_circle_mut;
    use image::Luma;

    fn circle(x: f32, y: f32, radius: f32) -> Circle {
        Circle {
            x,
            y,
            radius,
            votes: 100.0,
        }
    }

    fn disc_image(w: u32, h: u32, discs: &[((i32, i32), i32)]) -> GrayImage {
        let mut img = GrayImage::from_pixel(w, h, Luma([60]));
        for &(center, radius) in discs {
            draw_filled_circle_mut(&mut img, center, radius, Luma([210]));
        }
        crate::detection::preprocessing::apply_blur(&img, 0.8)
    }

    #[test]
    fn select_coin_takes_largest_radius() {
        let circles = [circle(10.0, 10.0, 8.0), circle(100.0, 5.0, 21.5), circle(50.0, 50.0, 12.0)];
        assert_eq!(select_coin(&circles).unwrap().radius, 21.5);
    }

    #[test]
    fn select_coin_tie_keeps_first() {
        let circles = [circle(10.0, 10.0, 15.0), circle(90.0, 90.0, 15.0)];
        assert_eq!(select_coin(&circles).unwrap().x, 10.0);
    }

    #[test]
    fn select_coin_of_nothing() {
        assert!(select_coin(&[]).is_none());
    }

    #[test]
    fn detects_single_disc() {
        let img = disc_image(160, 120, &[((80, 60), 20)]);
        let circles = detect_circles(&img, &CircleDetectionConfig::default());

        assert_eq!(circles.len(), 1, "circles: {:?}", circles);
        let c = circles[0];
        assert!((c.x - 80.0).abs() < 1.5, "x = {}", c.x);
        assert!((c.y - 60.0).abs() < 1.5, "y = {}", c.y);
        assert!((c.radius - 20.0).abs() < 1.5, "radius = {}", c.radius);
    }

    #[test]
    fn blank_image_has_no_circles() {
        let img = GrayImage::from_pixel(100, 100, Luma([128]));
        assert!(detect_circles(&img, &CircleDetectionConfig::default()).is_empty());
    }

    #[test]
    fn sub_pixel_accumulator_is_refused() {
        let img = disc_image(160, 120, &[((80, 60), 20)]);
        let config = CircleDetectionConfig {
            dp: 1e-6,
            ..Default::default()
        };
        assert!(detect_circles(&img, &config).is_empty());
    }

    #[test]
    fn disc_outside_radius_window_is_ignored() {
        let img = disc_image(200, 200, &[((100, 100), 60)]);
        let circles = detect_circles(&img, &CircleDetectionConfig::default());
        assert!(circles.iter().all(|c| c.radius <= 30.0));
        assert!(
            circles
                .iter()
                .all(|c| (c.x - 100.0).abs() > 5.0 || (c.y - 100.0).abs() > 5.0),
            "the 60 px disc must not be reported: {:?}",
            circles
        );
    }

    #[test]
    fn two_discs_largest_selected() {
        let img = disc_image(300, 200, &[((60, 60), 15), ((210, 120), 25)]);
        let circles = detect_circles(&img, &CircleDetectionConfig::default());
        assert_eq!(circles.len(), 2, "circles: {:?}", circles);

        let coin = select_coin(&circles).unwrap();
        assert!((coin.x - 210.0).abs() < 1.5);
        assert!((coin.radius - 25.0).abs() < 1.5);
    }
}
