use image::GrayImage;
use imageproc::contours::{find_contours, Contour};
use imageproc::geometry::approximate_polygon_dp;
use imageproc::point::Point;

use crate::models::BoundingBox;

/// Find all contours in a binary edge image (non-zero pixels are foreground)
pub fn find_edge_contours(edges: &GrayImage) -> Vec<Contour<i32>> {
    find_contours::<i32>(edges)
}

/// Bounding box of the contour after polygon simplification
pub fn polygon_bounds(contour: &Contour<i32>, epsilon: f64) -> Option<BoundingBox> {
    if contour.points.len() < 3 {
        return BoundingBox::enclosing(contour.points.iter().map(|p| (p.x, p.y)));
    }
    let polygon = simplify_closed(&contour.points, epsilon);
    BoundingBox::enclosing(polygon.iter().map(|p| (p.x, p.y)))
}

/// Douglas-Peucker on a closed curve. The curve is cut at the point farthest
/// from the first one and both halves are simplified as open chains, so a
/// traced line keeps both of its ends.
fn simplify_closed(points: &[Point<i32>], epsilon: f64) -> Vec<Point<i32>> {
    let start = points[0];
    let far = points
        .iter()
        .enumerate()
        .max_by_key(|(_, p)| {
            let dx = (p.x - start.x) as i64;
            let dy = (p.y - start.y) as i64;
            dx * dx + dy * dy
        })
        .map_or(0, |(i, _)| i);
    if points[far] == start {
        return vec![start];
    }

    let mut polygon = approximate_polygon_dp(&points[..=far], epsilon, false);
    let mut back = points[far..].to_vec();
    back.push(start);
    // Both halves share the cut point and the start point
    polygon.pop();
    polygon.extend(approximate_polygon_dp(&back, epsilon, false));
    polygon.pop();
    polygon
}

/// Keep the box with the largest area. A later box must be strictly larger to
/// replace the current one, so the first of equal boxes wins.
pub fn largest_box<I>(boxes: I) -> Option<BoundingBox>
where
    I: IntoIterator<Item = BoundingBox>,
{
    let mut best: Option<BoundingBox> = None;
    for bbox in boxes {
        if bbox.area() > best.map_or(0, |b| b.area()) {
            best = Some(bbox);
        }
    }
    best
}

/// Rectangle of the largest closed outline in the edge map
pub fn find_foot_region(edges: &GrayImage, epsilon: f64) -> (Option<BoundingBox>, usize) {
    let contours = find_edge_contours(edges);
    let count = contours.len();
    let foot = largest_box(contours.iter().filter_map(|c| polygon_bounds(c, epsilon)));
    (foot, count)
}
