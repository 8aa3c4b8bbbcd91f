use crate::trace::model::{Path, Point};
use crate::trace::raster::Silhouette;
use image::GrayImage;

pub const CANNY_LOW_THRESHOLD: f32 = 50.0;
pub const CANNY_HIGH_THRESHOLD: f32 = 150.0;

/// Hysteresis edge detection over the silhouette. Edge pixels are 255.
pub fn edge_map(silhouette: &Silhouette) -> GrayImage {
    imageproc::edges::canny(
        silhouette.as_image(),
        CANNY_LOW_THRESHOLD,
        CANNY_HIGH_THRESHOLD,
    )
}

/// Every border in the edge map (outer and hole alike) as a simplified
/// polyline in image space.
pub fn extract_paths(silhouette: &Silhouette) -> Vec<Path> {
    trace_edges(&edge_map(silhouette))
}

pub fn trace_edges(edges: &GrayImage) -> Vec<Path> {
    let contours: Vec<imageproc::contours::Contour<i32>> =
        imageproc::contours::find_contours(edges);

    let paths: Vec<Path> = contours
        .into_iter()
        .filter(|c| !c.points.is_empty())
        .map(|c| {
            let raw: Vec<(i32, i32)> = c.points.iter().map(|p| (p.x, p.y)).collect();
            compress_collinear(&raw)
                .into_iter()
                .map(|(x, y)| Point::new(f64::from(x), f64::from(y)))
                .collect()
        })
        .collect();

    tracing::debug!(paths = paths.len(), "edge contours traced");
    paths
}

fn step(from: (i32, i32), to: (i32, i32)) -> (i32, i32) {
    ((to.0 - from.0).signum(), (to.1 - from.1).signum())
}

/// Drops points that sit in the middle of a straight horizontal, vertical or
/// diagonal run. The contour is treated as a closed loop; its first point is
/// always kept.
pub fn compress_collinear(points: &[(i32, i32)]) -> Vec<(i32, i32)> {
    let n = points.len();
    if n < 3 {
        return points.to_vec();
    }

    (0..n)
        .filter(|&i| {
            if i == 0 {
                return true;
            }
            let prev = points[i - 1];
            let cur = points[i];
            let next = points[(i + 1) % n];
            step(prev, cur) != step(cur, next)
        })
        .map(|i| points[i])
        .collect()
}
