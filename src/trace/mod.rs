pub mod contour;
pub mod mapper;
pub mod model;
pub mod preview;
pub mod raster;

pub use mapper::{Region, RegionCorners};
pub use model::{Path, Point};

use crate::error::DrawError;
use mapper::{map_paths, SourceDimensions};

/// Rasterize, extract and map in one synchronous pass.
pub fn prepare_paths(
    image_path: &std::path::Path,
    threshold: u8,
    region: &Region,
) -> Result<Vec<Path>, DrawError> {
    let silhouette = raster::load_and_binarize(image_path, threshold)?;
    let (width, height) = silhouette.dimensions();
    let image_paths = contour::extract_paths(&silhouette);
    let screen_paths = map_paths(&image_paths, SourceDimensions::new(width, height), region);
    tracing::info!(
        paths = screen_paths.len(),
        drawable = screen_paths.iter().filter(|p| p.is_drawable()).count(),
        "stroke paths prepared"
    );
    Ok(screen_paths)
}
