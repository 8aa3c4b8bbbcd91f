use crate::error::DrawError;
use crate::trace::contour::edge_map;
use crate::trace::raster::load_and_binarize;
use anyhow::{Context, Result};
use chrono::Local;
use image::GrayImage;
use std::path::{Path, PathBuf};

/// The edge map drawing would trace, for display before drawing.
pub fn preview_edges(image_path: &Path, threshold: u8) -> Result<GrayImage, DrawError> {
    let silhouette = load_and_binarize(image_path, threshold)?;
    Ok(edge_map(&silhouette))
}

pub fn default_preview_filename(now: chrono::DateTime<Local>) -> String {
    format!("preview_{}.png", now.format("%Y%m%d_%H%M%S"))
}

pub fn save_preview(edges: &GrayImage, path: &Path) -> Result<PathBuf> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create preview folder {}", parent.display()))?;
    }
    edges
        .save_with_format(path, image::ImageFormat::Png)
        .with_context(|| format!("write preview image {}", path.display()))?;
    Ok(path.to_path_buf())
}
