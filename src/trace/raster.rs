use crate::error::DrawError;
use image::{GrayImage, Luma};
use std::path::Path;

pub const FOREGROUND: u8 = 255;
pub const BACKGROUND: u8 = 0;
pub const DEFAULT_THRESHOLD: u8 = 150;

/// Binary version of a grayscale image. Every pixel is either
/// [`FOREGROUND`] or [`BACKGROUND`].
#[derive(Debug, Clone, PartialEq)]
pub struct Silhouette {
    image: GrayImage,
}

impl Silhouette {
    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    pub fn is_foreground(&self, x: u32, y: u32) -> bool {
        self.image.get_pixel(x, y).0[0] == FOREGROUND
    }

    pub fn foreground_count(&self) -> usize {
        self.image
            .pixels()
            .filter(|p| p.0[0] == FOREGROUND)
            .count()
    }

    pub fn as_image(&self) -> &GrayImage {
        &self.image
    }
}

/// Hard threshold: a pixel is foreground iff its value is strictly above
/// `threshold`.
pub fn binarize(gray: &GrayImage, threshold: u8) -> Silhouette {
    let image = GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        if gray.get_pixel(x, y).0[0] > threshold {
            Luma([FOREGROUND])
        } else {
            Luma([BACKGROUND])
        }
    });
    Silhouette { image }
}

pub fn load_and_binarize(path: &Path, threshold: u8) -> Result<Silhouette, DrawError> {
    let load_error = |reason: String| DrawError::Load {
        path: path.to_path_buf(),
        reason,
    };

    if !path.is_file() {
        return Err(load_error("file does not exist".into()));
    }

    let decoded = image::open(path).map_err(|err| load_error(err.to_string()))?;
    let gray = decoded.to_luma8();
    if gray.width() == 0 || gray.height() == 0 {
        return Err(load_error("image has no pixels".into()));
    }

    tracing::debug!(
        path = %path.display(),
        width = gray.width(),
        height = gray.height(),
        threshold,
        "image loaded for tracing"
    );
    Ok(binarize(&gray, threshold))
}
