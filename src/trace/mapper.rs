use crate::error::DrawError;
use crate::trace::model::{Path, Point};

/// Pixel size of the image the paths were traced from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceDimensions {
    pub width: u32,
    pub height: u32,
}

impl SourceDimensions {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Target rectangle on screen. Width and height are derived from the corners
/// and may be zero or negative.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Region {
    pub top_left: Point,
    pub bottom_right: Point,
}

impl Region {
    pub const fn new(top_left: Point, bottom_right: Point) -> Self {
        Self {
            top_left,
            bottom_right,
        }
    }

    pub fn width(&self) -> f64 {
        self.bottom_right.x - self.top_left.x
    }

    pub fn height(&self) -> f64 {
        self.bottom_right.y - self.top_left.y
    }

    pub fn center(&self) -> Point {
        Point::new(
            self.top_left.x + self.width() / 2.0,
            self.top_left.y + self.height() / 2.0,
        )
    }

    pub fn translate(&self, dx: f64, dy: f64) -> Self {
        Self::new(
            self.top_left.translate(dx, dy),
            self.bottom_right.translate(dx, dy),
        )
    }

    /// Rejects collapsed or inverted rectangles.
    pub fn validate(&self) -> Result<(), DrawError> {
        let (width, height) = (self.width(), self.height());
        if width > 0.0 && height > 0.0 {
            Ok(())
        } else {
            Err(DrawError::DegenerateRegion { width, height })
        }
    }
}

/// Corner picks as they come from the operator; either may still be unset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RegionCorners {
    pub top_left: Option<(i32, i32)>,
    pub bottom_right: Option<(i32, i32)>,
}

impl RegionCorners {
    pub fn resolve(&self) -> Result<Region, DrawError> {
        match (self.top_left, self.bottom_right) {
            (Some(top_left), Some(bottom_right)) => {
                Ok(Region::new(top_left.into(), bottom_right.into()))
            }
            _ => Err(DrawError::RegionNotSet),
        }
    }
}

pub fn map_point(point: Point, source: SourceDimensions, region: &Region) -> Point {
    Point::new(
        region.top_left.x + (point.x / f64::from(source.width)) * region.width(),
        region.top_left.y + (point.y / f64::from(source.height)) * region.height(),
    )
}

/// Independent per-axis rescale from image space into `region`.
pub fn map_paths(paths: &[Path], source: SourceDimensions, region: &Region) -> Vec<Path> {
    paths
        .iter()
        .map(|path| {
            path.points()
                .iter()
                .map(|&p| map_point(p, source, region))
                .collect()
        })
        .collect()
}
