use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Load,
    Capture,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corner {
    TopLeft,
    BottomRight,
}

impl std::fmt::Display for Corner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Corner::TopLeft => write!(f, "top-left"),
            Corner::BottomRight => write!(f, "bottom-right"),
        }
    }
}

/// Errors raised before a stroke replay starts. Once replay runs, failures
/// are reported through the session outcome instead.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawError {
    NoImageSelected,
    RegionNotSet,
    DegenerateRegion { width: f64, height: f64 },
    Load { path: PathBuf, reason: String },
    Capture { corner: Corner },
}

impl DrawError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DrawError::NoImageSelected
            | DrawError::RegionNotSet
            | DrawError::DegenerateRegion { .. } => ErrorKind::Configuration,
            DrawError::Load { .. } => ErrorKind::Load,
            DrawError::Capture { .. } => ErrorKind::Capture,
        }
    }
}

impl std::fmt::Display for DrawError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DrawError::NoImageSelected => write!(f, "no image selected"),
            DrawError::RegionNotSet => write!(f, "drawing region is not set"),
            DrawError::DegenerateRegion { width, height } => write!(
                f,
                "drawing region must have a positive size (got {width} x {height})"
            ),
            DrawError::Load { path, reason } => {
                write!(f, "failed to load image {}: {reason}", path.display())
            }
            DrawError::Capture { corner } => {
                write!(f, "failed to capture the {corner} coordinate")
            }
        }
    }
}

impl std::error::Error for DrawError {}
