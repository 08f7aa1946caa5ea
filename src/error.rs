// src/error.rs
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while turning path arguments into file triples.
///
/// Apart from `Io`, these are parameter errors: the user passed arguments
/// that cannot be resolved or paired, and nothing has been read yet.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Not a file or directory: {}", .0.display())]
    NotFileOrDirectory(PathBuf),

    #[error("Number of image files does not match number of labels files ({images} != {labels})")]
    ImageCountMismatch { labels: usize, images: usize },

    #[error("Number of region files does not match number of labels files ({regions} != {labels})")]
    RegionCountMismatch { labels: usize, regions: usize },

    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ResolveError {
    /// Whether the arguments themselves are wrong, as opposed to a listing
    /// or list file that exists but cannot be read.
    pub fn is_parameter_error(&self) -> bool {
        !matches!(self, ResolveError::Io { .. })
    }
}

/// Errors raised while decoding a raster into a label or intensity image.
#[derive(Debug, Error)]
pub enum ReadError {
    #[error(transparent)]
    Gdal(#[from] gdal::errors::GdalError),

    #[error("Label image {} has floating-point pixels; labels must be integers", .0.display())]
    NonIntegerLabels(PathBuf),

    #[error("Raster {} has no bands", .0.display())]
    NoBands(PathBuf),

    #[error("Unexpected raster layout: {0}")]
    Shape(#[from] ndarray::ShapeError),
}

/// Errors raised by a region measurer.
#[derive(Debug, Error)]
pub enum MeasureError {
    #[error("Unknown property: {0}")]
    UnknownProperty(String),

    #[error("Label images must be 2D or 3D, got {0}D")]
    UnsupportedDimensionality(usize),

    #[error("Spacing has {got} values but the image has {expected} dimensions")]
    SpacingMismatch { expected: usize, got: usize },

    #[error("Intensity image shape {intensity:?} does not match label image shape {labels:?}")]
    ShapeMismatch {
        labels: Vec<usize>,
        intensity: Vec<usize>,
    },

    #[error("Property `{0}` requires an intensity image")]
    MissingIntensity(&'static str),

    #[error("Property `{0}` is only available for 2D images")]
    Requires2d(&'static str),

    #[error("Property `{0}` does not support anisotropic spacing")]
    AnisotropicSpacing(&'static str),
}
