// src/io/reader.rs
use std::path::Path;

use gdal::raster::{GdalDataType, GdalType};
use gdal::Dataset;
use ndarray::{Array3, ArrayD, Axis};
use tracing::debug;

use crate::error::ReadError;
use crate::image::{IntensityImage, LabelImage};

/// All bands of a raster, decoded to `T`, laid out as `(band, row, col)`.
pub struct Raster<T> {
    pub bands: Array3<T>,
    /// Whether the stored band type is an integer type.
    pub integer: bool,
}

impl<T> Raster<T> {
    pub fn band_count(&self) -> usize {
        self.bands.len_of(Axis(0))
    }
}

pub fn read_raster<T: GdalType + Copy>(path: &Path) -> Result<Raster<T>, ReadError> {
    let dataset = Dataset::open(path)?;
    let (width, height) = dataset.raster_size();
    let count = dataset.raster_count() as usize;
    if count == 0 {
        return Err(ReadError::NoBands(path.to_path_buf()));
    }

    let mut values = Vec::with_capacity(count * width * height);
    let mut integer = true;
    for index in 1..=count {
        let band = dataset.rasterband(index)?;
        if matches!(band.band_type(), GdalDataType::Float32 | GdalDataType::Float64) {
            integer = false;
        }
        let buffer = band.read_as::<T>((0, 0), (width, height), (width, height), None)?;
        values.extend_from_slice(buffer.data());
    }
    debug!(path = %path.display(), width, height, bands = count, "decoded raster");

    Ok(Raster {
        bands: Array3::from_shape_vec((count, height, width), values)?,
        integer,
    })
}

/// Reads a label image. One band gives a 2D image, several bands a 3D stack
/// with the band as the first axis.
pub fn read_labels(path: &Path) -> Result<LabelImage, ReadError> {
    let raster = read_raster::<i64>(path)?;
    if !raster.integer {
        return Err(ReadError::NonIntegerLabels(path.to_path_buf()));
    }
    Ok(LabelImage::from_array(squeeze_bands(raster.bands)))
}

/// Reads an intensity image to lay over labels of `label_shape`.
///
/// A multi-band raster over 2D labels is a multichannel image, so its bands
/// move to a trailing channel axis. Over 3D labels the bands are planes.
pub fn read_intensity(path: &Path, label_shape: &[usize]) -> Result<IntensityImage, ReadError> {
    let raster = read_raster::<f64>(path)?;
    let integer = raster.integer;
    let image = if label_shape.len() == 2 && raster.band_count() > 1 {
        let mut bands = raster.bands;
        bands.swap_axes(0, 1);
        bands.swap_axes(1, 2);
        bands.into_dyn()
    } else {
        squeeze_bands(raster.bands)
    };
    Ok(IntensityImage::from_array(image).integer_valued(integer))
}

fn squeeze_bands<T>(bands: Array3<T>) -> ArrayD<T> {
    if bands.len_of(Axis(0)) == 1 {
        bands.index_axis_move(Axis(0), 0).into_dyn()
    } else {
        bands.into_dyn()
    }
}
