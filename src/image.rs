// src/image.rs
use std::collections::BTreeMap;

use ndarray::{ArrayD, IxDyn, ShapeError};

use crate::error::MeasureError;

/// Integer label array. Pixels with a value `<= 0` are background.
///
/// Pixels are stored in row-major order so a region can be described by the
/// flat offsets of its pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelImage {
    shape: Vec<usize>,
    values: Vec<i64>,
}

impl LabelImage {
    pub fn from_array(array: ArrayD<i64>) -> Self {
        Self {
            shape: array.shape().to_vec(),
            values: array.iter().copied().collect(),
        }
    }

    pub fn from_shape_vec(shape: &[usize], values: Vec<i64>) -> Result<Self, ShapeError> {
        let array = ArrayD::from_shape_vec(IxDyn(shape), values)?;
        Ok(Self::from_array(array))
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    pub fn values(&self) -> &[i64] {
        &self.values
    }

    /// Flat pixel offsets of every foreground label, ordered by label.
    pub fn regions(&self) -> BTreeMap<i64, Vec<usize>> {
        let mut regions: BTreeMap<i64, Vec<usize>> = BTreeMap::new();
        for (offset, &label) in self.values.iter().enumerate() {
            if label > 0 {
                regions.entry(label).or_default().push(offset);
            }
        }
        regions
    }
}

/// Per-pixel values aligned with a label image.
///
/// The array either has exactly the label image's shape, or the label shape
/// followed by a trailing channel axis.
#[derive(Debug, Clone, PartialEq)]
pub struct IntensityImage {
    shape: Vec<usize>,
    values: Vec<f64>,
    integer: bool,
}

impl IntensityImage {
    pub fn from_array(array: ArrayD<f64>) -> Self {
        Self {
            shape: array.shape().to_vec(),
            values: array.iter().copied().collect(),
            integer: false,
        }
    }

    /// Marks the values as coming from an integer raster.
    pub fn integer_valued(mut self, integer: bool) -> Self {
        self.integer = integer;
        self
    }

    pub fn is_integer(&self) -> bool {
        self.integer
    }

    pub fn from_shape_vec(shape: &[usize], values: Vec<f64>) -> Result<Self, ShapeError> {
        let array = ArrayD::from_shape_vec(IxDyn(shape), values)?;
        Ok(Self::from_array(array))
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Number of channels when laid over `label_shape`: `None` for a
    /// single-channel image of identical shape, `Some(c)` for a trailing
    /// channel axis of length `c`.
    pub fn channels_for(&self, label_shape: &[usize]) -> Result<Option<usize>, MeasureError> {
        if self.shape == label_shape {
            return Ok(None);
        }
        if self.shape.len() == label_shape.len() + 1 && self.shape.starts_with(label_shape) {
            return Ok(self.shape.last().copied());
        }
        Err(MeasureError::ShapeMismatch {
            labels: label_shape.to_vec(),
            intensity: self.shape.clone(),
        })
    }
}

/// Converts a flat row-major offset into per-axis indices.
pub fn unravel_index(mut offset: usize, shape: &[usize], out: &mut [usize]) {
    for axis in (0..shape.len()).rev() {
        out[axis] = offset % shape[axis];
        offset /= shape[axis];
    }
}
