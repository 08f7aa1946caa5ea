// src/processing/regionprops/region.rs
use std::rc::Rc;

use ndarray::Array2;

use super::inertia;
use crate::image::{unravel_index, IntensityImage};
use crate::utils::cache::Memo;

/// One labeled region and the intermediate quantities its properties share.
///
/// Every intermediate goes through a [`Memo`], so whether it is kept around
/// between properties depends only on the cache flag the region was built
/// with.
pub struct Region<'a> {
    label: i64,
    offsets: Vec<usize>,
    shape: &'a [usize],
    spacing: &'a [f64],
    intensity: Option<&'a IntensityImage>,
    channel_axis: Option<usize>,
    coords: Memo<Vec<usize>>,
    bbox: Memo<Vec<usize>>,
    centroid: Memo<Vec<f64>>,
    covariance: Memo<Array2<f64>>,
    inertia_tensor: Memo<Array2<f64>>,
    eigvals: Memo<Vec<f64>>,
    samples: Memo<Array2<f64>>,
}

impl<'a> Region<'a> {
    pub fn new(
        label: i64,
        offsets: Vec<usize>,
        shape: &'a [usize],
        spacing: &'a [f64],
        intensity: Option<(&'a IntensityImage, Option<usize>)>,
        cache: bool,
    ) -> Self {
        Self {
            label,
            offsets,
            shape,
            spacing,
            intensity: intensity.map(|(image, _)| image),
            channel_axis: intensity.and_then(|(_, channels)| channels),
            coords: Memo::new(cache),
            bbox: Memo::new(cache),
            centroid: Memo::new(cache),
            covariance: Memo::new(cache),
            inertia_tensor: Memo::new(cache),
            eigvals: Memo::new(cache),
            samples: Memo::new(cache),
        }
    }

    pub fn label(&self) -> i64 {
        self.label
    }

    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    pub fn num_pixels(&self) -> usize {
        self.offsets.len()
    }

    pub fn spacing(&self) -> &[f64] {
        self.spacing
    }

    pub fn pixel_volume(&self) -> f64 {
        self.spacing.iter().product()
    }

    /// Pixel indices, `num_pixels * ndim` values, one row per pixel.
    pub fn coords(&self) -> Rc<Vec<usize>> {
        self.coords.get_or_compute(|| {
            let ndim = self.ndim();
            let mut coords = vec![0; self.offsets.len() * ndim];
            for (pixel, &offset) in coords.chunks_exact_mut(ndim).zip(&self.offsets) {
                unravel_index(offset, self.shape, pixel);
            }
            coords
        })
    }

    /// `[min_0, .., min_n, max_0 + 1, .., max_n + 1]` in pixel indices.
    pub fn bbox(&self) -> Rc<Vec<usize>> {
        self.bbox.get_or_compute(|| {
            let ndim = self.ndim();
            let mut bbox = vec![usize::MAX; ndim];
            bbox.extend(std::iter::repeat(0).take(ndim));
            for pixel in self.coords().chunks_exact(ndim) {
                for (axis, &index) in pixel.iter().enumerate() {
                    bbox[axis] = bbox[axis].min(index);
                    bbox[ndim + axis] = bbox[ndim + axis].max(index + 1);
                }
            }
            bbox
        })
    }

    /// Mean pixel coordinate in physical units.
    pub fn centroid(&self) -> Rc<Vec<f64>> {
        self.centroid.get_or_compute(|| {
            let ndim = self.ndim();
            let mut sums = vec![0.0; ndim];
            for pixel in self.coords().chunks_exact(ndim) {
                for (axis, &index) in pixel.iter().enumerate() {
                    sums[axis] += index as f64 * self.spacing[axis];
                }
            }
            let count = self.num_pixels() as f64;
            sums.into_iter().map(|sum| sum / count).collect()
        })
    }

    /// Population covariance of the physical pixel coordinates.
    pub fn covariance(&self) -> Rc<Array2<f64>> {
        self.covariance.get_or_compute(|| {
            let ndim = self.ndim();
            let centroid = self.centroid();
            let mut covariance = Array2::<f64>::zeros((ndim, ndim));
            let mut delta = vec![0.0; ndim];
            for pixel in self.coords().chunks_exact(ndim) {
                for axis in 0..ndim {
                    delta[axis] = pixel[axis] as f64 * self.spacing[axis] - centroid[axis];
                }
                for i in 0..ndim {
                    for j in 0..ndim {
                        covariance[[i, j]] += delta[i] * delta[j];
                    }
                }
            }
            covariance / self.num_pixels() as f64
        })
    }

    pub fn inertia_tensor(&self) -> Rc<Array2<f64>> {
        self.inertia_tensor
            .get_or_compute(|| inertia::inertia_tensor(&self.covariance()))
    }

    pub fn inertia_tensor_eigvals(&self) -> Rc<Vec<f64>> {
        self.eigvals
            .get_or_compute(|| inertia::eigvals_symmetric(&self.inertia_tensor()))
    }

    /// Binary mask of the region cropped to its bounding box (2D only).
    pub fn mask_2d(&self) -> Array2<bool> {
        let bbox = self.bbox();
        let (rows, cols) = (bbox[2] - bbox[0], bbox[3] - bbox[1]);
        let mut mask = Array2::from_elem((rows, cols), false);
        for pixel in self.coords().chunks_exact(2) {
            mask[[pixel[0] - bbox[0], pixel[1] - bbox[1]]] = true;
        }
        mask
    }

    /// Intensity values of the region's pixels, one row per pixel and one
    /// column per channel. `None` without an intensity image.
    pub fn intensity_samples(&self) -> Option<Rc<Array2<f64>>> {
        let image = self.intensity?;
        let channels = self.channels();
        Some(self.samples.get_or_compute(|| {
            let values = image.values();
            Array2::from_shape_fn((self.num_pixels(), channels), |(pixel, channel)| {
                values[self.offsets[pixel] * channels + channel]
            })
        }))
    }

    pub fn integer_intensity(&self) -> bool {
        self.intensity.is_some_and(IntensityImage::is_integer)
    }

    pub fn channels(&self) -> usize {
        self.channel_axis.unwrap_or(1)
    }

    /// Whether the intensity image carries a trailing channel axis, even one
    /// of length 1.
    pub fn has_channel_axis(&self) -> bool {
        self.channel_axis.is_some()
    }
}
