// src/processing/regionprops/mod.rs
pub mod inertia;
pub mod perimeter;
pub mod property;
pub mod region;
pub mod table;

pub use property::{Property, PropertySet};
pub use region::Region;
pub use table::{Cell, PropertyTable, PropertyValue};

use tracing::{debug, warn};

use crate::error::MeasureError;
use crate::image::{IntensityImage, LabelImage};

/// Everything a measurer needs besides the images themselves.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasureRequest {
    pub properties: PropertySet,
    /// Physical pixel size along each axis; unit spacing when `None`.
    pub spacing: Option<Vec<f64>>,
    /// Memoize per-region intermediates. Never changes results.
    pub cache: bool,
    /// Joins property names and component indices in column names.
    pub separator: String,
}

impl Default for MeasureRequest {
    fn default() -> Self {
        Self {
            properties: PropertySet::default(),
            spacing: None,
            cache: true,
            separator: "-".to_string(),
        }
    }
}

/// Turns a label image (and optional intensity image) into a property table.
pub trait RegionMeasurer {
    fn measure(
        &self,
        labels: &LabelImage,
        intensity: Option<&IntensityImage>,
        request: &MeasureRequest,
    ) -> Result<PropertyTable, MeasureError>;

    fn name(&self) -> &str;
}

/// Built-in measurer for the properties listed in [`Property::ALL`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RegionProps;

impl RegionProps {
    pub fn new() -> Self {
        Self
    }
}

impl RegionMeasurer for RegionProps {
    fn measure(
        &self,
        labels: &LabelImage,
        intensity: Option<&IntensityImage>,
        request: &MeasureRequest,
    ) -> Result<PropertyTable, MeasureError> {
        let ndim = labels.ndim();
        if !(2..=3).contains(&ndim) {
            return Err(MeasureError::UnsupportedDimensionality(ndim));
        }

        let spacing = match &request.spacing {
            Some(spacing) if spacing.len() != ndim => {
                return Err(MeasureError::SpacingMismatch {
                    expected: ndim,
                    got: spacing.len(),
                })
            }
            Some(spacing) => spacing.clone(),
            None => vec![1.0; ndim],
        };

        let intensity = match intensity {
            Some(image) => Some((image, image.channels_for(labels.shape())?)),
            None => None,
        };
        let channels = intensity.and_then(|(_, channels)| channels);

        for property in request.properties.iter() {
            validate(property, ndim, &spacing, intensity.is_some())?;
        }

        let columns = request
            .properties
            .iter()
            .flat_map(|property| property.columns(ndim, channels, &request.separator))
            .collect();
        let mut table = PropertyTable::new(columns);

        let regions = labels.regions();
        if regions.is_empty() {
            warn!(shape = ?labels.shape(), "label image has no foreground regions");
        }
        debug!(
            regions = regions.len(),
            columns = table.columns().len(),
            cache = request.cache,
            "measuring regions"
        );

        for (label, offsets) in regions {
            let region = Region::new(
                label,
                offsets,
                labels.shape(),
                &spacing,
                intensity,
                request.cache,
            );
            let row = request
                .properties
                .iter()
                .flat_map(|property| compute(property, &region).into_cells())
                .collect();
            table.push_row(row);
        }

        Ok(table)
    }

    fn name(&self) -> &str {
        "regionprops"
    }
}

fn validate(
    property: Property,
    ndim: usize,
    spacing: &[f64],
    has_intensity: bool,
) -> Result<(), MeasureError> {
    if property.needs_intensity() && !has_intensity {
        return Err(MeasureError::MissingIntensity(property.name()));
    }
    if property.only_2d() && ndim != 2 {
        return Err(MeasureError::Requires2d(property.name()));
    }
    if property == Property::Perimeter && spacing.iter().any(|&s| s != spacing[0]) {
        return Err(MeasureError::AnisotropicSpacing(property.name()));
    }
    Ok(())
}

/// Computes one property. Preconditions were checked by `validate`.
pub fn compute(property: Property, region: &Region<'_>) -> PropertyValue {
    match property {
        Property::Label => PropertyValue::Int(region.label()),
        Property::NumPixels => PropertyValue::Int(region.num_pixels() as i64),
        Property::Area => PropertyValue::Float(area(region)),
        Property::Bbox => {
            PropertyValue::Ints(region.bbox().iter().map(|&index| index as i64).collect())
        }
        Property::AreaBbox => PropertyValue::Float(area_bbox(region)),
        Property::Extent => PropertyValue::Float(area(region) / area_bbox(region)),
        Property::Centroid => PropertyValue::Floats(region.centroid().to_vec()),
        Property::CentroidLocal => {
            let bbox = region.bbox();
            let local = region
                .centroid()
                .iter()
                .zip(region.spacing())
                .enumerate()
                .map(|(axis, (centroid, spacing))| centroid - bbox[axis] as f64 * spacing)
                .collect();
            PropertyValue::Floats(local)
        }
        Property::EquivalentDiameterArea => {
            let ndim = region.ndim() as f64;
            let diameter = (2.0 * ndim * area(region) / std::f64::consts::PI).powf(1.0 / ndim);
            PropertyValue::Float(diameter)
        }
        Property::InertiaTensor => {
            PropertyValue::Floats(region.inertia_tensor().iter().copied().collect())
        }
        Property::InertiaTensorEigvals => {
            PropertyValue::Floats(region.inertia_tensor_eigvals().to_vec())
        }
        Property::AxisMajorLength => {
            PropertyValue::Float(inertia::axis_major_length(&region.inertia_tensor_eigvals()))
        }
        Property::AxisMinorLength => {
            PropertyValue::Float(inertia::axis_minor_length(&region.inertia_tensor_eigvals()))
        }
        Property::Eccentricity => {
            PropertyValue::Float(inertia::eccentricity(&region.inertia_tensor_eigvals()))
        }
        Property::Orientation => PropertyValue::Float(inertia::orientation(&region.inertia_tensor())),
        Property::Perimeter => {
            let scale = region.spacing()[0];
            PropertyValue::Float(perimeter::perimeter(&region.mask_2d()) * scale)
        }
        Property::IntensityMean => intensity_stat(region, |column| {
            column.iter().sum::<f64>() / column.len() as f64
        }),
        Property::IntensityMin => keep_integer(
            region,
            intensity_stat(region, |column| column.iter().copied().fold(f64::INFINITY, f64::min)),
        ),
        Property::IntensityMax => keep_integer(
            region,
            intensity_stat(region, |column| {
                column.iter().copied().fold(f64::NEG_INFINITY, f64::max)
            }),
        ),
        Property::IntensityStd => intensity_stat(region, |column| {
            let n = column.len() as f64;
            let mean = column.iter().sum::<f64>() / n;
            (column.iter().map(|value| (value - mean).powi(2)).sum::<f64>() / n).sqrt()
        }),
        Property::CentroidWeighted => centroid_weighted(region),
    }
}

fn area(region: &Region<'_>) -> f64 {
    region.num_pixels() as f64 * region.pixel_volume()
}

fn area_bbox(region: &Region<'_>) -> f64 {
    let bbox = region.bbox();
    let ndim = region.ndim();
    let pixels: usize = (0..ndim).map(|axis| bbox[ndim + axis] - bbox[axis]).product();
    pixels as f64 * region.pixel_volume()
}

/// Applies `stat` to every intensity channel. Single-channel images yield a
/// scalar, multi-channel images one value per channel.
fn intensity_stat<F>(region: &Region<'_>, stat: F) -> PropertyValue
where
    F: Fn(ndarray::ArrayView1<'_, f64>) -> f64,
{
    let Some(samples) = region.intensity_samples() else {
        return PropertyValue::Float(f64::NAN);
    };
    let values: Vec<f64> = samples.columns().into_iter().map(&stat).collect();
    match values.as_slice() {
        [value] if !region.has_channel_axis() => PropertyValue::Float(*value),
        _ => PropertyValue::Floats(values),
    }
}

/// Extremes of an integer intensity image are themselves integers.
fn keep_integer(region: &Region<'_>, value: PropertyValue) -> PropertyValue {
    if !region.integer_intensity() {
        return value;
    }
    match value {
        PropertyValue::Float(value) => PropertyValue::Int(value as i64),
        PropertyValue::Floats(values) => {
            PropertyValue::Ints(values.into_iter().map(|value| value as i64).collect())
        }
        other => other,
    }
}

fn centroid_weighted(region: &Region<'_>) -> PropertyValue {
    let ndim = region.ndim();
    let Some(samples) = region.intensity_samples() else {
        return PropertyValue::Floats(vec![f64::NAN; ndim]);
    };
    let channels = region.channels();
    let coords = region.coords();
    let spacing = region.spacing();

    let mut weighted = vec![0.0; ndim * channels];
    let mut totals = vec![0.0; channels];
    for (pixel, weights) in coords.chunks_exact(ndim).zip(samples.rows()) {
        for (channel, &weight) in weights.iter().enumerate() {
            totals[channel] += weight;
            for axis in 0..ndim {
                weighted[axis * channels + channel] += weight * pixel[axis] as f64 * spacing[axis];
            }
        }
    }
    let values = weighted
        .iter()
        .enumerate()
        .map(|(index, sum)| sum / totals[index % channels])
        .collect();
    PropertyValue::Floats(values)
}
