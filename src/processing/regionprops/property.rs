// src/processing/regionprops/property.rs
use std::fmt;
use std::str::FromStr;

use itertools::Itertools;

use crate::error::MeasureError;

/// A measurable region property.
///
/// Definitions follow the conventions of scikit-image's `regionprops`, so
/// tables produced here line up column-for-column with tables produced there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Property {
    Label,
    NumPixels,
    Area,
    Bbox,
    AreaBbox,
    Extent,
    Centroid,
    CentroidLocal,
    EquivalentDiameterArea,
    InertiaTensor,
    InertiaTensorEigvals,
    AxisMajorLength,
    AxisMinorLength,
    Eccentricity,
    Orientation,
    Perimeter,
    IntensityMean,
    IntensityMin,
    IntensityMax,
    IntensityStd,
    CentroidWeighted,
}

impl Property {
    pub const ALL: [Property; 21] = [
        Property::Label,
        Property::NumPixels,
        Property::Area,
        Property::Bbox,
        Property::AreaBbox,
        Property::Extent,
        Property::Centroid,
        Property::CentroidLocal,
        Property::EquivalentDiameterArea,
        Property::InertiaTensor,
        Property::InertiaTensorEigvals,
        Property::AxisMajorLength,
        Property::AxisMinorLength,
        Property::Eccentricity,
        Property::Orientation,
        Property::Perimeter,
        Property::IntensityMean,
        Property::IntensityMin,
        Property::IntensityMax,
        Property::IntensityStd,
        Property::CentroidWeighted,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Property::Label => "label",
            Property::NumPixels => "num_pixels",
            Property::Area => "area",
            Property::Bbox => "bbox",
            Property::AreaBbox => "area_bbox",
            Property::Extent => "extent",
            Property::Centroid => "centroid",
            Property::CentroidLocal => "centroid_local",
            Property::EquivalentDiameterArea => "equivalent_diameter_area",
            Property::InertiaTensor => "inertia_tensor",
            Property::InertiaTensorEigvals => "inertia_tensor_eigvals",
            Property::AxisMajorLength => "axis_major_length",
            Property::AxisMinorLength => "axis_minor_length",
            Property::Eccentricity => "eccentricity",
            Property::Orientation => "orientation",
            Property::Perimeter => "perimeter",
            Property::IntensityMean => "intensity_mean",
            Property::IntensityMin => "intensity_min",
            Property::IntensityMax => "intensity_max",
            Property::IntensityStd => "intensity_std",
            Property::CentroidWeighted => "centroid_weighted",
        }
    }

    /// Older spellings still accepted on input.
    fn from_alias(name: &str) -> Option<Self> {
        let property = match name {
            "bbox_area" => Property::AreaBbox,
            "equivalent_diameter" => Property::EquivalentDiameterArea,
            "major_axis_length" => Property::AxisMajorLength,
            "minor_axis_length" => Property::AxisMinorLength,
            "mean_intensity" => Property::IntensityMean,
            "min_intensity" => Property::IntensityMin,
            "max_intensity" => Property::IntensityMax,
            "weighted_centroid" => Property::CentroidWeighted,
            _ => return None,
        };
        Some(property)
    }

    pub fn needs_intensity(self) -> bool {
        matches!(
            self,
            Property::IntensityMean
                | Property::IntensityMin
                | Property::IntensityMax
                | Property::IntensityStd
                | Property::CentroidWeighted
        )
    }

    pub fn only_2d(self) -> bool {
        matches!(
            self,
            Property::Eccentricity | Property::Orientation | Property::Perimeter
        )
    }

    /// Shape of one region's value. An empty shape is a scalar.
    pub fn value_shape(self, ndim: usize, channels: Option<usize>) -> Vec<usize> {
        match self {
            Property::Label
            | Property::NumPixels
            | Property::Area
            | Property::AreaBbox
            | Property::Extent
            | Property::EquivalentDiameterArea
            | Property::AxisMajorLength
            | Property::AxisMinorLength
            | Property::Eccentricity
            | Property::Orientation
            | Property::Perimeter => vec![],
            Property::Bbox => vec![2 * ndim],
            Property::Centroid | Property::CentroidLocal | Property::InertiaTensorEigvals => {
                vec![ndim]
            }
            Property::InertiaTensor => vec![ndim, ndim],
            Property::IntensityMean
            | Property::IntensityMin
            | Property::IntensityMax
            | Property::IntensityStd => channels.into_iter().collect(),
            Property::CentroidWeighted => std::iter::once(ndim).chain(channels).collect(),
        }
    }

    /// Column names, one per value component, in row-major order.
    pub fn columns(self, ndim: usize, channels: Option<usize>, separator: &str) -> Vec<String> {
        let shape = self.value_shape(ndim, channels);
        if shape.is_empty() {
            return vec![self.name().to_string()];
        }
        shape
            .iter()
            .map(|&len| 0..len)
            .multi_cartesian_product()
            .map(|index| {
                let suffix = index.iter().join(separator);
                format!("{}{}{}", self.name(), separator, suffix)
            })
            .collect()
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Property {
    type Err = MeasureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        Property::ALL
            .iter()
            .copied()
            .find(|property| property.name() == name)
            .or_else(|| Property::from_alias(name))
            .ok_or_else(|| MeasureError::UnknownProperty(name.to_string()))
    }
}

/// Ordered, duplicate-free list of properties to measure, `label` first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertySet(Vec<Property>);

impl PropertySet {
    /// An empty request yields the default `label, bbox`.
    pub fn new<I>(requested: I) -> Self
    where
        I: IntoIterator<Item = Property>,
    {
        let requested: Vec<Property> = requested.into_iter().collect();
        if requested.is_empty() {
            return Self::default();
        }
        let properties = std::iter::once(Property::Label)
            .chain(requested)
            .unique()
            .collect();
        Self(properties)
    }

    pub fn parse<S: AsRef<str>>(names: &[S]) -> Result<Self, MeasureError> {
        let properties = names
            .iter()
            .map(|name| name.as_ref().parse())
            .collect::<Result<Vec<Property>, _>>()?;
        Ok(Self::new(properties))
    }

    pub fn iter(&self) -> impl Iterator<Item = Property> + '_ {
        self.as_slice().iter().copied()
    }

    pub fn as_slice(&self) -> &[Property] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for PropertySet {
    fn default() -> Self {
        Self(vec![Property::Label, Property::Bbox])
    }
}
