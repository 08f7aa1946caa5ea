// src/processing/mod.rs
pub mod pipeline;
pub mod regionprops;

// Re-export main components
pub use pipeline::{run_job, BatchProcessor, Job};
pub use regionprops::{MeasureRequest, Property, PropertySet, RegionMeasurer, RegionProps};
