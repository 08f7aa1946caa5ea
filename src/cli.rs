use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::error::ResolveError;
use crate::io::Pairing;
use crate::processing::{Job, MeasureRequest, Property, PropertySet};

#[derive(Parser, Debug)]
#[command(name = "regionprops")]
#[command(about = "Region-property tables from label images", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Log debug messages
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Measure label images and write one CSV table per image
    Measure(MeasureArgs),

    /// Run the jobs listed in a JSON batch file
    Batch {
        /// Batch configuration file
        config: PathBuf,
    },

    /// List the supported property names
    Properties,
}

#[derive(Args, Debug)]
pub struct MeasureArgs {
    /// Label image, directory of label images, or .list file
    #[arg(value_name = "LABELS")]
    pub labels: PathBuf,

    /// Output CSV, directory for CSVs, or .list file
    #[arg(value_name = "REGIONS")]
    pub regions: PathBuf,

    /// Intensity image, directory of images, or .list file
    #[arg(short, long)]
    pub images: Option<PathBuf>,

    /// Property to include in the table (repeatable); `label` is always included
    #[arg(short = 'p', long = "property", value_name = "NAME")]
    pub properties: Vec<Property>,

    /// Match images to labels by file name
    #[arg(long, overrides_with = "alphabetically")]
    pub by_name: bool,

    /// Match images to labels by sorted position [default]
    #[arg(long, overrides_with = "by_name")]
    pub alphabetically: bool,

    /// Cache intermediate quantities per region [default]
    #[arg(long, overrides_with = "no_cache")]
    pub cache: bool,

    /// Recompute intermediate quantities on every use
    #[arg(long, overrides_with = "cache")]
    pub no_cache: bool,

    /// Pixel spacing along each axis, comma-separated
    #[arg(long, value_delimiter = ',', value_name = "SPACING")]
    pub spacing: Option<Vec<f64>>,

    /// Separator between property name and component index in column names
    #[arg(long, default_value = "-")]
    pub separator: String,
}

impl MeasureArgs {
    pub fn pairing(&self) -> Pairing {
        if self.by_name {
            Pairing::ByName
        } else {
            Pairing::Alphabetical
        }
    }

    pub fn to_job(&self) -> Job {
        Job {
            labels: self.labels.clone(),
            regions: self.regions.clone(),
            images: self.images.clone(),
            pairing: self.pairing(),
            request: MeasureRequest {
                properties: PropertySet::new(self.properties.iter().copied()),
                spacing: self.spacing.clone(),
                cache: !self.no_cache,
                separator: self.separator.clone(),
            },
        }
    }
}

/// Exit status of a failed run: 2 when the path arguments could not be
/// resolved or paired, 1 for everything else.
pub fn exit_status(err: &anyhow::Error) -> u8 {
    match parameter_error(err) {
        Some(_) => 2,
        None => 1,
    }
}

/// Message reported on stderr for a failed run.
pub fn error_message(err: &anyhow::Error) -> String {
    match parameter_error(err) {
        Some(param) => format!("Error: Invalid value: {param}"),
        None => format!("Error: {err:#}"),
    }
}

fn parameter_error(err: &anyhow::Error) -> Option<&ResolveError> {
    err.chain()
        .filter_map(|cause| cause.downcast_ref::<ResolveError>())
        .find(|resolve| resolve.is_parameter_error())
}
