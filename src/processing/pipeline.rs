// src/processing/pipeline.rs
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

use crate::io::{pair_files, read_intensity, read_labels, write_table_file, FileTriple, Pairing};
use crate::processing::regionprops::{MeasureRequest, PropertyTable, RegionMeasurer, RegionProps};

/// One `measure` invocation: three path arguments plus measurement options.
#[derive(Debug, Clone, PartialEq)]
pub struct Job {
    pub labels: PathBuf,
    pub regions: PathBuf,
    pub images: Option<PathBuf>,
    pub pairing: Pairing,
    pub request: MeasureRequest,
}

impl Job {
    pub fn triples(&self) -> Result<Vec<FileTriple>> {
        Ok(pair_files(
            &self.labels,
            &self.regions,
            self.images.as_deref(),
            self.pairing,
        )?)
    }
}

/// Runs the read-measure-write loop over file triples, one at a time.
pub struct BatchProcessor<M: RegionMeasurer = RegionProps> {
    measurer: M,
    request: MeasureRequest,
}

impl BatchProcessor<RegionProps> {
    pub fn new(request: MeasureRequest) -> Self {
        Self::with_measurer(RegionProps::new(), request)
    }
}

impl<M: RegionMeasurer> BatchProcessor<M> {
    pub fn with_measurer(measurer: M, request: MeasureRequest) -> Self {
        Self { measurer, request }
    }

    /// Processes every triple in order and returns the written CSV paths.
    /// The first failure aborts the run.
    pub fn process(&self, triples: &[FileTriple]) -> Result<Vec<PathBuf>> {
        let mut written = Vec::with_capacity(triples.len());
        for (i, triple) in triples.iter().enumerate() {
            info!(
                "[{}/{}] {} -> {}",
                i + 1,
                triples.len(),
                triple.labels.display(),
                triple.regions.display()
            );
            self.process_triple(triple)?;
            println!("{}", triple.regions.display());
            written.push(triple.regions.clone());
        }
        Ok(written)
    }

    pub fn process_triple(&self, triple: &FileTriple) -> Result<()> {
        let table = self.measure_files(&triple.labels, triple.image.as_deref())?;
        write_table_file(&table, &triple.regions)
    }

    /// Decodes one label file (and its intensity image) and measures it.
    pub fn measure_files(&self, labels_path: &Path, image_path: Option<&Path>) -> Result<PropertyTable> {
        let labels = read_labels(labels_path)
            .with_context(|| format!("Failed to read labels {}", labels_path.display()))?;
        let image = image_path
            .map(|path| {
                read_intensity(path, labels.shape())
                    .with_context(|| format!("Failed to read image {}", path.display()))
            })
            .transpose()?;

        let table = self
            .measurer
            .measure(&labels, image.as_ref(), &self.request)
            .with_context(|| {
                format!(
                    "{} failed on {}",
                    self.measurer.name(),
                    labels_path.display()
                )
            })?;
        info!(regions = table.len(), "measured {}", labels_path.display());
        Ok(table)
    }
}

/// Resolves a job's files and processes them.
pub fn run_job(job: &Job) -> Result<Vec<PathBuf>> {
    let triples = job.triples()?;
    info!(
        files = triples.len(),
        properties = job.request.properties.len(),
        cache = job.request.cache,
        "starting"
    );
    BatchProcessor::new(job.request.clone()).process(&triples)
}
