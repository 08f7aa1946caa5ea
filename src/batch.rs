// src/batch.rs
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::io::Pairing;
use crate::processing::{run_job, Job, MeasureRequest, PropertySet};

#[derive(Deserialize, Serialize, Debug)]
#[serde(deny_unknown_fields)]
pub struct BatchConfig {
    #[serde(default)]
    pub global: GlobalParams,
    pub jobs: Vec<JobConfig>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct GlobalParams {
    #[serde(default)]
    pub properties: Vec<String>,
    #[serde(default = "default_true")]
    pub cache: bool,
    #[serde(default)]
    pub spacing: Option<Vec<f64>>,
    #[serde(default = "default_separator")]
    pub separator: String,
    #[serde(default)]
    pub by_name: bool,
}

impl Default for GlobalParams {
    fn default() -> Self {
        Self {
            properties: Vec::new(),
            cache: default_true(),
            spacing: None,
            separator: default_separator(),
            by_name: false,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_separator() -> String {
    "-".to_string()
}

/// One job; every option left out falls back to `global`.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct JobConfig {
    pub labels: PathBuf,
    pub regions: PathBuf,
    pub images: Option<PathBuf>,
    pub properties: Option<Vec<String>>,
    pub cache: Option<bool>,
    pub spacing: Option<Vec<f64>>,
    pub separator: Option<String>,
    pub by_name: Option<bool>,
}

impl BatchConfig {
    pub fn from_path(config_path: &Path) -> Result<Self> {
        let config_content = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;
        let config = serde_json::from_str(&config_content)
            .with_context(|| format!("Invalid batch file {}", config_path.display()))?;
        Ok(config)
    }

    /// Builds the jobs, applying per-job overrides on top of `global`.
    /// Relative paths are taken relative to `base_dir`.
    pub fn jobs(&self, base_dir: &Path) -> Result<Vec<Job>> {
        self.jobs
            .iter()
            .enumerate()
            .map(|(i, job)| {
                self.build_job(job, base_dir)
                    .with_context(|| format!("Invalid job #{}", i + 1))
            })
            .collect()
    }

    fn build_job(&self, job: &JobConfig, base_dir: &Path) -> Result<Job> {
        let global = &self.global;
        let names = job.properties.as_ref().unwrap_or(&global.properties);
        let by_name = job.by_name.unwrap_or(global.by_name);

        Ok(Job {
            labels: base_dir.join(&job.labels),
            regions: base_dir.join(&job.regions),
            images: job.images.as_ref().map(|images| base_dir.join(images)),
            pairing: if by_name {
                Pairing::ByName
            } else {
                Pairing::Alphabetical
            },
            request: MeasureRequest {
                properties: PropertySet::parse(names)?,
                spacing: job.spacing.clone().or_else(|| global.spacing.clone()),
                cache: job.cache.unwrap_or(global.cache),
                separator: job
                    .separator
                    .clone()
                    .unwrap_or_else(|| global.separator.clone()),
            },
        })
    }
}

pub fn process_batch(config_path: &Path) -> Result<Vec<PathBuf>> {
    let config = BatchConfig::from_path(config_path)?;
    let base_dir = config_path.parent().unwrap_or_else(|| Path::new(""));
    let jobs = config.jobs(base_dir)?;

    info!("Starting batch processing with {} jobs...", jobs.len());

    let mut written = Vec::new();
    for (i, job) in jobs.iter().enumerate() {
        info!(
            "[{}/{}] {} -> {}",
            i + 1,
            jobs.len(),
            job.labels.display(),
            job.regions.display()
        );
        let outputs = run_job(job).with_context(|| format!("Job #{} failed", i + 1))?;
        written.extend(outputs);
    }

    info!("Batch processing complete: {} tables written", written.len());
    Ok(written)
}
