// src/io/resolver.rs
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::ResolveError;

/// Extension of plain-text files listing one path per line.
pub const FILE_LIST_EXTENSION: &str = "list";

/// How images are matched to label files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Pairing {
    /// Zip the sorted image listing with the sorted label listing.
    #[default]
    Alphabetical,
    /// Look up the image with the same file name as each label file.
    ByName,
}

/// One unit of work: a label file, its optional intensity image and the CSV
/// destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileTriple {
    pub labels: PathBuf,
    pub image: Option<PathBuf>,
    pub regions: PathBuf,
}

/// Resolves a file, directory or `.list` file argument into concrete paths.
///
/// A directory lists its regular files sorted by path, unless `file_names`
/// is given, in which case those names are joined onto it in order. With a
/// `suffix`, every resolved path has its extension replaced.
pub fn resolve_files(
    path: &Path,
    file_names: Option<&[String]>,
    suffix: Option<&str>,
) -> Result<Vec<PathBuf>, ResolveError> {
    let mut paths = if path.is_file() {
        if is_file_list(path) {
            read_file_list(path)?
        } else {
            vec![path.to_path_buf()]
        }
    } else if path.is_dir() {
        match file_names {
            Some(names) => names.iter().map(|name| path.join(name)).collect(),
            None => list_directory(path)?,
        }
    } else {
        return Err(ResolveError::NotFileOrDirectory(path.to_path_buf()));
    };

    if let Some(suffix) = suffix {
        let extension = suffix.trim_start_matches('.');
        for path in &mut paths {
            path.set_extension(extension);
        }
    }
    debug!(path = %path.display(), count = paths.len(), "resolved files");
    Ok(paths)
}

/// Base names of `paths`, in order.
pub fn file_names(paths: &[PathBuf]) -> Vec<String> {
    paths
        .iter()
        .filter_map(|path| path.file_name())
        .map(|name| name.to_string_lossy().into_owned())
        .collect()
}

/// Resolves the three path arguments and pairs them up, one triple per
/// label file.
pub fn pair_files(
    labels: &Path,
    regions: &Path,
    images: Option<&Path>,
    pairing: Pairing,
) -> Result<Vec<FileTriple>, ResolveError> {
    let label_files = resolve_files(labels, None, None)?;
    let label_names = file_names(&label_files);

    let region_files = resolve_files(regions, Some(&label_names), Some("csv"))?;
    if region_files.len() != label_files.len() {
        return Err(ResolveError::RegionCountMismatch {
            labels: label_files.len(),
            regions: region_files.len(),
        });
    }

    let image_files = match images {
        Some(images) => {
            let names = match pairing {
                Pairing::ByName => Some(label_names.as_slice()),
                Pairing::Alphabetical => None,
            };
            let image_files = resolve_files(images, names, None)?;
            if image_files.len() != label_files.len() {
                return Err(ResolveError::ImageCountMismatch {
                    labels: label_files.len(),
                    images: image_files.len(),
                });
            }
            image_files.into_iter().map(Some).collect()
        }
        None => vec![None; label_files.len()],
    };

    Ok(label_files
        .into_iter()
        .zip(image_files)
        .zip(region_files)
        .map(|((labels, image), regions)| FileTriple {
            labels,
            image,
            regions,
        })
        .collect())
}

fn is_file_list(path: &Path) -> bool {
    path.extension()
        .is_some_and(|extension| extension.eq_ignore_ascii_case(FILE_LIST_EXTENSION))
}

fn read_file_list(path: &Path) -> Result<Vec<PathBuf>, ResolveError> {
    let contents = fs::read_to_string(path).map_err(|source| ResolveError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(contents
        .lines()
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .filter(|line| !line.is_empty())
        .map(PathBuf::from)
        .collect())
}

fn list_directory(path: &Path) -> Result<Vec<PathBuf>, ResolveError> {
    let io_error = |source| ResolveError::Io {
        path: path.to_path_buf(),
        source,
    };
    let mut files = Vec::new();
    for entry in fs::read_dir(path).map_err(io_error)? {
        let entry_path = entry.map_err(io_error)?.path();
        if entry_path.is_file() {
            files.push(entry_path);
        }
    }
    files.sort();
    Ok(files)
}
