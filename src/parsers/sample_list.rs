// ==============================================================================
// parsers/sample_list.rs - Sample List Loader
// ==============================================================================
// Description: Reads the list of sample IDs to process
// Author: Matt Barham
// Created: 2026-10-14
// Modified: 2026-10-14
// Version: 1.0.0
// ==============================================================================
// Format: One sample ID per line, no header, UTF-8
// Example (config/files.txt):
//   GCF_000005845.2
//   GCF_000006945.2
// The list order is also the column order of every output table.
// ==============================================================================

use csv::{ReaderBuilder, Trim};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

/// Errors that can occur while reading a sample list
#[derive(Error, Debug)]
pub enum SampleListError {
    #[error("Failed to open sample list {}", path.display())]
    FileAccess {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("CSV parsing error in sample list {}", path.display())]
    Csv { path: PathBuf, source: csv::Error },

    #[error("Sample list {} contains no sample IDs", path.display())]
    Empty { path: PathBuf },
}

/// Read sample IDs in file order
///
/// Blank lines are skipped and repeated IDs are collapsed onto their first
/// occurrence.
pub fn read_sample_list(path: impl AsRef<Path>) -> Result<Vec<String>, SampleListError> {
    let path = path.as_ref();
    let file = std::fs::File::open(path).map_err(|source| SampleListError::FileAccess {
        path: path.to_path_buf(),
        source,
    })?;

    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(file);

    let mut seen = HashSet::new();
    let mut samples = Vec::new();

    for result in reader.records() {
        let record = result.map_err(|source| SampleListError::Csv {
            path: path.to_path_buf(),
            source,
        })?;

        let Some(sample) = record.get(0).filter(|s| !s.is_empty()) else {
            continue;
        };

        if seen.insert(sample.to_string()) {
            samples.push(sample.to_string());
        } else {
            warn!("Duplicate sample '{}' in {:?}, keeping first occurrence", sample, path);
        }
    }

    if samples.is_empty() {
        return Err(SampleListError::Empty {
            path: path.to_path_buf(),
        });
    }

    Ok(samples)
}
