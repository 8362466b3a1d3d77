// ==============================================================================
// processor.rs - ncRNA Profile Pipeline
// ==============================================================================
// Description: Parses, quality-filters and aggregates cmscan reports per sample
// Author: Matt Barham
// Created: 2026-10-14
// Modified: 2026-10-14
// Version: 1.0.0
// ==============================================================================
// Pipeline (sequential, one sample at a time):
//   {input_dir}/{sample}.cmscan -> CmscanParser -> QualityThresholds
//     -> ProfileBuilder::accumulate
//   after the last sample: finalize -> ncRNA_profiles_{counts,binary}.csv
// Any failing sample aborts the run before an output file is written.
// ==============================================================================

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::models::{CmscanHit, QualityThresholds};
use crate::output::{write_table_file, BINARY_FILE_NAME, COUNTS_FILE_NAME};
use crate::parsers::CmscanParser;
use crate::profile::{NcRnaProfiles, ProfileBuilder};

/// Default report file extension
pub const REPORT_EXTENSION: &str = "cmscan";

/// Paths and shape of a finished profile run
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileOutputs {
    pub counts_path: PathBuf,
    pub binary_path: PathBuf,
    pub n_families: usize,
    pub n_samples: usize,
}

pub struct ProfileProcessor {
    input_dir: PathBuf,
    output_dir: PathBuf,
    extension: String,
    parser: CmscanParser,
    thresholds: QualityThresholds,
}

impl ProfileProcessor {
    pub fn new(input_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            extension: REPORT_EXTENSION.to_string(),
            parser: CmscanParser::new(),
            thresholds: QualityThresholds::default(),
        }
    }

    pub fn with_thresholds(mut self, thresholds: QualityThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// Location of a sample's report
    pub fn report_path(&self, sample: &str) -> PathBuf {
        let extension = self.extension.trim_start_matches('.');
        if extension.is_empty() {
            self.input_dir.join(sample)
        } else {
            self.input_dir.join(format!("{}.{}", sample, extension))
        }
    }

    /// Run the whole pipeline and write both tables
    pub fn process(&self, samples: &[String]) -> Result<ProfileOutputs> {
        let profiles = self.build_profiles(samples)?;
        self.write_profiles(&profiles)
    }

    /// Parse and aggregate every sample, without writing anything
    pub fn build_profiles(&self, samples: &[String]) -> Result<NcRnaProfiles> {
        info!("Processing {} samples from {:?}", samples.len(), self.input_dir);
        info!(
            "Quality thresholds: bias <= {}, E-value < {}",
            self.thresholds.bias_max, self.thresholds.evalue_max
        );

        let mut builder = ProfileBuilder::new(samples.iter().cloned());

        for sample in builder.samples().to_vec() {
            let accepted = self.accepted_hits(&sample)?;
            builder
                .accumulate(&sample, &accepted)
                .with_context(|| format!("Failed to aggregate sample {}", sample))?;
        }

        info!("Observed {} ncRNA families", builder.n_families());
        Ok(builder.finalize())
    }

    /// Parse one sample's report and keep hits passing the thresholds
    pub fn accepted_hits(&self, sample: &str) -> Result<Vec<CmscanHit>> {
        let path = self.report_path(sample);
        debug!("Parsing cmscan report {:?}", path);

        let hits = self
            .parser
            .parse(&path)
            .with_context(|| format!("Failed to parse cmscan report for sample {}", sample))?;

        let parsed = hits.len();
        let accepted: Vec<CmscanHit> = hits
            .into_iter()
            .filter(|hit| self.thresholds.passes(hit))
            .collect();

        info!(
            "Sample {}: {} hits parsed, {} accepted",
            sample,
            parsed,
            accepted.len()
        );

        Ok(accepted)
    }

    /// Write count and presence tables into the output directory
    pub fn write_profiles(&self, profiles: &NcRnaProfiles) -> Result<ProfileOutputs> {
        ensure_dir(&self.output_dir)?;

        let counts_path = self.output_dir.join(COUNTS_FILE_NAME);
        let binary_path = self.output_dir.join(BINARY_FILE_NAME);

        write_table_file(&profiles.counts, &counts_path)?;
        write_table_file(&profiles.presence, &binary_path)?;

        Ok(ProfileOutputs {
            counts_path,
            binary_path,
            n_families: profiles.counts.n_features(),
            n_samples: profiles.counts.n_samples(),
        })
    }
}

/// Create an output directory if it does not exist yet
pub fn ensure_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory {:?}", dir))
}
