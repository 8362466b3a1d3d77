// ==============================================================================
// profile.rs - Cross-Sample ncRNA Profile Aggregation
// ==============================================================================
// Description: Folds per-sample accepted hits into count and presence tables
// Author: Matt Barham
// Created: 2026-10-14
// Modified: 2026-10-14
// Version: 1.0.0
// ==============================================================================
// Algorithm:
//   1. accumulate(sample, hits): count hits per target family, store the
//      counts in a sparse family -> sample -> count map
//   2. finalize(): rows = every family ever observed (sorted), columns = the
//      full sample list, unobserved cells filled with integer 0
//   3. presence = 1 where count > 0, else 0 (derived from the dense counts)
// ==============================================================================

use std::collections::{BTreeMap, HashMap, HashSet};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::models::{CmscanHit, FeatureTable};

/// Sparse feature -> sample -> value map
pub type SparseProfile<T> = BTreeMap<String, HashMap<String, T>>;

/// Errors raised while accumulating samples
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProfileError {
    #[error("Sample '{0}' is not in the sample list")]
    UnknownSample(String),

    #[error("Sample '{0}' has already been accumulated")]
    DuplicateSample(String),
}

/// Materialize a sparse map into a dense table
///
/// Features missing from `sparse` get a row of `fill`, and so does every
/// (feature, sample) cell without a recorded value. Samples present in
/// `sparse` but not in `samples` are not part of the table.
pub fn densify<T: Copy>(
    features: &[String],
    samples: &[String],
    sparse: &SparseProfile<T>,
    fill: T,
) -> FeatureTable<T> {
    let values = features
        .iter()
        .map(|feature| {
            let row = sparse.get(feature);
            samples
                .iter()
                .map(|sample| {
                    row.and_then(|cells| cells.get(sample))
                        .copied()
                        .unwrap_or(fill)
                })
                .collect()
        })
        .collect();

    FeatureTable {
        features: features.to_vec(),
        samples: samples.to_vec(),
        values,
    }
}

/// Finalized count and presence/absence tables
#[derive(Debug, Clone, PartialEq)]
pub struct NcRnaProfiles {
    /// Accepted hits per family per sample
    pub counts: FeatureTable<u64>,
    /// 1 if the family has at least one accepted hit in the sample
    pub presence: FeatureTable<u8>,
}

/// Incremental builder for [`NcRnaProfiles`]
#[derive(Debug, Clone)]
pub struct ProfileBuilder {
    samples: Vec<String>,
    known: HashSet<String>,
    accumulated: HashSet<String>,
    counts: SparseProfile<u64>,
}

impl ProfileBuilder {
    /// Start a profile over the given column order
    pub fn new<I, S>(samples: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut known = HashSet::new();
        let mut ordered = Vec::new();

        for sample in samples {
            let sample = sample.into();
            if known.insert(sample.clone()) {
                ordered.push(sample);
            } else {
                warn!("Sample '{}' listed more than once, ignoring repeat", sample);
            }
        }

        Self {
            samples: ordered,
            known,
            accumulated: HashSet::new(),
            counts: BTreeMap::new(),
        }
    }

    pub fn samples(&self) -> &[String] {
        &self.samples
    }

    /// Number of distinct families observed so far
    pub fn n_families(&self) -> usize {
        self.counts.len()
    }

    /// Add one sample's accepted hits
    ///
    /// Every hit counts, so a family hit twice in a sample gets a count of 2.
    /// Returns the number of distinct families seen in this sample.
    pub fn accumulate<'h, I>(&mut self, sample: &str, hits: I) -> Result<usize, ProfileError>
    where
        I: IntoIterator<Item = &'h CmscanHit>,
    {
        if !self.known.contains(sample) {
            return Err(ProfileError::UnknownSample(sample.to_string()));
        }
        if !self.accumulated.insert(sample.to_string()) {
            return Err(ProfileError::DuplicateSample(sample.to_string()));
        }

        let mut family_counts: HashMap<&str, u64> = HashMap::new();
        for hit in hits {
            *family_counts.entry(hit.target_name.as_str()).or_insert(0) += 1;
        }

        let n_families = family_counts.len();
        for (family, count) in family_counts {
            self.counts
                .entry(family.to_string())
                .or_default()
                .insert(sample.to_string(), count);
        }

        debug!("Sample {}: {} distinct families", sample, n_families);
        Ok(n_families)
    }

    /// Freeze into dense tables over the full sample list
    pub fn finalize(self) -> NcRnaProfiles {
        let features: Vec<String> = self.counts.keys().cloned().collect();
        let counts = densify(&features, &self.samples, &self.counts, 0u64);

        let presence = FeatureTable {
            features: counts.features.clone(),
            samples: counts.samples.clone(),
            values: counts
                .values
                .iter()
                .map(|row| row.iter().map(|&count| u8::from(count > 0)).collect())
                .collect(),
        };

        info!(
            "Finalized profiles: {} families x {} samples",
            counts.n_features(),
            counts.n_samples()
        );

        NcRnaProfiles { counts, presence }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hits(families: &[&str]) -> Vec<CmscanHit> {
        families
            .iter()
            .map(|family| CmscanHit::synthetic(family, 0.0, 1e-10))
            .collect()
    }

    fn samples(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_repeated_family_is_summed() {
        let mut builder = ProfileBuilder::new(["s1"]);
        let n = builder.accumulate("s1", &hits(&["X", "X", "Y"])).unwrap();
        assert_eq!(n, 2);

        let profiles = builder.finalize();
        assert_eq!(profiles.counts.get("X", "s1"), Some(2));
        assert_eq!(profiles.presence.get("X", "s1"), Some(1));
        assert_eq!(profiles.counts.get("Y", "s1"), Some(1));
    }

    #[test]
    fn test_dense_fill_with_zero() {
        let mut builder = ProfileBuilder::new(["s1", "s2", "s3"]);
        builder.accumulate("s1", &hits(&["X"])).unwrap();
        builder.accumulate("s2", &hits(&["X", "Y"])).unwrap();
        builder.accumulate("s3", &hits(&[])).unwrap();

        let profiles = builder.finalize();

        assert_eq!(profiles.counts.samples, samples(&["s1", "s2", "s3"]));
        assert_eq!(profiles.counts.row("Y"), Some(&[0u64, 1, 0][..]));
        assert_eq!(profiles.presence.row("Y"), Some(&[0u8, 1, 0][..]));
        assert_eq!(profiles.counts.row("X"), Some(&[1u64, 1, 0][..]));
    }

    #[test]
    fn test_unprocessed_samples_still_get_columns() {
        let mut builder = ProfileBuilder::new(["s1", "s2"]);
        builder.accumulate("s2", &hits(&["X"])).unwrap();

        let profiles = builder.finalize();
        assert_eq!(profiles.counts.samples, samples(&["s1", "s2"]));
        assert_eq!(profiles.counts.get("X", "s1"), Some(0));
    }

    #[test]
    fn test_presence_matches_counts() {
        let mut builder = ProfileBuilder::new(["a", "b", "c", "d"]);
        builder.accumulate("a", &hits(&["X", "Y", "Y"])).unwrap();
        builder.accumulate("b", &hits(&["Z"])).unwrap();
        builder.accumulate("d", &hits(&["Y", "Z", "Z", "Z"])).unwrap();

        let profiles = builder.finalize();

        assert_eq!(profiles.counts.features, profiles.presence.features);
        assert_eq!(profiles.counts.samples, profiles.presence.samples);
        for (count_row, presence_row) in profiles.counts.values.iter().zip(&profiles.presence.values) {
            for (&count, &present) in count_row.iter().zip(presence_row) {
                assert_eq!(present == 1, count > 0);
                assert!(present <= 1);
            }
        }
    }

    #[test]
    fn test_rows_are_sorted() {
        let mut builder = ProfileBuilder::new(["s1"]);
        builder.accumulate("s1", &hits(&["tRNA", "5S_rRNA", "RNaseP_bact_a"])).unwrap();

        let profiles = builder.finalize();
        assert_eq!(
            profiles.counts.features,
            samples(&["5S_rRNA", "RNaseP_bact_a", "tRNA"])
        );
    }

    #[test]
    fn test_empty_run_has_no_rows() {
        let mut builder = ProfileBuilder::new(["s1", "s2"]);
        builder.accumulate("s1", &hits(&[])).unwrap();

        let profiles = builder.finalize();
        assert_eq!(profiles.counts.n_features(), 0);
        assert_eq!(profiles.counts.n_samples(), 2);
    }

    #[test]
    fn test_unknown_sample() {
        let mut builder = ProfileBuilder::new(["s1"]);
        assert_eq!(
            builder.accumulate("s9", &hits(&["X"])),
            Err(ProfileError::UnknownSample("s9".to_string()))
        );
    }

    #[test]
    fn test_duplicate_accumulation() {
        let mut builder = ProfileBuilder::new(["s1"]);
        builder.accumulate("s1", &hits(&["X"])).unwrap();
        assert_eq!(
            builder.accumulate("s1", &hits(&["X"])),
            Err(ProfileError::DuplicateSample("s1".to_string()))
        );

        // The rejected call must not change the counts
        assert_eq!(builder.finalize().counts.get("X", "s1"), Some(1));
    }

    #[test]
    fn test_repeated_sample_ids_collapse() {
        let builder = ProfileBuilder::new(["s1", "s2", "s1"]);
        assert_eq!(builder.samples(), &samples(&["s1", "s2"])[..]);
    }

    #[test]
    fn test_densify_is_rectangular() {
        let mut sparse: SparseProfile<f64> = BTreeMap::new();
        sparse.entry("A".to_string()).or_default().insert("s2".to_string(), 0.25);
        sparse.entry("C".to_string()).or_default().insert("s9".to_string(), 0.5);

        let features = samples(&["A", "B", "C"]);
        let columns = samples(&["s1", "s2"]);
        let table = densify(&features, &columns, &sparse, 0.0);

        assert_eq!(table.values, vec![vec![0.0, 0.25], vec![0.0, 0.0], vec![0.0, 0.0]]);
    }
}
