// ==============================================================================
// models.rs - cmscan Hit and Profile Data Models
// ==============================================================================
// Description: Parsed hits, quality thresholds and dense feature tables
// Author: Matt Barham
// Created: 2026-10-14
// Modified: 2026-10-14
// Version: 1.0.0
// ==============================================================================

use serde::{Deserialize, Serialize};

/// Maximum accepted composition bias (inclusive)
pub const BIAS_MAX: f64 = 50.0;

/// E-value a hit must stay strictly below
pub const EVALUE_MAX: f64 = 0.001;

/// One data line of a cmscan report
#[derive(Debug, Clone, PartialEq)]
pub struct CmscanHit {
    /// 1-based line number in the source report
    pub line_number: usize,

    /// Rfam family name the hit matched (e.g., "5S_rRNA")
    pub target_name: String,

    /// Query sequence the hit lies on (e.g., a contig ID)
    pub query_name: String,

    /// Composition bias correction in bits
    pub bias: f64,

    /// Expected number of false positives at this score
    pub evalue: f64,

    /// Free-text description of the target family
    pub description: String,

    /// Retained columns in report order, after dropping unused ones
    pub fields: Vec<(&'static str, String)>,
}

impl CmscanHit {
    /// Value of a retained column
    pub fn field(&self, column: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| *name == column)
            .map(|(_, value)| value.as_str())
    }

    /// Rfam accession of the target (e.g., "RF00001")
    pub fn accession(&self) -> Option<&str> {
        self.field("accession1")
    }

    #[cfg(test)]
    pub(crate) fn synthetic(target_name: &str, bias: f64, evalue: f64) -> Self {
        Self {
            line_number: 1,
            target_name: target_name.to_string(),
            query_name: "contig_1".to_string(),
            bias,
            evalue,
            description: String::new(),
            fields: Vec::new(),
        }
    }
}

/// Acceptance thresholds for false-positive removal
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QualityThresholds {
    /// Hits with bias above this value are rejected
    pub bias_max: f64,
    /// Hits with E-value at or above this value are rejected
    pub evalue_max: f64,
}

impl Default for QualityThresholds {
    fn default() -> Self {
        Self {
            bias_max: BIAS_MAX,
            evalue_max: EVALUE_MAX,
        }
    }
}

impl QualityThresholds {
    pub fn new(bias_max: f64, evalue_max: f64) -> Self {
        Self {
            bias_max,
            evalue_max,
        }
    }

    pub fn passes(&self, hit: &CmscanHit) -> bool {
        hit.bias <= self.bias_max && hit.evalue < self.evalue_max
    }
}

/// Dense features × samples table
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureTable<T> {
    /// Row keys (e.g., Rfam family names)
    pub features: Vec<String>,
    /// Column keys, in sample-list order
    pub samples: Vec<String>,
    /// One row per feature, one value per sample
    pub values: Vec<Vec<T>>,
}

impl<T: Copy> FeatureTable<T> {
    pub fn n_features(&self) -> usize {
        self.features.len()
    }

    pub fn n_samples(&self) -> usize {
        self.samples.len()
    }

    pub fn row(&self, feature: &str) -> Option<&[T]> {
        let idx = self.features.iter().position(|f| f == feature)?;
        Some(&self.values[idx])
    }

    pub fn get(&self, feature: &str, sample: &str) -> Option<T> {
        let col = self.samples.iter().position(|s| s == sample)?;
        self.row(feature).map(|row| row[col])
    }

    /// Iterate over `(feature, row)` pairs
    pub fn rows(&self) -> impl Iterator<Item = (&str, &[T])> {
        self.features
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().map(Vec::as_slice))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_thresholds() {
        let thresholds = QualityThresholds::default();
        assert_eq!(thresholds.bias_max, 50.0);
        assert_eq!(thresholds.evalue_max, 0.001);
    }

    #[test]
    fn test_threshold_boundaries() {
        let thresholds = QualityThresholds::default();

        assert!(thresholds.passes(&CmscanHit::synthetic("X", 50.0, 0.0009))); // Bias inclusive
        assert!(!thresholds.passes(&CmscanHit::synthetic("X", 50.01, 0.0009)));
        assert!(!thresholds.passes(&CmscanHit::synthetic("X", 0.0, 0.001))); // E-value strict
        assert!(thresholds.passes(&CmscanHit::synthetic("X", 0.0, 1.2e-17)));
    }

    #[test]
    fn test_custom_thresholds() {
        let strict = QualityThresholds::new(10.0, 1e-10);

        assert!(!strict.passes(&CmscanHit::synthetic("X", 10.5, 1e-20)));
        assert!(!strict.passes(&CmscanHit::synthetic("X", 0.0, 1e-5)));
        assert!(strict.passes(&CmscanHit::synthetic("X", 10.0, 1e-11)));
    }

    #[test]
    fn test_nan_values_are_rejected() {
        let thresholds = QualityThresholds::default();
        assert!(!thresholds.passes(&CmscanHit::synthetic("X", f64::NAN, 1e-5)));
        assert!(!thresholds.passes(&CmscanHit::synthetic("X", 0.0, f64::NAN)));
    }

    #[test]
    fn test_feature_table_lookup() {
        let table = FeatureTable {
            features: vec!["5S_rRNA".to_string(), "tRNA".to_string()],
            samples: vec!["s1".to_string(), "s2".to_string()],
            values: vec![vec![1u64, 0], vec![3, 2]],
        };

        assert_eq!(table.n_features(), 2);
        assert_eq!(table.n_samples(), 2);
        assert_eq!(table.get("tRNA", "s1"), Some(3));
        assert_eq!(table.get("5S_rRNA", "s2"), Some(0));
        assert_eq!(table.get("RNaseP", "s1"), None);
        assert_eq!(table.get("tRNA", "s3"), None);
        assert_eq!(table.row("tRNA"), Some(&[3u64, 2][..]));

        let rows: Vec<(&str, &[u64])> = table.rows().collect();
        assert_eq!(rows, vec![("5S_rRNA", &[1u64, 0][..]), ("tRNA", &[3, 2][..])]);
    }
}
