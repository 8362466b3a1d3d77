// ==============================================================================
// amino_acids.rs - Amino-Acid Frequency Profiles
// ==============================================================================
// Description: Per-proteome residue frequencies and their cross-sample table
// Author: Matt Barham
// Created: 2026-10-14
// Modified: 2026-10-14
// Version: 1.0.0
// ==============================================================================
// Per-sample file format (output of `aa-frequency`, no header):
//   A,0.0952
//   C,0.0113
// Stop symbols ('*') are removed before counting.
// ==============================================================================

use csv::{ReaderBuilder, Trim};
use needletail::parse_fastx_file;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use crate::models::FeatureTable;
use crate::profile::{densify, SparseProfile};

/// Translation stop symbol in protein FASTA files
pub const STOP_SYMBOL: u8 = b'*';

/// Errors that can occur while computing amino-acid profiles
#[derive(Error, Debug)]
pub enum AminoAcidError {
    #[error("Failed to read FASTA file {}: {message}", path.display())]
    Fasta { path: PathBuf, message: String },

    #[error("No residues found in {}", path.display())]
    NoResidues { path: PathBuf },

    #[error("Failed to open {}", path.display())]
    FileAccess {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("CSV parsing error in {}", path.display())]
    Csv { path: PathBuf, source: csv::Error },
}

/// Residue character counts over a set of protein sequences
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResidueCounts {
    counts: BTreeMap<char, u64>,
}

impl ResidueCounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count every residue of every record in a protein FASTA file
    pub fn from_fasta(path: impl AsRef<Path>) -> Result<Self, AminoAcidError> {
        let path = path.as_ref();
        let fasta_error = |e: needletail::errors::ParseError| AminoAcidError::Fasta {
            path: path.to_path_buf(),
            message: e.to_string(),
        };

        let mut reader = parse_fastx_file(path).map_err(fasta_error)?;
        let mut counts = Self::new();
        let mut n_records = 0usize;

        while let Some(record) = reader.next() {
            let record = record.map_err(fasta_error)?;
            counts.add_sequence(&record.seq());
            n_records += 1;
        }

        debug!("Counted {} residues in {} records of {:?}", counts.total(), n_records, path);

        if counts.total() == 0 {
            return Err(AminoAcidError::NoResidues {
                path: path.to_path_buf(),
            });
        }

        Ok(counts)
    }

    /// Add one sequence, skipping stop symbols
    pub fn add_sequence(&mut self, sequence: &[u8]) {
        for &residue in sequence.iter().filter(|&&b| b != STOP_SYMBOL) {
            *self.counts.entry(char::from(residue)).or_insert(0) += 1;
        }
    }

    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    pub fn count(&self, residue: char) -> u64 {
        self.counts.get(&residue).copied().unwrap_or(0)
    }

    /// Relative frequency of each residue, sorted by residue
    pub fn frequencies(&self) -> Vec<ResidueFrequency> {
        let total = self.total() as f64;
        self.counts
            .iter()
            .map(|(&residue, &count)| ResidueFrequency {
                residue: residue.to_string(),
                frequency: count as f64 / total,
            })
            .collect()
    }

    /// Write `residue,frequency` lines with 4 decimals
    pub fn write_frequencies<W: Write>(&self, mut writer: W) -> std::io::Result<()> {
        for record in self.frequencies() {
            writeln!(writer, "{},{:.4}", record.residue, record.frequency)?;
        }
        writer.flush()
    }
}

/// One `residue,frequency` row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResidueFrequency {
    pub residue: String,
    pub frequency: f64,
}

/// Read a headerless per-sample frequency file
pub fn read_frequency_file(path: impl AsRef<Path>) -> Result<Vec<ResidueFrequency>, AminoAcidError> {
    let path = path.as_ref();
    let file = std::fs::File::open(path).map_err(|source| AminoAcidError::FileAccess {
        path: path.to_path_buf(),
        source,
    })?;

    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .trim(Trim::All)
        .from_reader(file);

    reader
        .deserialize()
        .collect::<Result<Vec<ResidueFrequency>, csv::Error>>()
        .map_err(|source| AminoAcidError::Csv {
            path: path.to_path_buf(),
            source,
        })
}

/// Pivot `{input_dir}/{sample}.csv` files into a residue × sample table
///
/// Residues absent from a sample are filled with 0.0.
pub fn build_frequency_table(
    input_dir: &Path,
    samples: &[String],
) -> Result<FeatureTable<f64>, AminoAcidError> {
    let mut sparse: SparseProfile<f64> = BTreeMap::new();

    for sample in samples {
        let path = input_dir.join(format!("{}.csv", sample));
        let records = read_frequency_file(&path)?;
        debug!("Sample {}: {} residues", sample, records.len());

        for record in records {
            sparse
                .entry(record.residue)
                .or_insert_with(HashMap::new)
                .insert(sample.clone(), record.frequency);
        }
    }

    let residues: Vec<String> = sparse.keys().cloned().collect();
    info!(
        "Amino-acid table: {} residues x {} samples",
        residues.len(),
        samples.len()
    );

    Ok(densify(&residues, samples, &sparse, 0.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Write as _;
    use tempfile::{tempdir, NamedTempFile};

    fn create_fasta(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_counts_skip_stop_symbols() {
        let mut counts = ResidueCounts::new();
        counts.add_sequence(b"MKV*");
        counts.add_sequence(b"MA*K");

        assert_eq!(counts.total(), 6);
        assert_eq!(counts.count('M'), 2);
        assert_eq!(counts.count('K'), 2);
        assert_eq!(counts.count('*'), 0);
    }

    #[test]
    fn test_frequencies_sorted_and_normalised() {
        let mut counts = ResidueCounts::new();
        counts.add_sequence(b"VAAM");

        let frequencies = counts.frequencies();
        let residues: Vec<&str> = frequencies.iter().map(|f| f.residue.as_str()).collect();
        assert_eq!(residues, vec!["A", "M", "V"]);

        let sum: f64 = frequencies.iter().map(|f| f.frequency).sum();
        assert!((sum - 1.0).abs() < 1e-12);
        assert_eq!(frequencies[0].frequency, 0.5);
    }

    #[test]
    fn test_write_frequencies() {
        let mut counts = ResidueCounts::new();
        counts.add_sequence(b"AAAC");

        let mut buffer = Vec::new();
        counts.write_frequencies(&mut buffer).unwrap();
        assert_eq!(String::from_utf8(buffer).unwrap(), "A,0.7500\nC,0.2500\n");
    }

    #[test]
    fn test_from_fasta() {
        let file = create_fasta(">prot1 hypothetical\nMKVL\nAA*\n>prot2\nMA*\n");
        let counts = ResidueCounts::from_fasta(file.path()).unwrap();

        assert_eq!(counts.total(), 8);
        assert_eq!(counts.count('A'), 3);
        assert_eq!(counts.count('M'), 2);
    }

    #[test]
    fn test_from_fasta_only_stops() {
        let file = create_fasta(">prot1\n***\n");
        match ResidueCounts::from_fasta(file.path()).unwrap_err() {
            AminoAcidError::NoResidues { .. } => {}
            other => panic!("Expected NoResidues error, got {:?}", other),
        }
    }

    #[test]
    fn test_from_missing_fasta() {
        assert!(ResidueCounts::from_fasta("/nonexistent/proteins.faa").is_err());
    }

    #[test]
    fn test_frequency_table_fills_zero() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("s1.csv"), "A,0.5000\nC,0.5000\n").unwrap();
        fs::write(dir.path().join("s2.csv"), "A,0.2500\nW,0.7500\n").unwrap();

        let samples = vec!["s1".to_string(), "s2".to_string()];
        let table = build_frequency_table(dir.path(), &samples).unwrap();

        assert_eq!(table.features, vec!["A", "C", "W"]);
        assert_eq!(table.get("A", "s2"), Some(0.25));
        assert_eq!(table.get("C", "s2"), Some(0.0));
        assert_eq!(table.get("W", "s1"), Some(0.0));
    }

    #[test]
    fn test_frequency_table_missing_sample() {
        let dir = tempdir().unwrap();
        let samples = vec!["absent".to_string()];

        match build_frequency_table(dir.path(), &samples).unwrap_err() {
            AminoAcidError::FileAccess { path, .. } => {
                assert_eq!(path, dir.path().join("absent.csv"));
            }
            other => panic!("Expected FileAccess error, got {:?}", other),
        }
    }

    #[test]
    fn test_frequency_file_bad_value() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("s1.csv");
        fs::write(&path, "A,abc\n").unwrap();

        match read_frequency_file(&path).unwrap_err() {
            AminoAcidError::Csv { .. } => {}
            other => panic!("Expected Csv error, got {:?}", other),
        }
    }
}
