// ==============================================================================
// parsers/allowlist.rs - Rfam Family Allow-List Loader
// ==============================================================================
// Description: Loads and unions curated family identifier lists
// Author: Matt Barham
// Created: 2026-10-14
// Modified: 2026-10-14
// Version: 1.0.0
// ==============================================================================
// Format: Single-column CSV, no header, one family per row
// Example (config/bacteria.csv):
//   RF00001
//   RF00005
//   RF00023
// Only the first column of a row is used; extra columns are ignored.
// ==============================================================================

use csv::ReaderBuilder;
use std::collections::HashSet;
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Errors that can occur while loading allow-list files
#[derive(Error, Debug)]
pub enum AllowlistError {
    #[error("Failed to open allow-list {}", path.display())]
    FileAccess {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("CSV parsing error in allow-list {}", path.display())]
    Csv { path: PathBuf, source: csv::Error },
}

/// Set of family identifiers a hit must belong to
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FamilyAllowlist {
    families: HashSet<String>,
}

impl FamilyAllowlist {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the union of all given allow-list files
    ///
    /// # Arguments
    /// * `paths` - Allow-list files (e.g. archaea.csv and bacteria.csv)
    ///
    /// # Returns
    /// * `Ok(FamilyAllowlist)` - Distinct trimmed identifiers across all files
    /// * `Err(AllowlistError)` - A file could not be opened or read
    ///
    /// The order of `paths` has no effect on the result.
    pub fn load<P: AsRef<Path>>(paths: &[P]) -> Result<Self, AllowlistError> {
        let mut allowlist = Self::new();

        for path in paths {
            let path = path.as_ref();
            let file = std::fs::File::open(path).map_err(|source| AllowlistError::FileAccess {
                path: path.to_path_buf(),
                source,
            })?;

            let families = Self::read_families(file).map_err(|source| AllowlistError::Csv {
                path: path.to_path_buf(),
                source,
            })?;

            debug!("Read {} families from {:?}", families.len(), path);
            allowlist.families.extend(families);
        }

        Ok(allowlist)
    }

    /// Read the first column of every non-empty row, trimmed
    pub fn read_families<R: Read>(reader: R) -> Result<HashSet<String>, csv::Error> {
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let mut families = HashSet::new();
        for result in reader.records() {
            let record = result?;
            if let Some(family) = record.get(0).map(str::trim) {
                if !family.is_empty() {
                    families.insert(family.to_string());
                }
            }
        }

        Ok(families)
    }

    pub fn contains(&self, family: &str) -> bool {
        self.families.contains(family)
    }

    pub fn insert(&mut self, family: impl Into<String>) -> bool {
        self.families.insert(family.into().trim().to_string())
    }

    pub fn len(&self) -> usize {
        self.families.len()
    }

    pub fn is_empty(&self) -> bool {
        self.families.is_empty()
    }

    /// Identifiers in lexicographic order
    pub fn sorted(&self) -> Vec<&str> {
        let mut families: Vec<&str> = self.families.iter().map(String::as_str).collect();
        families.sort_unstable();
        families
    }
}

impl<S: Into<String>> FromIterator<S> for FamilyAllowlist {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut allowlist = Self::new();
        for family in iter {
            allowlist.insert(family);
        }
        allowlist
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_test_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_union_of_overlapping_files() {
        let archaea = create_test_file("RF00001\nRF00005\nRF01234\n");
        let bacteria = create_test_file("RF00005\nRF00001\nRF00023\n");

        let allowlist = FamilyAllowlist::load(&[archaea.path(), bacteria.path()]).unwrap();

        assert_eq!(allowlist.len(), 4);
        assert_eq!(
            allowlist.sorted(),
            vec!["RF00001", "RF00005", "RF00023", "RF01234"]
        );
    }

    #[test]
    fn test_whitespace_is_trimmed() {
        let file = create_test_file("  RF00001  \nRF00001\n\tRF00002\n");
        let allowlist = FamilyAllowlist::load(&[file.path()]).unwrap();

        assert_eq!(allowlist.len(), 2);
        assert!(allowlist.contains("RF00001"));
        assert!(allowlist.contains("RF00002"));
        assert!(!allowlist.contains("  RF00001  "));
    }

    #[test]
    fn test_empty_rows_are_skipped() {
        let file = create_test_file("RF00001\n\n   \nRF00002\n");
        let allowlist = FamilyAllowlist::load(&[file.path()]).unwrap();

        assert_eq!(allowlist.len(), 2);
        assert!(!allowlist.contains(""));
    }

    #[test]
    fn test_only_first_column_is_used() {
        let file = create_test_file("RF00001,5S_rRNA\nRF00005,tRNA\n");
        let allowlist = FamilyAllowlist::load(&[file.path()]).unwrap();

        assert_eq!(allowlist.sorted(), vec!["RF00001", "RF00005"]);
        assert!(!allowlist.contains("tRNA"));
    }

    #[test]
    fn test_path_order_does_not_matter() {
        let first = create_test_file("RF00001\nRF00002\n");
        let second = create_test_file("RF00002\nRF00003\n");

        let forward = FamilyAllowlist::load(&[first.path(), second.path()]).unwrap();
        let backward = FamilyAllowlist::load(&[second.path(), first.path()]).unwrap();

        assert_eq!(forward, backward);
    }

    #[test]
    fn test_missing_file_is_file_access_error() {
        let present = create_test_file("RF00001\n");
        let missing = PathBuf::from("/nonexistent/archaea.csv");

        let result = FamilyAllowlist::load(&[present.path().to_path_buf(), missing.clone()]);

        match result.unwrap_err() {
            AllowlistError::FileAccess { path, .. } => assert_eq!(path, missing),
            other => panic!("Expected FileAccess error, got {:?}", other),
        }
    }

    #[test]
    fn test_from_iterator() {
        let allowlist: FamilyAllowlist = ["RF00001", " RF00002 ", "RF00001"].into_iter().collect();
        assert_eq!(allowlist.len(), 2);
        assert!(allowlist.contains("RF00002"));
    }
}
