// ==============================================================================
// output.rs - Profile Table Output
// ==============================================================================
// Description: Writes dense feature tables as CSV for downstream analysis
// Author: Matt Barham
// Created: 2026-10-14
// Modified: 2026-10-14
// Version: 1.0.0
// ==============================================================================
// Layout (pandas-compatible, first column is the unlabeled row index):
//   ,sample1,sample2
//   5S_rRNA,2,1
//   tRNA,0,3
// ==============================================================================

use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;
use tracing::info;

use crate::models::FeatureTable;

/// Count matrix file name
pub const COUNTS_FILE_NAME: &str = "ncRNA_profiles_counts.csv";

/// Presence/absence matrix file name
pub const BINARY_FILE_NAME: &str = "ncRNA_profiles_binary.csv";

/// Amino-acid frequency table file name
pub const AA_FREQUENCIES_FILE_NAME: &str = "aa_frequencies.csv";

/// Text rendering of a table cell
pub trait TableCell {
    fn render(&self) -> String;
}

impl TableCell for u64 {
    fn render(&self) -> String {
        self.to_string()
    }
}

impl TableCell for u8 {
    fn render(&self) -> String {
        self.to_string()
    }
}

impl TableCell for f64 {
    // Debug keeps a decimal point on whole numbers ("0.0", not "0")
    fn render(&self) -> String {
        format!("{:?}", self)
    }
}

/// Write a table as CSV to any writer
pub fn write_table<W: Write, T: TableCell + Copy>(
    table: &FeatureTable<T>,
    writer: W,
) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(writer);

    let mut header = Vec::with_capacity(table.samples.len() + 1);
    header.push(String::new());
    header.extend(table.samples.iter().cloned());
    writer.write_record(&header)?;

    for (feature, row) in table.rows() {
        let mut record = Vec::with_capacity(row.len() + 1);
        record.push(feature.to_string());
        record.extend(row.iter().map(TableCell::render));
        writer.write_record(&record)?;
    }

    writer.flush()?;
    Ok(())
}

/// Write a table as a CSV file
pub fn write_table_file<T: TableCell + Copy>(table: &FeatureTable<T>, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create output file {:?}", path))?;

    write_table(table, std::io::BufWriter::new(file))
        .with_context(|| format!("Failed to write table to {:?}", path))?;

    info!("Data saved in file {:?}", path);
    Ok(())
}
