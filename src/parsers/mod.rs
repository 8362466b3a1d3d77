// ==============================================================================
// parsers/mod.rs - File parser modules
// ==============================================================================
// Description: Parsers for cmscan reports, family allow-lists and sample lists
// Author: Matt Barham
// Created: 2026-10-14
// Modified: 2026-10-14
// Version: 1.0.0
// ==============================================================================

pub mod allowlist;
pub mod cmscan;
pub mod sample_list;

pub use allowlist::{AllowlistError, FamilyAllowlist};
pub use cmscan::{CmscanParseError, CmscanParser, CmscanRecords, ColumnModel};
pub use sample_list::{read_sample_list, SampleListError};

use flate2::bufread::MultiGzDecoder;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Gzip magic number (first two bytes of every member)
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Open a text file for line reading, decompressing it on the fly when it
/// starts with the gzip magic number.
pub fn open_text_file(path: impl AsRef<Path>) -> std::io::Result<Box<dyn BufRead>> {
    let file = File::open(path.as_ref())?;
    let mut reader = BufReader::new(file);

    let is_gzip = reader.fill_buf()?.starts_with(&GZIP_MAGIC);

    if is_gzip {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(reader))))
    } else {
        Ok(Box::new(reader))
    }
}
