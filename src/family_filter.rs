// ==============================================================================
// family_filter.rs - cmscan Report Family Filter
// ==============================================================================
// Description: Removes hits to Rfam families outside a curated allow-list
// Author: Matt Barham
// Created: 2026-10-14
// Modified: 2026-10-14
// Version: 1.0.0
// ==============================================================================
// Used to restrict reports to prokaryotic families, with allow-lists taken from
// https://github.com/Rfam/rfam-taxonomy (domains/archaea.csv, domains/bacteria.csv).
// Output keeps the input format byte for byte: comment lines are copied as-is
// so the filtered report can still be parsed, data lines are copied only when
// their family field is allow-listed. The family field follows the most recent
// header line (`#target` -> field 1, `#idx` -> field 2) unless overridden.
// ==============================================================================

use std::fs::File;
use std::io::{BufRead, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use crate::parsers::cmscan::COMMENT_MARKER;
use crate::parsers::ColumnModel;
use crate::parsers::{open_text_file, FamilyAllowlist};

/// Whitespace-separated field holding the Rfam accession when no header has
/// announced a column layout (`--fmt 2` position)
pub const FAMILY_FIELD_INDEX: usize = 2;

/// Errors that can occur while filtering a report
#[derive(Error, Debug)]
pub enum FamilyFilterError {
    #[error("Failed to access {}", path.display())]
    FileAccess {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    IoError(#[from] std::io::Error),

    #[error("Invalid line format at line {line}: family field {index} missing, found {found} fields")]
    TooFewFields {
        line: usize,
        index: usize,
        found: usize,
    },
}

/// How a single report line is treated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Comment,
    Blank,
    Kept,
    Removed,
}

/// Line counts of one filtering pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterStats {
    pub comments: usize,
    pub blank: usize,
    pub kept: usize,
    pub removed: usize,
}

impl FilterStats {
    fn record(&mut self, kind: LineKind) {
        match kind {
            LineKind::Comment => self.comments += 1,
            LineKind::Blank => self.blank += 1,
            LineKind::Kept => self.kept += 1,
            LineKind::Removed => self.removed += 1,
        }
    }
}

/// Allow-list based line filter
#[derive(Debug, Clone)]
pub struct FamilyFilter<'a> {
    allowlist: &'a FamilyAllowlist,
    field_override: Option<usize>,
}

impl<'a> FamilyFilter<'a> {
    pub fn new(allowlist: &'a FamilyAllowlist) -> Self {
        Self {
            allowlist,
            field_override: None,
        }
    }

    /// Always use this 0-based field as the family identifier
    pub fn with_field_index(mut self, field_index: usize) -> Self {
        self.field_override = Some(field_index);
        self
    }

    /// Family field for data lines under `model`
    pub fn field_index(&self, model: Option<ColumnModel>) -> usize {
        self.field_override
            .or_else(|| model.map(|m| m.family_field()))
            .unwrap_or(FAMILY_FIELD_INDEX)
    }

    /// Classify one raw line (trailing newline allowed)
    ///
    /// `model` is the layout of the most recent header. A data line too short
    /// to contain the family field is an error.
    pub fn classify(
        &self,
        line: &str,
        line_number: usize,
        model: Option<ColumnModel>,
    ) -> Result<LineKind, FamilyFilterError> {
        if line.starts_with(COMMENT_MARKER) {
            return Ok(LineKind::Comment);
        }

        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.is_empty() {
            return Ok(LineKind::Blank);
        }

        let index = self.field_index(model);
        let family = fields.get(index).ok_or(FamilyFilterError::TooFewFields {
            line: line_number,
            index,
            found: fields.len(),
        })?;

        if self.allowlist.contains(family) {
            Ok(LineKind::Kept)
        } else {
            Ok(LineKind::Removed)
        }
    }

    /// Keep the lines that would be written, in input order
    pub fn filter_lines<'l, I>(&self, lines: I) -> Result<Vec<&'l str>, FamilyFilterError>
    where
        I: IntoIterator<Item = &'l str>,
    {
        let mut kept = Vec::new();
        let mut model = None;
        for (idx, line) in lines.into_iter().enumerate() {
            let kind = self.classify(line, idx + 1, model)?;
            if kind == LineKind::Comment {
                model = ColumnModel::from_header(line).or(model);
            }
            if kind != LineKind::Removed {
                kept.push(line);
            }
        }
        Ok(kept)
    }

    /// Stream a report from `reader` to `writer`
    ///
    /// Lines are copied verbatim, including their original line endings.
    pub fn filter<R: BufRead, W: Write>(
        &self,
        mut reader: R,
        mut writer: W,
    ) -> Result<FilterStats, FamilyFilterError> {
        let mut stats = FilterStats::default();
        let mut line = String::new();
        let mut line_number = 0;
        let mut model = None;

        loop {
            line.clear();
            if reader.read_line(&mut line)? == 0 {
                break;
            }
            line_number += 1;

            let kind = self.classify(&line, line_number, model)?;
            stats.record(kind);

            if kind == LineKind::Comment {
                if let Some(header) = ColumnModel::from_header(&line) {
                    debug!("Header at line {}: {:?}", line_number, header);
                    model = Some(header);
                }
            }

            if kind != LineKind::Removed {
                writer.write_all(line.as_bytes())?;
            }
        }

        writer.flush()?;
        Ok(stats)
    }

    /// Filter `input` (plain or gzip) into a new plain-text `output`
    pub fn filter_file(&self, input: &Path, output: &Path) -> Result<FilterStats, FamilyFilterError> {
        debug!("Filtering {:?} into {:?}", input, output);

        let reader = open_text_file(input).map_err(|source| FamilyFilterError::FileAccess {
            path: input.to_path_buf(),
            source,
        })?;
        let file = File::create(output).map_err(|source| FamilyFilterError::FileAccess {
            path: output.to_path_buf(),
            source,
        })?;

        let stats = self.filter(reader, BufWriter::new(file))?;

        info!(
            "Filtered {:?}: {} hits kept, {} removed, {} comment lines preserved",
            input, stats.kept, stats.removed, stats.comments
        );

        Ok(stats)
    }
}
