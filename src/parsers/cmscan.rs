// ==============================================================================
// parsers/cmscan.rs - Infernal cmscan Tabular Report Parser
// ==============================================================================
// Description: Streaming parser for cmscan --tblout reports (fmt 1 and fmt 2)
// Author: Matt Barham
// Created: 2026-10-14
// Modified: 2026-10-14
// Version: 1.0.0
// ==============================================================================
// Format: Whitespace-aligned text, '#' comment lines, header inside a comment
// Example (--fmt 2, columns abbreviated):
//   #idx target name  accession query name ... seq len description of target
//   #--- ------------ --------- ---------- ... ------- ---------------------
//   1    5S_rRNA      RF00001   contig_1   ...  250000 5S ribosomal RNA
//   #
//   # Program:         cmscan
// The last column is free text and may contain spaces, so a data line is
// split into N-1 positional fields and the remaining tokens are re-joined.
// ==============================================================================

use std::io::BufRead;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use crate::models::CmscanHit;
use crate::parsers::open_text_file;

/// Marker that starts comment, separator and header lines
pub const COMMENT_MARKER: char = '#';

/// Columns of `cmscan --tblout --fmt 2` (Infernal 1.1.5)
pub const FMT2_COLUMNS: [&str; 29] = [
    "idx",
    "target name",
    "accession1",
    "query name",
    "accession2",
    "clan name",
    "mdl",
    "mdl from",
    "mdl to",
    "seq from",
    "seq to",
    "strand",
    "trunc",
    "pass",
    "gc",
    "bias",
    "score",
    "E-value",
    "inc",
    "olp",
    "anyidx",
    "afrct1",
    "afrct2",
    "winidx",
    "wfrct1",
    "wfrct2",
    "mdl len",
    "seq len",
    "description of target",
];

/// Columns of the default `cmscan --tblout` layout
pub const FMT1_COLUMNS: [&str; 18] = [
    "target name",
    "accession1",
    "query name",
    "accession2",
    "mdl",
    "mdl from",
    "mdl to",
    "seq from",
    "seq to",
    "strand",
    "trunc",
    "pass",
    "gc",
    "bias",
    "score",
    "E-value",
    "inc",
    "description of target",
];

/// Columns never needed downstream of the parser
pub const DROPPED_COLUMNS: [&str; 16] = [
    "accession2",
    "clan name",
    "mdl",
    "mdl from",
    "mdl to",
    "pass",
    "score",
    "inc",
    "olp",
    "anyidx",
    "afrct1",
    "afrct2",
    "winidx",
    "wfrct1",
    "wfrct2",
    "mdl len",
];

const TARGET_COLUMN: &str = "target name";
const QUERY_COLUMN: &str = "query name";
const BIAS_COLUMN: &str = "bias";
const EVALUE_COLUMN: &str = "E-value";

/// Errors that can occur during cmscan report parsing
#[derive(Error, Debug)]
pub enum CmscanParseError {
    #[error("Failed to open cmscan report {}", path.display())]
    FileAccess {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    IoError(#[from] std::io::Error),

    #[error("Data line {line} appears before any column header")]
    MissingHeader { line: usize },

    #[error("Invalid line format at line {line}: expected at least {expected} fields, found {found}")]
    TooFewFields {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("Invalid {column} value at line {line}: '{value}'")]
    InvalidNumber {
        line: usize,
        column: &'static str,
        value: String,
    },
}

/// Column layout announced by a report header line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnModel {
    /// Default tblout layout, header starts with `#target name`
    Format1,
    /// `--fmt 2` layout, header starts with `#idx`
    Format2,
}

impl ColumnModel {
    /// Detect the column model from a header line, `None` for any other line
    pub fn from_header(line: &str) -> Option<Self> {
        let rest = line.trim().strip_prefix(COMMENT_MARKER)?;
        let first_token = rest.trim_start_matches(COMMENT_MARKER).split_whitespace().next()?;

        match first_token {
            "idx" => Some(ColumnModel::Format2),
            "target" => Some(ColumnModel::Format1),
            _ => None,
        }
    }

    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            ColumnModel::Format1 => &FMT1_COLUMNS,
            ColumnModel::Format2 => &FMT2_COLUMNS,
        }
    }

    /// Positional fields preceding the free-text description
    pub fn scalar_fields(&self) -> usize {
        self.columns().len() - 1
    }

    /// 0-based whitespace field holding the Rfam accession
    pub fn family_field(&self) -> usize {
        match self {
            ColumnModel::Format1 => 1,
            ColumnModel::Format2 => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseState {
    SeekingHeader,
    ParsingData(ColumnModel),
    Finished,
}

/// cmscan report parser
#[derive(Debug, Clone)]
pub struct CmscanParser {
    /// Column names removed from every parsed hit
    pub dropped_columns: Vec<String>,
}

impl Default for CmscanParser {
    fn default() -> Self {
        Self {
            dropped_columns: DROPPED_COLUMNS.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl CmscanParser {
    /// Create a parser that drops [`DROPPED_COLUMNS`]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the set of dropped columns
    pub fn with_dropped_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dropped_columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Parse a whole cmscan report file (plain or gzip)
    ///
    /// # Arguments
    /// * `path` - Path to the report (e.g. `results/ncRNAs/sample1.cmscan`)
    ///
    /// # Returns
    /// * `Ok(Vec<CmscanHit>)` - One hit per data line, in file order
    /// * `Err(CmscanParseError)` - First error encountered; nothing is skipped
    pub fn parse(&self, path: impl AsRef<Path>) -> Result<Vec<CmscanHit>, CmscanParseError> {
        let path = path.as_ref();
        let reader = open_text_file(path).map_err(|source| CmscanParseError::FileAccess {
            path: path.to_path_buf(),
            source,
        })?;

        self.records(reader).collect()
    }

    /// Lazily parse hits from any buffered reader
    ///
    /// The iterator stops after yielding the first error.
    pub fn records<R: BufRead>(&self, reader: R) -> CmscanRecords<'_, R> {
        CmscanRecords {
            parser: self,
            lines: reader.lines(),
            line_number: 0,
            state: ParseState::SeekingHeader,
        }
    }

    /// Parse a single data line under the given column model
    fn parse_line(
        &self,
        model: ColumnModel,
        line: &str,
        line_number: usize,
    ) -> Result<CmscanHit, CmscanParseError> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let scalar_fields = model.scalar_fields();

        if tokens.len() < scalar_fields {
            return Err(CmscanParseError::TooFewFields {
                line: line_number,
                expected: scalar_fields,
                found: tokens.len(),
            });
        }

        let (scalars, free_text) = tokens.split_at(scalar_fields);
        let description = free_text.join(" ");

        let record: Vec<(&'static str, String)> = model
            .columns()
            .iter()
            .copied()
            .zip(
                scalars
                    .iter()
                    .map(|token| token.to_string())
                    .chain(std::iter::once(description.clone())),
            )
            .collect();

        let target_name = column_value(&record, TARGET_COLUMN).to_string();
        let query_name = column_value(&record, QUERY_COLUMN).to_string();
        let bias = parse_number(&record, BIAS_COLUMN, line_number)?;
        let evalue = parse_number(&record, EVALUE_COLUMN, line_number)?;

        let fields = record
            .into_iter()
            .filter(|(column, _)| !self.dropped_columns.iter().any(|dropped| dropped == column))
            .collect();

        Ok(CmscanHit {
            line_number,
            target_name,
            query_name,
            bias,
            evalue,
            description,
            fields,
        })
    }
}

fn column_value<'r>(record: &'r [(&'static str, String)], column: &str) -> &'r str {
    record
        .iter()
        .find(|(name, _)| *name == column)
        .map(|(_, value)| value.as_str())
        .unwrap_or_default()
}

fn parse_number(
    record: &[(&'static str, String)],
    column: &'static str,
    line_number: usize,
) -> Result<f64, CmscanParseError> {
    let value = column_value(record, column);
    value.parse::<f64>().map_err(|_| CmscanParseError::InvalidNumber {
        line: line_number,
        column,
        value: value.to_string(),
    })
}

/// Lazy, non-restartable sequence of hits from one report
pub struct CmscanRecords<'a, R> {
    parser: &'a CmscanParser,
    lines: std::io::Lines<R>,
    line_number: usize,
    state: ParseState,
}

impl<R: BufRead> Iterator for CmscanRecords<'_, R> {
    type Item = Result<CmscanHit, CmscanParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.state == ParseState::Finished {
                return None;
            }

            let line = match self.lines.next() {
                None => {
                    self.state = ParseState::Finished;
                    return None;
                }
                Some(Err(e)) => {
                    self.state = ParseState::Finished;
                    return Some(Err(e.into()));
                }
                Some(Ok(line)) => line,
            };
            self.line_number += 1;

            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            if line.starts_with(COMMENT_MARKER) {
                // Separators and trailers leave the column model untouched
                if let Some(model) = ColumnModel::from_header(line) {
                    debug!("Header at line {}: {:?}", self.line_number, model);
                    self.state = ParseState::ParsingData(model);
                }
                continue;
            }

            let result = match self.state {
                ParseState::ParsingData(model) => {
                    self.parser.parse_line(model, line, self.line_number)
                }
                _ => Err(CmscanParseError::MissingHeader {
                    line: self.line_number,
                }),
            };

            if result.is_err() {
                self.state = ParseState::Finished;
            }
            return Some(result);
        }
    }
}
