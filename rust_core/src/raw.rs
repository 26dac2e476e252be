//! Raw tabular feeds as produced by the external scraper.
//!
//! The scraper writes one CSV per dataset. Column labels are irregular:
//! multi-level HTML headers are flattened by joining the levels with `_`,
//! so a player table may carry `Unnamed: 0_level_0_Player` next to
//! `Performance_CrdY`. Labels are canonicalized on read; cells are kept as
//! text and typed later by the normalizer.

use crate::error::EtlResult;
use rustc_hash::FxHashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// Column-labelled table of text cells.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    headers: Vec<String>,
    index: FxHashMap<String, usize>,
    rows: Vec<Vec<String>>,
}

impl RawTable {
    /// Build a table from already-split cells. Mostly useful for tests and
    /// for callers that receive rows from somewhere other than a CSV file.
    pub fn new<H, S>(headers: H, rows: Vec<Vec<S>>) -> Self
    where
        H: IntoIterator,
        H::Item: AsRef<str>,
        S: Into<String>,
    {
        let headers: Vec<String> = headers
            .into_iter()
            .map(|h| canonical_label(h.as_ref()))
            .collect();
        let rows = rows
            .into_iter()
            .map(|row| row.into_iter().map(Into::into).collect())
            .collect();
        Self::with_index(headers, rows)
    }

    fn with_index(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let mut index = FxHashMap::default();
        for (i, header) in headers.iter().enumerate() {
            // First occurrence wins when two labels collapse to the same name
            index.entry(header.clone()).or_insert(i);
        }
        Self { headers, index, rows }
    }

    /// Read a CSV document with a header row. Ragged rows are tolerated.
    pub fn from_reader<R: Read>(reader: R) -> EtlResult<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers: Vec<String> = csv_reader
            .headers()?
            .iter()
            .map(canonical_label)
            .collect();

        let mut rows = Vec::new();
        for record in csv_reader.records() {
            let record = record?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        debug!("Read raw table: {} columns, {} rows", headers.len(), rows.len());
        Ok(Self::with_index(headers, rows))
    }

    pub fn from_path(path: impl AsRef<Path>) -> EtlResult<Self> {
        let file = File::open(path.as_ref())?;
        Self::from_reader(file)
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn has_column(&self, label: &str) -> bool {
        self.index.contains_key(label)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn records(&self) -> impl Iterator<Item = RawRecord<'_>> {
        self.rows.iter().enumerate().map(move |(row, cells)| RawRecord {
            table: self,
            row,
            cells,
        })
    }
}

/// Borrowed view of one row.
#[derive(Debug, Clone, Copy)]
pub struct RawRecord<'a> {
    table: &'a RawTable,
    row: usize,
    cells: &'a [String],
}

impl<'a> RawRecord<'a> {
    /// Zero-based position of the row in its table (header excluded).
    pub fn row(&self) -> usize {
        self.row
    }

    /// Trimmed cell under `label`; blank or absent cells are `None`.
    pub fn get(&self, label: &str) -> Option<&'a str> {
        let idx = *self.table.index.get(label)?;
        let value = self.cells.get(idx)?.trim();
        if value.is_empty() || is_null_sentinel(value) {
            None
        } else {
            Some(value)
        }
    }
}

/// Text the scraper writes for a missing value.
fn is_null_sentinel(value: &str) -> bool {
    matches!(value, "NaN" | "nan" | "None" | "NaT")
}

/// Canonicalize a flattened header label.
///
/// Drops leading pandas placeholder levels (`Unnamed: 3_level_0`) and
/// surrounding whitespace. Labels that are nothing but a placeholder are
/// returned trimmed.
pub fn canonical_label(label: &str) -> String {
    let mut rest = label.trim();
    while let Some(stripped) = strip_placeholder_level(rest) {
        if stripped.is_empty() {
            break;
        }
        rest = stripped;
    }
    rest.trim().to_string()
}

fn strip_placeholder_level(label: &str) -> Option<&str> {
    let after = label.strip_prefix("Unnamed:")?;
    let level_at = after.find("_level_")?;
    let tail = &after[level_at + "_level_".len()..];
    let digits = tail.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits == 0 {
        return None;
    }
    let tail = &tail[digits..];
    Some(tail.strip_prefix('_').unwrap_or(tail))
}
