//! Tabular query output and chart hints.

use super::catalog::QueryTemplate;
use crate::error::EtlResult;
use serde::Serialize;
use std::fmt;
use std::io::Write;

/// One value of a result row.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl Cell {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Cell::Text(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Cell::Integer(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Real(value) => Some(*value),
            Cell::Integer(value) => Some(*value as f64),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Null => Ok(()),
            Cell::Integer(value) => write!(f, "{}", value),
            Cell::Real(value) => write!(f, "{:.2}", value),
            Cell::Text(value) => f.write_str(value),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Bar,
    GroupedBar,
    Pie,
}

/// How the presentation layer should draw a result.
///
/// For `Pie`, `x` names the slice labels and `y[0]` the slice values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub title: String,
    pub x: &'static str,
    pub y: Vec<&'static str>,
}

impl ChartSpec {
    pub fn new(kind: ChartKind, title: &str, x: &'static str, y: Vec<&'static str>) -> Self {
        Self {
            kind,
            title: title.to_string(),
            x,
            y,
        }
    }
}

/// Named columns plus rows, in the template's declared order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TabularResult {
    pub template: QueryTemplate,
    pub team: Option<String>,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
    pub chart: Option<ChartSpec>,
}

impl TabularResult {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Every cell of the named column, top to bottom. Empty when the
    /// column does not exist.
    pub fn column(&self, name: &str) -> Vec<&Cell> {
        match self.column_index(name) {
            Some(idx) => self.rows.iter().filter_map(|row| row.get(idx)).collect(),
            None => Vec::new(),
        }
    }

    /// Write the result as CSV with a header row. Nulls become empty fields.
    pub fn write_csv<W: Write>(&self, writer: W) -> EtlResult<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        csv_writer.write_record(&self.columns)?;
        for row in &self.rows {
            csv_writer.write_record(row.iter().map(|cell| cell.to_string()))?;
        }
        csv_writer.flush()?;
        Ok(())
    }
}
