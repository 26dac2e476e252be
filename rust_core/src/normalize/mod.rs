//! Raw table normalization.
//!
//! This module provides:
//! - Player-season normalization (`players`)
//! - Match list normalization (`matches`)
//! - Shared coercion rules, per-field policies and drop accounting
//!
//! Per-record problems never abort normalization unless a field policy says
//! so; they are counted by reason and surfaced in a `NormalizeReport`.

pub mod matches;
pub mod players;

pub use matches::{normalize_matches, NormalizedMatches};
pub use players::{normalize_players, NormalizedPlayers};

use crate::config::FieldPolicy;
use crate::error::{EtlError, EtlResult};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

// ============================================================================
// Drop accounting
// ============================================================================

/// Why a raw record did not make it into the normalized output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DropReason {
    NonNumericAge,
    MissingName,
    MissingTeam,
    Duplicate,
    OtherCompetition,
    MissingDate,
    UnparseableDate,
    MissingResult,
    MissingOpponent,
    UnknownVenue,
    InvalidField,
}

impl DropReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DropReason::NonNumericAge => "non_numeric_age",
            DropReason::MissingName => "missing_name",
            DropReason::MissingTeam => "missing_team",
            DropReason::Duplicate => "duplicate",
            DropReason::OtherCompetition => "other_competition",
            DropReason::MissingDate => "missing_date",
            DropReason::UnparseableDate => "unparseable_date",
            DropReason::MissingResult => "missing_result",
            DropReason::MissingOpponent => "missing_opponent",
            DropReason::UnknownVenue => "unknown_venue",
            DropReason::InvalidField => "invalid_field",
        }
    }
}

/// Dropped-record counts keyed by reason.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DroppedRecordCount(BTreeMap<DropReason, usize>);

impl DroppedRecordCount {
    pub fn record(&mut self, reason: DropReason) {
        *self.0.entry(reason).or_insert(0) += 1;
    }

    pub fn get(&self, reason: DropReason) -> usize {
        self.0.get(&reason).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.0.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (DropReason, usize)> + '_ {
        self.0.iter().map(|(reason, count)| (*reason, *count))
    }
}

impl fmt::Display for DroppedRecordCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("none");
        }
        let parts: Vec<String> = self
            .iter()
            .map(|(reason, count)| format!("{}={}", reason.as_str(), count))
            .collect();
        f.write_str(&parts.join(", "))
    }
}

// ============================================================================
// Field diagnostics
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldProblem {
    Missing,
    NotANumber,
    Negative,
    Fractional,
}

impl FieldProblem {
    pub fn describe(&self) -> &'static str {
        match self {
            FieldProblem::Missing => "value is missing",
            FieldProblem::NotANumber => "value is not a number",
            FieldProblem::Negative => "value is negative",
            FieldProblem::Fractional => "value is not a whole number",
        }
    }
}

/// Typed record of a coercion fallback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldDiagnostic {
    pub row: usize,
    pub column: String,
    pub raw: Option<String>,
    pub problem: FieldProblem,
    pub policy: FieldPolicy,
}

/// Outcome of one normalization pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NormalizeReport {
    pub input_rows: usize,
    pub kept: usize,
    pub dropped: DroppedRecordCount,
    pub diagnostics: Vec<FieldDiagnostic>,
}

// ============================================================================
// Coercion
// ============================================================================

/// Parse a numeric cell the way the feed writes numbers (`7`, `7.0`, `23.5`).
pub fn parse_number(raw: &str) -> Option<f64> {
    raw.trim()
        .replace(',', "")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

/// Coerce a cell into a non-negative whole count.
pub fn coerce_count(raw: Option<&str>) -> Result<u32, FieldProblem> {
    let raw = raw.ok_or(FieldProblem::Missing)?;
    if let Ok(value) = raw.parse::<u32>() {
        return Ok(value);
    }
    let value = parse_number(raw).ok_or(FieldProblem::NotANumber)?;
    if value < 0.0 {
        return Err(FieldProblem::Negative);
    }
    if value.fract() != 0.0 || value > u32::MAX as f64 {
        return Err(FieldProblem::Fractional);
    }
    Ok(value as u32)
}

/// Applies a field policy to one count cell.
pub(crate) struct CountField<'a> {
    pub dataset: &'static str,
    pub column: &'a str,
    pub policy: FieldPolicy,
}

impl CountField<'_> {
    /// `Ok(Some(v))` keeps the record, `Ok(None)` drops it.
    pub fn resolve(
        &self,
        row: usize,
        raw: Option<&str>,
        report: &mut NormalizeReport,
    ) -> EtlResult<Option<u32>> {
        let problem = match coerce_count(raw) {
            Ok(value) => return Ok(Some(value)),
            Err(problem) => problem,
        };

        report.diagnostics.push(FieldDiagnostic {
            row,
            column: self.column.to_string(),
            raw: raw.map(str::to_string),
            problem,
            policy: self.policy,
        });

        match self.policy {
            FieldPolicy::Default => Ok(Some(0)),
            FieldPolicy::Drop => Ok(None),
            FieldPolicy::Fail => Err(EtlError::Parse {
                dataset: self.dataset,
                row,
                column: self.column.to_string(),
                message: format!("{} ({:?})", problem.describe(), raw.unwrap_or("")),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coerce_count_accepts_integers_and_integral_floats() {
        assert_eq!(coerce_count(Some("3")), Ok(3));
        assert_eq!(coerce_count(Some("3.0")), Ok(3));
        assert_eq!(coerce_count(Some("0")), Ok(0));
    }

    #[test]
    fn test_coerce_count_problems() {
        assert_eq!(coerce_count(None), Err(FieldProblem::Missing));
        assert_eq!(coerce_count(Some("abc")), Err(FieldProblem::NotANumber));
        assert_eq!(coerce_count(Some("-1")), Err(FieldProblem::Negative));
        assert_eq!(coerce_count(Some("1.5")), Err(FieldProblem::Fractional));
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("23"), Some(23.0));
        assert_eq!(parse_number("1,234"), Some(1234.0));
        assert_eq!(parse_number("25-123"), None);
        assert_eq!(parse_number("inf"), None);
    }

    #[test]
    fn test_count_field_policies() {
        let mut report = NormalizeReport::default();

        let lenient = CountField { dataset: "players", column: "yellow_cards", policy: FieldPolicy::Default };
        assert_eq!(lenient.resolve(0, Some("2"), &mut report).unwrap(), Some(2));
        assert!(report.diagnostics.is_empty());
        assert_eq!(lenient.resolve(0, None, &mut report).unwrap(), Some(0));
        assert_eq!(report.diagnostics.len(), 1);
        assert_eq!(report.diagnostics[0].problem, FieldProblem::Missing);
        assert_eq!(report.diagnostics[0].raw, None);
        assert_eq!(lenient.resolve(1, Some("x"), &mut report).unwrap(), Some(0));
        assert_eq!(report.diagnostics.len(), 2);
        assert_eq!(report.diagnostics[1].problem, FieldProblem::NotANumber);

        let dropping = CountField { dataset: "players", column: "yellow_cards", policy: FieldPolicy::Drop };
        assert_eq!(dropping.resolve(2, None, &mut report).unwrap(), None);

        let strict = CountField { dataset: "players", column: "yellow_cards", policy: FieldPolicy::Fail };
        let err = strict.resolve(3, Some("x"), &mut report).unwrap_err();
        assert!(matches!(err, EtlError::Parse { row: 3, .. }));
    }

    #[test]
    fn test_dropped_record_count_display() {
        let mut dropped = DroppedRecordCount::default();
        assert_eq!(dropped.to_string(), "none");
        dropped.record(DropReason::NonNumericAge);
        dropped.record(DropReason::NonNumericAge);
        dropped.record(DropReason::MissingTeam);
        assert_eq!(dropped.total(), 3);
        assert_eq!(dropped.get(DropReason::NonNumericAge), 2);
        assert_eq!(dropped.to_string(), "non_numeric_age=2, missing_team=1");
    }
}
