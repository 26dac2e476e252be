//! Match list normalization.

use super::{CountField, DropReason, NormalizeReport};
use crate::config::NormalizeConfig;
use crate::error::{EtlError, EtlResult};
use crate::models::{MatchRecord, Venue};
use crate::raw::RawTable;
use chrono::NaiveDate;
use rustc_hash::FxHashSet;
use tracing::{info, warn};

pub const DATASET: &str = "matches";

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%Y/%m/%d"];

#[derive(Debug, Clone, Default)]
pub struct NormalizedMatches {
    pub records: Vec<MatchRecord>,
    pub report: NormalizeReport,
}

/// Parse a fixture date. Datetime strings are accepted by their date part.
pub fn parse_match_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            raw.get(..10)
                .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
        })
}

/// Reduce the scraped match table to one record per team per fixture,
/// restricted to the configured competition.
pub fn normalize_matches(table: &RawTable, config: &NormalizeConfig) -> EtlResult<NormalizedMatches> {
    let mut report = NormalizeReport {
        input_rows: table.len(),
        ..Default::default()
    };
    let mut records = Vec::new();
    let mut seen: FxHashSet<(NaiveDate, String, String)> = FxHashSet::default();

    let goals_for = CountField {
        dataset: DATASET,
        column: "goals_for",
        policy: config.goal_policy,
    };
    let goals_against = CountField {
        dataset: DATASET,
        column: "goals_against",
        policy: config.goal_policy,
    };

    for raw in table.records() {
        let Some(competition) = raw
            .get("Comp")
            .filter(|comp| comp.contains(config.competition_filter.as_str()))
        else {
            report.dropped.record(DropReason::OtherCompetition);
            continue;
        };

        let date = match raw.get("Date") {
            None => {
                report.dropped.record(DropReason::MissingDate);
                continue;
            }
            Some(text) => match parse_match_date(text) {
                Some(date) => date,
                None => {
                    report.dropped.record(DropReason::UnparseableDate);
                    continue;
                }
            },
        };

        let Some(result) = raw.get("Result") else {
            report.dropped.record(DropReason::MissingResult);
            continue;
        };
        let Some(team) = raw.get("Team") else {
            report.dropped.record(DropReason::MissingTeam);
            continue;
        };
        let Some(opponent) = raw.get("Opponent") else {
            report.dropped.record(DropReason::MissingOpponent);
            continue;
        };
        let Some(venue) = raw.get("Venue").and_then(Venue::parse) else {
            report.dropped.record(DropReason::UnknownVenue);
            continue;
        };

        let Some(gf) = goals_for.resolve(raw.row(), raw.get("GF"), &mut report)? else {
            report.dropped.record(DropReason::InvalidField);
            continue;
        };
        let Some(ga) = goals_against.resolve(raw.row(), raw.get("GA"), &mut report)? else {
            report.dropped.record(DropReason::InvalidField);
            continue;
        };

        if !seen.insert((date, team.to_string(), opponent.to_string())) {
            report.dropped.record(DropReason::Duplicate);
            continue;
        }

        records.push(MatchRecord {
            date,
            time: raw.get("Time").map(str::to_string),
            competition: competition.to_string(),
            round: raw.get("Round").map(str::to_string),
            venue,
            result: result.to_string(),
            goals_for: gf,
            goals_against: ga,
            team: team.to_string(),
            opponent: opponent.to_string(),
        });
    }

    report.kept = records.len();

    if report.dropped.total() > 0 {
        warn!("Dropped {} match rows ({})", report.dropped.total(), report.dropped);
    }
    if records.is_empty() {
        return Err(EtlError::EmptyDataset { dataset: DATASET });
    }

    info!(
        "Normalized matches: {} of {} rows kept, {} field diagnostics",
        report.kept,
        report.input_rows,
        report.diagnostics.len()
    );

    Ok(NormalizedMatches { records, report })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FieldPolicy;

    const HEADERS: [&str; 12] = [
        "Date", "Time", "Comp", "Round", "Venue", "Result", "GF", "GA", "Opponent", "xG", "Poss", "Team",
    ];

    fn table(rows: Vec<Vec<&str>>) -> RawTable {
        RawTable::new(HEADERS, rows)
    }

    #[test]
    fn test_parse_match_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 8, 17).unwrap();
        assert_eq!(parse_match_date("2024-08-17"), Some(expected));
        assert_eq!(parse_match_date("17/08/2024"), Some(expected));
        assert_eq!(parse_match_date("2024-08-17 00:00:00"), Some(expected));
        assert_eq!(parse_match_date("Matchweek 1"), None);
    }

    #[test]
    fn test_normalizes_match_rows() {
        let table = table(vec![vec![
            "2024-08-17", "15:00", "Premier League", "Matchweek 1", "Home", "W", "2.0", "0.0",
            "Wolves", "1.2", "53", "Arsenal",
        ]]);

        let out = normalize_matches(&table, &NormalizeConfig::default()).unwrap();
        assert_eq!(out.records.len(), 1);

        let m = &out.records[0];
        assert_eq!(m.date, NaiveDate::from_ymd_opt(2024, 8, 17).unwrap());
        assert_eq!(m.time.as_deref(), Some("15:00"));
        assert_eq!(m.round.as_deref(), Some("Matchweek 1"));
        assert_eq!(m.venue, Venue::Home);
        assert_eq!(m.result, "W");
        assert_eq!((m.goals_for, m.goals_against), (2, 0));
        assert_eq!(m.team, "Arsenal");
        assert_eq!(m.opponent, "Wolves");
    }

    #[test]
    fn test_other_competitions_and_bad_dates_are_dropped() {
        let table = table(vec![
            vec!["2024-08-17", "15:00", "Premier League", "Matchweek 1", "Home", "W", "2", "0", "Wolves", "", "", "Arsenal"],
            vec!["2024-09-19", "20:00", "Champions Lg", "League phase", "Away", "D", "0", "0", "Atalanta", "", "", "Arsenal"],
            vec!["", "15:00", "Premier League", "Matchweek 2", "Away", "W", "2", "0", "Aston Villa", "", "", "Arsenal"],
            vec!["soon", "15:00", "Premier League", "Matchweek 3", "Home", "L", "0", "1", "Brighton", "", "", "Arsenal"],
        ]);

        let out = normalize_matches(&table, &NormalizeConfig::default()).unwrap();
        assert_eq!(out.records.len(), 1);
        assert_eq!(out.report.dropped.get(DropReason::OtherCompetition), 1);
        assert_eq!(out.report.dropped.get(DropReason::MissingDate), 1);
        assert_eq!(out.report.dropped.get(DropReason::UnparseableDate), 1);
    }

    #[test]
    fn test_missing_goals_become_zero() {
        let table = table(vec![vec![
            "2024-08-17", "", "Premier League", "", "Away", "D", "", "", "Wolves", "", "", "Arsenal",
        ]]);

        let out = normalize_matches(&table, &NormalizeConfig::default()).unwrap();
        let m = &out.records[0];
        assert_eq!((m.goals_for, m.goals_against), (0, 0));
        let columns: Vec<_> = out.report.diagnostics.iter().map(|d| d.column.as_str()).collect();
        assert_eq!(columns, vec!["goals_for", "goals_against"]);
        assert_eq!(m.time, None);
        assert_eq!(m.round, None);
    }

    #[test]
    fn test_goal_policy_drop() {
        let table = table(vec![
            vec!["2024-08-17", "", "Premier League", "", "Away", "D", "x", "0", "Wolves", "", "", "Arsenal"],
            vec!["2024-08-24", "", "Premier League", "", "Home", "W", "2", "0", "Brighton", "", "", "Arsenal"],
        ]);
        let config = NormalizeConfig {
            goal_policy: FieldPolicy::Drop,
            ..Default::default()
        };

        let out = normalize_matches(&table, &config).unwrap();
        assert_eq!(out.records.len(), 1);
        assert_eq!(out.report.dropped.get(DropReason::InvalidField), 1);
        assert_eq!(out.report.diagnostics[0].column, "goals_for");
    }

    #[test]
    fn test_missing_references_and_venue_are_dropped() {
        let table = table(vec![
            vec!["2024-08-17", "", "Premier League", "", "Home", "", "1", "0", "Wolves", "", "", "Arsenal"],
            vec!["2024-08-18", "", "Premier League", "", "Home", "W", "1", "0", "", "", "", "Arsenal"],
            vec!["2024-08-19", "", "Premier League", "", "Home", "W", "1", "0", "Wolves", "", "", ""],
            vec!["2024-08-20", "", "Premier League", "", "Somewhere", "W", "1", "0", "Wolves", "", "", "Arsenal"],
            vec!["2024-08-21", "", "Premier League", "", "Home", "W", "1", "0", "Wolves", "", "", "Arsenal"],
            vec!["2024-08-21", "", "Premier League", "", "Home", "W", "1", "0", "Wolves", "", "", "Arsenal"],
        ]);

        let out = normalize_matches(&table, &NormalizeConfig::default()).unwrap();
        assert_eq!(out.records.len(), 1);
        assert_eq!(out.report.dropped.get(DropReason::MissingResult), 1);
        assert_eq!(out.report.dropped.get(DropReason::MissingOpponent), 1);
        assert_eq!(out.report.dropped.get(DropReason::MissingTeam), 1);
        assert_eq!(out.report.dropped.get(DropReason::UnknownVenue), 1);
        assert_eq!(out.report.dropped.get(DropReason::Duplicate), 1);
    }

    #[test]
    fn test_no_matching_competition_is_empty_dataset() {
        let table = table(vec![vec![
            "2024-08-17", "", "FA Cup", "", "Home", "W", "1", "0", "Wolves", "", "", "Arsenal",
        ]]);
        let err = normalize_matches(&table, &NormalizeConfig::default()).unwrap_err();
        assert!(matches!(err, EtlError::EmptyDataset { dataset: "matches" }));
    }
}
