//! Player-season table normalization.

use super::{CountField, DropReason, NormalizeReport};
use crate::config::NormalizeConfig;
use crate::error::{EtlError, EtlResult};
use crate::models::PlayerRecord;
use crate::raw::RawTable;
use rustc_hash::FxHashSet;
use tracing::{info, warn};

pub const DATASET: &str = "players";

/// Canonical attributes a player row is reduced to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerColumn {
    Name,
    Nationality,
    Position,
    Age,
    YellowCards,
    RedCards,
    Team,
}

/// Source label -> canonical attribute. Anything else in the feed is ignored.
pub const PLAYER_COLUMN_MAP: &[(&str, PlayerColumn)] = &[
    ("Player", PlayerColumn::Name),
    ("Nation", PlayerColumn::Nationality),
    ("Pos", PlayerColumn::Position),
    ("Age", PlayerColumn::Age),
    ("Performance_CrdY", PlayerColumn::YellowCards),
    ("Performance_CrdR", PlayerColumn::RedCards),
    ("Team", PlayerColumn::Team),
];

impl PlayerColumn {
    pub fn source_label(&self) -> &'static str {
        PLAYER_COLUMN_MAP
            .iter()
            .find(|(_, column)| column == self)
            .map(|(label, _)| *label)
            .unwrap_or_default()
    }

    pub fn canonical_name(&self) -> &'static str {
        match self {
            PlayerColumn::Name => "name",
            PlayerColumn::Nationality => "nationality",
            PlayerColumn::Position => "position",
            PlayerColumn::Age => "age",
            PlayerColumn::YellowCards => "yellow_cards",
            PlayerColumn::RedCards => "red_cards",
            PlayerColumn::Team => "team",
        }
    }
}

/// Goals and assists are not part of this feed.
const DEFAULT_GOALS: u32 = 0;
const DEFAULT_ASSISTS: u32 = 0;
/// Each row stands for one appearance record.
const DEFAULT_MATCHES_PLAYED: u32 = 1;

#[derive(Debug, Clone, Default)]
pub struct NormalizedPlayers {
    pub records: Vec<PlayerRecord>,
    pub report: NormalizeReport,
}

/// Reduce the scraped player table to well-typed records keyed by
/// (name, team label).
pub fn normalize_players(table: &RawTable, config: &NormalizeConfig) -> EtlResult<NormalizedPlayers> {
    let mut report = NormalizeReport {
        input_rows: table.len(),
        ..Default::default()
    };
    let mut records = Vec::new();
    let mut seen: FxHashSet<(String, String)> = FxHashSet::default();

    let yellow = CountField {
        dataset: DATASET,
        column: PlayerColumn::YellowCards.canonical_name(),
        policy: config.card_policy,
    };
    let red = CountField {
        dataset: DATASET,
        column: PlayerColumn::RedCards.canonical_name(),
        policy: config.card_policy,
    };

    for raw in table.records() {
        let field = |column: PlayerColumn| raw.get(column.source_label());

        // Squad/opponent total rows carry no age
        if !field(PlayerColumn::Age).is_some_and(is_numeric_age) {
            report.dropped.record(DropReason::NonNumericAge);
            continue;
        }

        let Some(name) = field(PlayerColumn::Name) else {
            report.dropped.record(DropReason::MissingName);
            continue;
        };
        let Some(team) = field(PlayerColumn::Team) else {
            report.dropped.record(DropReason::MissingTeam);
            continue;
        };

        let Some(yellow_cards) = yellow.resolve(raw.row(), field(PlayerColumn::YellowCards), &mut report)? else {
            report.dropped.record(DropReason::InvalidField);
            continue;
        };
        let Some(red_cards) = red.resolve(raw.row(), field(PlayerColumn::RedCards), &mut report)? else {
            report.dropped.record(DropReason::InvalidField);
            continue;
        };

        if !seen.insert((name.to_string(), team.to_string())) {
            report.dropped.record(DropReason::Duplicate);
            continue;
        }

        records.push(PlayerRecord {
            name: name.to_string(),
            nationality: field(PlayerColumn::Nationality).map(str::to_string),
            position: field(PlayerColumn::Position).map(str::to_string),
            team: team.to_string(),
            goals: DEFAULT_GOALS,
            assists: DEFAULT_ASSISTS,
            matches_played: DEFAULT_MATCHES_PLAYED,
            yellow_cards,
            red_cards,
        });
    }

    report.kept = records.len();

    if report.dropped.total() > 0 {
        warn!("Dropped {} player rows ({})", report.dropped.total(), report.dropped);
    }
    if records.is_empty() {
        return Err(EtlError::EmptyDataset { dataset: DATASET });
    }

    info!(
        "Normalized players: {} of {} rows kept, {} field diagnostics",
        report.kept,
        report.input_rows,
        report.diagnostics.len()
    );

    Ok(NormalizedPlayers { records, report })
}

/// Plain decimal age. Thousands separators and `years-days` forms are
/// rejected.
fn is_numeric_age(raw: &str) -> bool {
    raw.parse::<f64>().map(|age| age.is_finite()).unwrap_or(false)
}
