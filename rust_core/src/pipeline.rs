//! End-to-end batch run: schema, normalization, load, inspection.

use crate::config::{LoadConfig, NormalizeConfig};
use crate::db::{ensure_schema, table_counts, Store, TableCounts};
use crate::error::EtlResult;
use crate::loader::{load, LoadReport};
use crate::normalize::{normalize_matches, normalize_players, NormalizeReport};
use crate::raw::RawTable;
use serde::Serialize;
use std::path::Path;
use tracing::info;

/// Everything a batch run reports back to the operator.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub players: NormalizeReport,
    pub matches: NormalizeReport,
    pub load: LoadReport,
    pub counts: TableCounts,
}

/// Normalize both raw tables and load them into `store`.
///
/// Normalization runs to completion before the first write, so a fatal
/// record problem leaves the store untouched.
pub async fn run_pipeline(
    store: &Store,
    players: &RawTable,
    matches: &RawTable,
    normalize_config: &NormalizeConfig,
    load_config: &LoadConfig,
) -> EtlResult<PipelineReport> {
    ensure_schema(store).await?;

    let normalized_players = normalize_players(players, normalize_config)?;
    info!(
        "Players: {} kept of {} (dropped: {})",
        normalized_players.report.kept,
        normalized_players.report.input_rows,
        normalized_players.report.dropped
    );

    let normalized_matches = normalize_matches(matches, normalize_config)?;
    info!(
        "Matches: {} kept of {} (dropped: {})",
        normalized_matches.report.kept,
        normalized_matches.report.input_rows,
        normalized_matches.report.dropped
    );

    let load_report = load(
        store,
        load_config,
        &normalized_players.records,
        &normalized_matches.records,
    )
    .await?;

    let counts = table_counts(store).await?;
    info!("Store now holds {}", counts);

    Ok(PipelineReport {
        players: normalized_players.report,
        matches: normalized_matches.report,
        load: load_report,
        counts,
    })
}

/// Same as [`run_pipeline`], reading both tables from CSV files.
pub async fn run_pipeline_from_paths(
    store: &Store,
    players_csv: impl AsRef<Path>,
    matches_csv: impl AsRef<Path>,
    normalize_config: &NormalizeConfig,
    load_config: &LoadConfig,
) -> EtlResult<PipelineReport> {
    let players = RawTable::from_path(players_csv)?;
    let matches = RawTable::from_path(matches_csv)?;
    run_pipeline(store, &players, &matches, normalize_config, load_config).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EtlError;

    fn players_table() -> RawTable {
        RawTable::from_reader(
            "Player,Nation,Pos,Age,Performance_CrdY,Performance_CrdR,Team\n\
             Bukayo Saka,eng ENG,FW,22,3,0,Arsenal\n\
             Cole Palmer,eng ENG,MF,22,5,0,Chelsea\n\
             Player,Nation,Pos,Age,CrdY,CrdR,Team\n"
                .as_bytes(),
        )
        .unwrap()
    }

    fn matches_table(result: &str) -> RawTable {
        let csv = format!(
            "Date,Time,Comp,Round,Venue,Result,GF,GA,Team,Opponent\n\
             2024-08-17,15:00,Premier League,Matchweek 1,Home,{},2,0,Arsenal,Chelsea\n\
             2024-08-17,15:00,Premier League,Matchweek 1,Away,L,0,2,Chelsea,Arsenal\n",
            result
        );
        RawTable::from_reader(csv.as_bytes()).unwrap()
    }

    #[tokio::test]
    async fn test_pipeline_loads_everything() {
        let store = Store::in_memory().await.unwrap();
        let report = run_pipeline(
            &store,
            &players_table(),
            &matches_table("W"),
            &NormalizeConfig::default(),
            &LoadConfig::default(),
        )
        .await
        .unwrap();

        assert_eq!(report.players.kept, 2);
        assert_eq!(report.players.input_rows, 3);
        assert_eq!(report.matches.kept, 2);
        assert_eq!(report.counts.team, 2);
        assert_eq!(report.counts.player_stat, 2);
        assert_eq!(report.counts.matches, 1);
        assert_eq!(report.counts.match_result, 2);
    }

    #[tokio::test]
    async fn test_pipeline_failure_leaves_schema_but_no_rows() {
        let store = Store::in_memory().await.unwrap();
        let err = run_pipeline(
            &store,
            &players_table(),
            &matches_table("P"),
            &NormalizeConfig::default(),
            &LoadConfig::default(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, EtlError::UnknownResultCode(_)));
        assert_eq!(table_counts(&store).await.unwrap().total(), 0);
    }
}
