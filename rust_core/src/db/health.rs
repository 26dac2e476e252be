//! Store health and inspection
//!
//! Liveness check plus per-table row counts, used after a load to confirm
//! what landed in the store.

use super::schema::SCHEMA_TABLES;
use super::Store;
use crate::error::EtlResult;
use serde::Serialize;
use std::fmt;

/// Check if the store answers queries
pub async fn check_store_health(store: &Store) -> EtlResult<()> {
    sqlx::query("SELECT 1").fetch_one(store.pool()).await?;
    Ok(())
}

/// Row counts of every schema table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TableCounts {
    pub competition: i64,
    pub season: i64,
    pub team: i64,
    pub player: i64,
    pub player_stat: i64,
    pub matches: i64,
    pub match_result: i64,
}

impl TableCounts {
    pub fn total(&self) -> i64 {
        self.competition
            + self.season
            + self.team
            + self.player
            + self.player_stat
            + self.matches
            + self.match_result
    }

    fn slot(&mut self, table: &str) -> Option<&mut i64> {
        match table {
            "competition" => Some(&mut self.competition),
            "season" => Some(&mut self.season),
            "team" => Some(&mut self.team),
            "player" => Some(&mut self.player),
            "player_stat" => Some(&mut self.player_stat),
            "matches" => Some(&mut self.matches),
            "match_result" => Some(&mut self.match_result),
            _ => None,
        }
    }
}

impl fmt::Display for TableCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "competitions={} seasons={} teams={} players={} player_stats={} matches={} match_results={}",
            self.competition,
            self.season,
            self.team,
            self.player,
            self.player_stat,
            self.matches,
            self.match_result
        )
    }
}

/// Count rows in every table of the model.
pub async fn table_counts(store: &Store) -> EtlResult<TableCounts> {
    let mut counts = TableCounts::default();
    let mut conn = store.pool().acquire().await?;

    for table in SCHEMA_TABLES.iter().copied() {
        // Identifiers come from the fixed table list, never from input
        let sql = format!("SELECT COUNT(*) FROM {}", table);
        let count: i64 = sqlx::query_scalar(&sql).fetch_one(&mut *conn).await?;
        if let Some(slot) = counts.slot(table) {
            *slot = count;
        }
    }

    Ok(counts)
}
