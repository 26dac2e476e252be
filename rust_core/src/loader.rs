//! Relational loader.
//!
//! Turns normalized player and match records into the entity graph,
//! resolving team labels to surrogate ids and synthesizing the mirrored
//! pair of `match_result` rows for every home-perspective fixture.
//!
//! The whole load runs in one transaction: any error rolls back every
//! insert made by the attempt.

use crate::config::LoadConfig;
use crate::db::Store;
use crate::error::{EtlError, EtlResult};
use crate::models::{MatchRecord, Outcome, PlayerRecord, ResultCode, Venue};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;
use sqlx::SqliteConnection;
use tracing::{debug, error, info, warn};

/// Rows written by one successful load
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub competition_id: i64,
    pub season_id: i64,
    pub teams: usize,
    pub players: usize,
    pub player_stats: usize,
    pub matches: usize,
    pub match_results: usize,
}

/// Distinct team labels across both sides of every match record, in
/// first-seen order: all `team` values first, then all `opponent` values.
pub fn distinct_team_labels(matches: &[MatchRecord]) -> Vec<&str> {
    let mut seen = FxHashSet::default();
    matches
        .iter()
        .map(|m| m.team.as_str())
        .chain(matches.iter().map(|m| m.opponent.as_str()))
        .filter(|label| seen.insert(*label))
        .collect()
}

/// Name -> surrogate id lookup built while inserting teams.
#[derive(Debug, Default)]
struct TeamLookup(FxHashMap<String, i64>);

impl TeamLookup {
    fn resolve(&self, label: &str, context: impl FnOnce() -> String) -> EtlResult<i64> {
        self.0
            .get(label)
            .copied()
            .ok_or_else(|| EtlError::UnresolvedTeamReference {
                team: label.to_string(),
                context: context(),
            })
    }
}

/// Load one season into `store`. All-or-nothing.
pub async fn load(
    store: &Store,
    config: &LoadConfig,
    players: &[PlayerRecord],
    matches: &[MatchRecord],
) -> EtlResult<LoadReport> {
    let mut tx = store.pool().begin().await?;

    match load_in_tx(&mut tx, config, players, matches).await {
        Ok(report) => {
            tx.commit().await?;
            info!(
                "Load committed: {} teams, {} players, {} matches, {} match results",
                report.teams, report.players, report.matches, report.match_results
            );
            Ok(report)
        }
        Err(e) => {
            warn!("Load failed, rolling back: {}", e);
            if let Err(rollback_err) = tx.rollback().await {
                error!("Rollback failed: {}", rollback_err);
            }
            Err(e)
        }
    }
}

async fn load_in_tx(
    conn: &mut SqliteConnection,
    config: &LoadConfig,
    players: &[PlayerRecord],
    matches: &[MatchRecord],
) -> EtlResult<LoadReport> {
    let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM competition")
        .fetch_one(&mut *conn)
        .await?;
    if existing > 0 {
        return Err(EtlError::StoreNotEmpty);
    }

    let mut report = LoadReport::default();

    // 1. Competition and season
    report.competition_id = sqlx::query("INSERT INTO competition (name) VALUES (?1)")
        .bind(&config.competition_name)
        .execute(&mut *conn)
        .await?
        .last_insert_rowid();
    report.season_id = sqlx::query("INSERT INTO season (label) VALUES (?1)")
        .bind(&config.season_label)
        .execute(&mut *conn)
        .await?
        .last_insert_rowid();

    // 2. Teams
    let mut teams = TeamLookup::default();
    for label in distinct_team_labels(matches) {
        let id = sqlx::query("INSERT INTO team (name, competition_id, season_id) VALUES (?1, ?2, ?3)")
            .bind(label)
            .bind(report.competition_id)
            .bind(report.season_id)
            .execute(&mut *conn)
            .await?
            .last_insert_rowid();
        teams.0.insert(label.to_string(), id);
    }
    report.teams = teams.0.len();
    debug!("Inserted {} teams", report.teams);

    // 3. Players and their season stats
    for player in players {
        let team_id = teams.resolve(&player.team, || format!("player '{}'", player.name))?;

        let player_id = sqlx::query(
            "INSERT INTO player (name, position, nationality, team_id) VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(&player.name)
        .bind(&player.position)
        .bind(&player.nationality)
        .bind(team_id)
        .execute(&mut *conn)
        .await?
        .last_insert_rowid();
        report.players += 1;

        sqlx::query(
            "INSERT INTO player_stat (player_id, goals, assists, matches_played, yellow_cards, red_cards) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(player_id)
        .bind(player.goals as i64)
        .bind(player.assists as i64)
        .bind(player.matches_played as i64)
        .bind(player.yellow_cards as i64)
        .bind(player.red_cards as i64)
        .execute(&mut *conn)
        .await?;
        report.player_stats += 1;
    }
    debug!("Inserted {} players", report.players);

    // 4. One fixture per home-perspective record, two mirrored results each
    for record in matches.iter().filter(|m| m.venue == Venue::Home) {
        let code = ResultCode::parse(&record.result)?;
        let context = || format!("match {} {} v {}", record.date, record.team, record.opponent);
        let home_id = teams.resolve(&record.team, context)?;
        let away_id = teams.resolve(&record.opponent, context)?;

        let match_id = sqlx::query(
            "INSERT INTO matches (match_date, kickoff, round, venue, home_team_id, away_team_id, competition_id, season_id) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )
        .bind(record.date)
        .bind(&record.time)
        .bind(&record.round)
        .bind(record.venue.as_str())
        .bind(home_id)
        .bind(away_id)
        .bind(report.competition_id)
        .bind(report.season_id)
        .execute(&mut *conn)
        .await?
        .last_insert_rowid();
        report.matches += 1;

        let sides = [
            (home_id, record.goals_for, record.goals_against, code.outcome()),
            (away_id, record.goals_against, record.goals_for, code.opponent_outcome()),
        ];
        for (team_id, goals_for, goals_against, outcome) in sides {
            insert_match_result(conn, match_id, team_id, goals_for, goals_against, outcome).await?;
            report.match_results += 1;
        }
    }
    debug!("Inserted {} matches", report.matches);

    Ok(report)
}

async fn insert_match_result(
    conn: &mut SqliteConnection,
    match_id: i64,
    team_id: i64,
    goals_for: u32,
    goals_against: u32,
    outcome: Outcome,
) -> EtlResult<()> {
    sqlx::query(
        "INSERT INTO match_result (match_id, team_id, goals_for, goals_against, outcome) \
         VALUES (?1, ?2, ?3, ?4, ?5)",
    )
    .bind(match_id)
    .bind(team_id)
    .bind(goals_for as i64)
    .bind(goals_against as i64)
    .bind(outcome.as_str())
    .execute(conn)
    .await?;
    Ok(())
}
