//! Relational model for one season of league data.
//!
//! `ensure_schema` creates the relations when absent and is a no-op
//! otherwise. There is no migration path: an existing table is trusted as-is.

use super::Store;
use crate::error::EtlResult;
use tracing::{debug, info};

/// Tables in insertion (dependency) order.
pub const SCHEMA_TABLES: &[&str] = &[
    "competition",
    "season",
    "team",
    "player",
    "player_stat",
    "matches",
    "match_result",
];

const SCHEMA_STATEMENTS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS competition (
        id      INTEGER PRIMARY KEY AUTOINCREMENT,
        name    TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS season (
        id      INTEGER PRIMARY KEY AUTOINCREMENT,
        label   TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS team (
        id              INTEGER PRIMARY KEY AUTOINCREMENT,
        name            TEXT NOT NULL,
        competition_id  INTEGER NOT NULL REFERENCES competition (id),
        season_id       INTEGER NOT NULL REFERENCES season (id),
        UNIQUE (name, competition_id, season_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS player (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        name        TEXT NOT NULL,
        position    TEXT,
        nationality TEXT,
        team_id     INTEGER NOT NULL REFERENCES team (id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS player_stat (
        id              INTEGER PRIMARY KEY AUTOINCREMENT,
        player_id       INTEGER NOT NULL UNIQUE REFERENCES player (id),
        goals           INTEGER NOT NULL DEFAULT 0 CHECK (goals >= 0),
        assists         INTEGER NOT NULL DEFAULT 0 CHECK (assists >= 0),
        matches_played  INTEGER NOT NULL DEFAULT 0 CHECK (matches_played >= 0),
        yellow_cards    INTEGER NOT NULL DEFAULT 0 CHECK (yellow_cards >= 0),
        red_cards       INTEGER NOT NULL DEFAULT 0 CHECK (red_cards >= 0)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS matches (
        id              INTEGER PRIMARY KEY AUTOINCREMENT,
        match_date      TEXT NOT NULL,
        kickoff         TEXT,
        round           TEXT,
        venue           TEXT,
        home_team_id    INTEGER NOT NULL REFERENCES team (id),
        away_team_id    INTEGER NOT NULL REFERENCES team (id),
        competition_id  INTEGER NOT NULL REFERENCES competition (id),
        season_id       INTEGER NOT NULL REFERENCES season (id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS match_result (
        id              INTEGER PRIMARY KEY AUTOINCREMENT,
        match_id        INTEGER NOT NULL REFERENCES matches (id),
        team_id         INTEGER NOT NULL REFERENCES team (id),
        goals_for       INTEGER NOT NULL CHECK (goals_for >= 0),
        goals_against   INTEGER NOT NULL CHECK (goals_against >= 0),
        outcome         TEXT NOT NULL CHECK (outcome IN ('Win', 'Loss', 'Draw')),
        UNIQUE (match_id, team_id)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_player_team ON player (team_id)",
    "CREATE INDEX IF NOT EXISTS idx_match_result_team ON match_result (team_id)",
];

/// Create every relation of the model if it does not exist yet.
pub async fn ensure_schema(store: &Store) -> EtlResult<()> {
    let mut tx = store.pool().begin().await?;
    for statement in SCHEMA_STATEMENTS.iter().copied() {
        sqlx::query(statement).execute(&mut *tx).await?;
    }
    tx.commit().await?;

    debug!("Schema statements applied: {}", SCHEMA_STATEMENTS.len());
    info!("Schema ready ({} tables)", SCHEMA_TABLES.len());
    Ok(())
}
