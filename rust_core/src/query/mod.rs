//! Analytical query engine.
//!
//! This module provides:
//! - The closed catalog of named templates (`catalog`)
//! - Typed tabular results with chart hints and CSV export (`result`)
//! - `QueryEngine`, which runs a template with an optional team filter
//!
//! The team filter value is always bound as a parameter. It never becomes
//! part of the SQL text, so any team name (quotes included) is safe.

pub mod catalog;
pub mod result;

pub use catalog::{ColumnKind, ColumnSpec, QueryTemplate};
pub use result::{Cell, ChartKind, ChartSpec, TabularResult};

use crate::db::retry::execute_with_retry;
use crate::db::Store;
use crate::error::EtlResult;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use tracing::{debug, info};

/// Runs catalog templates against a store.
#[derive(Debug, Clone)]
pub struct QueryEngine {
    store: Store,
}

impl QueryEngine {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Execute `template`, restricted to rows of `team` when given.
    ///
    /// A team with no rows yields an empty result, not an error.
    pub async fn run(&self, template: QueryTemplate, team: Option<&str>) -> EtlResult<TabularResult> {
        let sql = template.render(team.is_some());
        debug!("Running '{}' (team filter: {:?})", template, team);

        let rows = execute_with_retry(
            || fetch_rows(&self.store, &sql, template, team),
            self.store.retry_attempts(),
        )
        .await?;

        info!("Template '{}' returned {} rows", template, rows.len());

        Ok(TabularResult {
            template,
            team: team.map(str::to_string),
            columns: template.columns().iter().map(|c| c.name.to_string()).collect(),
            rows,
            chart: template.chart(team),
        })
    }

    /// Resolve `name` (display name or slug) and run it.
    pub async fn run_named(&self, name: &str, team: Option<&str>) -> EtlResult<TabularResult> {
        let template = QueryTemplate::from_name(name)?;
        self.run(template, team).await
    }
}

async fn fetch_rows(
    store: &Store,
    sql: &str,
    template: QueryTemplate,
    team: Option<&str>,
) -> EtlResult<Vec<Vec<Cell>>> {
    let mut query = sqlx::query(sql);
    if let Some(team) = team {
        query = query.bind(team);
    }

    let rows = query.fetch_all(store.pool()).await?;
    rows.iter().map(|row| decode_row(row, template.columns())).collect()
}

fn decode_row(row: &SqliteRow, columns: &[ColumnSpec]) -> EtlResult<Vec<Cell>> {
    columns
        .iter()
        .enumerate()
        .map(|(idx, column)| decode_cell(row, idx, column.kind))
        .collect()
}

fn decode_cell(row: &SqliteRow, idx: usize, kind: ColumnKind) -> EtlResult<Cell> {
    let cell = match kind {
        ColumnKind::Text => row
            .try_get::<Option<String>, _>(idx)?
            .map(Cell::Text),
        ColumnKind::Integer => row.try_get::<Option<i64>, _>(idx)?.map(Cell::Integer),
        ColumnKind::Real => row.try_get::<Option<f64>, _>(idx)?.map(Cell::Real),
    };
    Ok(cell.unwrap_or(Cell::Null))
}
