use std::collections::HashSet;

use log::{info, warn};
use sqlx::query_builder::Separated;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::errors::AppError;
use crate::models::department::Department;
use crate::models::hired_employee::HiredEmployee;
use crate::models::job::Job;

/// Keeps every statement well under the Postgres limit of 65535 bind parameters.
const MAX_ROWS_PER_STATEMENT: usize = 1000;

/// A row that can be written with `INSERT ... ON CONFLICT (id) DO UPDATE`.
pub trait UpsertRow {
    const TABLE: &'static str;
    /// Column names in bind order. The first one is the primary key.
    const COLUMNS: &'static [&'static str];

    fn id(&self) -> i32;

    fn push_tuple(&self, row: Separated<'_, '_, Postgres, &'static str>);
}

impl UpsertRow for Department {
    const TABLE: &'static str = "departments";
    const COLUMNS: &'static [&'static str] = &["id", "department"];

    fn id(&self) -> i32 {
        self.id
    }

    fn push_tuple(&self, mut row: Separated<'_, '_, Postgres, &'static str>) {
        row.push_bind(self.id).push_bind(self.name.clone());
    }
}

impl UpsertRow for Job {
    const TABLE: &'static str = "jobs";
    const COLUMNS: &'static [&'static str] = &["id", "job"];

    fn id(&self) -> i32 {
        self.id
    }

    fn push_tuple(&self, mut row: Separated<'_, '_, Postgres, &'static str>) {
        row.push_bind(self.id).push_bind(self.name.clone());
    }
}

impl UpsertRow for HiredEmployee {
    const TABLE: &'static str = "hired_employees";
    const COLUMNS: &'static [&'static str] = &["id", "name", "datetime", "department_id", "job_id"];

    fn id(&self) -> i32 {
        self.id
    }

    fn push_tuple(&self, mut row: Separated<'_, '_, Postgres, &'static str>) {
        row.push_bind(self.id)
            .push_bind(self.name.clone())
            .push_bind(self.hired_at)
            .push_bind(self.department_id)
            .push_bind(self.job_id);
    }
}

/// A batch may mention each id once; Postgres refuses to update the same row twice in one statement.
fn ensure_unique_ids<R: UpsertRow>(rows: &[R]) -> Result<(), AppError> {
    let mut seen: HashSet<i32> = HashSet::with_capacity(rows.len());
    for row in rows {
        if !seen.insert(row.id()) {
            warn!("rejecting batch for {}: duplicate id {}", R::TABLE, row.id());
            return Err(AppError::Constraint {
                table: R::TABLE,
                message: format!("duplicate id {} in batch", row.id()),
            });
        }
    }
    Ok(())
}

fn upsert_statement<R: UpsertRow>(rows: &[R]) -> QueryBuilder<'static, Postgres> {
    let mut query_builder: QueryBuilder<'static, Postgres> = QueryBuilder::new(format!(
        "INSERT INTO {} ({}) ",
        R::TABLE,
        R::COLUMNS.join(", ")
    ));

    query_builder.push_values(rows, |row, record| record.push_tuple(row));

    let assignments = R::COLUMNS[1..]
        .iter()
        .map(|column| format!("{column} = EXCLUDED.{column}"))
        .collect::<Vec<_>>()
        .join(", ");
    query_builder.push(" ON CONFLICT (id) DO UPDATE SET ");
    query_builder.push(assignments);

    query_builder
}

/// Inserts or overwrites `rows` in one transaction.
///
/// Any store error (a missing foreign key, for instance) rolls back the whole
/// batch, and a repeated id rejects it before anything is written.
/// Returns the number of rows written.
pub async fn upsert_batch<R: UpsertRow>(pool: &PgPool, rows: &[R]) -> Result<usize, AppError> {
    if rows.is_empty() {
        return Ok(0);
    }

    ensure_unique_ids(rows)?;

    // Dropping `tx` on an early return rolls it back.
    let mut tx = pool
        .begin()
        .await
        .map_err(|err| AppError::from_store(R::TABLE, err))?;

    for chunk in rows.chunks(MAX_ROWS_PER_STATEMENT) {
        let mut statement = upsert_statement(chunk);
        statement
            .build()
            .execute(&mut *tx)
            .await
            .map_err(|err| AppError::from_store(R::TABLE, err))?;
    }

    tx.commit()
        .await
        .map_err(|err| AppError::from_store(R::TABLE, err))?;

    info!("upserted {} rows into {}", rows.len(), R::TABLE);
    Ok(rows.len())
}
