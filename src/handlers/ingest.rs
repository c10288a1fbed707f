use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use futures_util::StreamExt;
use log::info;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::db::upsert::{upsert_batch, UpsertRow};
use crate::errors::AppError;
use crate::models::department::Department;
use crate::models::hired_employee::{BatchEmployeesIn, HiredEmployee};
use crate::models::job::Job;
use crate::utils::csv_parser::{parse_csv, CsvRow};
use crate::utils::validation::validate_payload;

#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    Departments,
    Jobs,
    HiredEmployees,
}

#[derive(Deserialize)]
pub struct UploadCsvQuery {
    table: Table,
}

#[derive(Serialize)]
struct UploadCsvResponse {
    inserted_or_updated: usize,
    skipped_rows: usize,
}

#[derive(Serialize)]
struct BatchResponse {
    inserted_or_updated: usize,
}

/// Returns the multipart field named `file`, or else the first field that carries a filename.
async fn read_file_field(mut payload: Multipart) -> Result<Vec<u8>, AppError> {
    let mut fallback: Option<Vec<u8>> = None;

    while let Some(item) = payload.next().await {
        let mut field =
            item.map_err(|err| AppError::Parse(format!("invalid multipart body: {}", err)))?;

        let disposition = field.content_disposition();
        let is_file_field = disposition.get_name() == Some("file");
        let has_filename = disposition.get_filename().is_some();

        let mut bytes = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk =
                chunk.map_err(|err| AppError::Parse(format!("invalid multipart body: {}", err)))?;
            bytes.extend_from_slice(&chunk);
        }

        if is_file_field {
            return Ok(bytes);
        }
        if has_filename && fallback.is_none() {
            fallback = Some(bytes);
        }
    }

    fallback.ok_or_else(|| AppError::Validation("missing file field".to_string()))
}

async fn ingest_csv<R>(pool: &PgPool, raw: &[u8]) -> Result<UploadCsvResponse, AppError>
where
    R: CsvRow + UpsertRow,
{
    let parsed = parse_csv::<R>(raw)?;
    let inserted_or_updated = upsert_batch(pool, &parsed.rows).await?;

    info!(
        "CSV upload into {}: {} upserted, {} skipped",
        R::TABLE,
        inserted_or_updated,
        parsed.skipped
    );

    Ok(UploadCsvResponse {
        inserted_or_updated,
        skipped_rows: parsed.skipped,
    })
}

async fn ingest_batch(pool: &PgPool, batch: BatchEmployeesIn) -> Result<BatchResponse, AppError> {
    validate_payload(&batch)?;
    let rows: Vec<HiredEmployee> = batch.into_rows();
    let inserted_or_updated = upsert_batch(pool, &rows).await?;
    info!("batch insert into {}: {} upserted", HiredEmployee::TABLE, inserted_or_updated);
    Ok(BatchResponse { inserted_or_updated })
}

pub async fn upload_csv(
    pool: web::Data<PgPool>,
    query: web::Query<UploadCsvQuery>,
    payload: Multipart,
) -> Result<HttpResponse, AppError> {
    let raw = read_file_field(payload).await?;

    let response = match query.table {
        Table::Departments => ingest_csv::<Department>(&pool, &raw).await?,
        Table::Jobs => ingest_csv::<Job>(&pool, &raw).await?,
        Table::HiredEmployees => ingest_csv::<HiredEmployee>(&pool, &raw).await?,
    };

    Ok(HttpResponse::Ok().json(response))
}

pub async fn insert_batch(
    pool: web::Data<PgPool>,
    payload: web::Json<BatchEmployeesIn>,
) -> Result<HttpResponse, AppError> {
    let response = ingest_batch(&pool, payload.into_inner()).await?;
    Ok(HttpResponse::Ok().json(response))
}

pub async fn insert_batch_file(
    pool: web::Data<PgPool>,
    payload: Multipart,
) -> Result<HttpResponse, AppError> {
    let raw = read_file_field(payload).await?;
    let text = std::str::from_utf8(&raw)
        .map_err(|err| AppError::Parse(format!("batch file is not valid UTF-8: {}", err)))?;
    let batch: BatchEmployeesIn = serde_json::from_str(text).map_err(AppError::from_json)?;

    let response = ingest_batch(&pool, batch).await?;
    Ok(HttpResponse::Ok().json(response))
}
