use actix_web::{web, HttpResponse};
use serde::Deserialize;
use sqlx::PgPool;

use crate::db::metrics::{departments_above_mean, quarterly_hires};
use crate::errors::AppError;

const DEFAULT_YEAR: i32 = 2021;

#[derive(Deserialize)]
pub struct YearQuery {
    year: Option<i32>,
}

impl YearQuery {
    fn year(&self) -> i32 {
        self.year.unwrap_or(DEFAULT_YEAR)
    }
}

pub async fn q_hires(
    pool: web::Data<PgPool>,
    query: web::Query<YearQuery>,
) -> Result<HttpResponse, AppError> {
    let rows = quarterly_hires(&pool, query.year()).await?;
    Ok(HttpResponse::Ok().json(rows))
}

pub async fn top_departments(
    pool: web::Data<PgPool>,
    query: web::Query<YearQuery>,
) -> Result<HttpResponse, AppError> {
    let rows = departments_above_mean(&pool, query.year()).await?;
    Ok(HttpResponse::Ok().json(rows))
}
