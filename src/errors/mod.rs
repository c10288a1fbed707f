use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use log::{error, warn};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Schema(String),
    #[error("{0}")]
    Parse(String),
    #[error("{0}")]
    NoValidRows(String),
    #[error("failed to upsert {table}: {message}")]
    Constraint { table: &'static str, message: String },
    #[error("Database Error: {0}")]
    Database(String),
}

#[derive(Serialize)]
struct ErrorResponse<'a> {
    code: &'a str,
    error: String,
}

impl AppError {
    /// Classifies a store failure raised while writing `table`.
    pub fn from_store(table: &'static str, err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) => {
                warn!("constraint violation on {}: {}", table, db_err);
                AppError::Constraint {
                    table,
                    message: db_err.to_string(),
                }
            }
            other => {
                error!("store failure on {}: {}", table, other);
                AppError::Database(other.to_string())
            }
        }
    }

    /// Maps a JSON decoding failure: malformed input is a parse error, a shape mismatch is a schema error.
    pub fn from_json(err: serde_json::Error) -> Self {
        use serde_json::error::Category;
        match err.classify() {
            Category::Data => AppError::Schema(err.to_string()),
            Category::Syntax | Category::Eof | Category::Io => AppError::Parse(err.to_string()),
        }
    }

    fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Schema(_) => "SCHEMA_ERROR",
            AppError::Parse(_) => "PARSE_ERROR",
            AppError::NoValidRows(_) => "NO_VALID_ROWS",
            AppError::Constraint { .. } => "DB_ERROR",
            AppError::Database(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        error!("query failed: {}", err);
        AppError::Database(err.to_string())
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_)
            | AppError::Parse(_)
            | AppError::NoValidRows(_)
            | AppError::Constraint { .. } => StatusCode::BAD_REQUEST,
            AppError::Schema(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorResponse {
            code: self.code(),
            error: self.to_string(),
        })
    }
}
