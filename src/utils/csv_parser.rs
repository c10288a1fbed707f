use csv::{ReaderBuilder, StringRecord};
use log::debug;
use thiserror::Error;

use crate::errors::AppError;
use crate::models::department::Department;
use crate::models::hired_employee::HiredEmployee;
use crate::models::job::Job;
use crate::utils::datetime::parse_timestamp;

#[derive(Debug, Error, PartialEq)]
pub enum RowError {
    #[error("column {column} is not an integer: {value:?}")]
    Integer { column: usize, value: String },
    #[error("column {column} is not a datetime: {value:?}")]
    Timestamp { column: usize, value: String },
}

/// A row type that can be built from one CSV record.
pub trait CsvRow: Sized {
    /// Records with fewer cells are ignored without being counted as skipped.
    const MIN_COLUMNS: usize;
    const ALL_INVALID_MESSAGE: &'static str;

    fn from_record(record: &StringRecord) -> Result<Self, RowError>;
}

#[derive(Debug)]
pub struct ParsedCsv<T> {
    pub rows: Vec<T>,
    pub skipped: usize,
}

fn cell(record: &StringRecord, column: usize) -> &str {
    record.get(column).map(str::trim).unwrap_or("")
}

fn int_cell(record: &StringRecord, column: usize) -> Result<i32, RowError> {
    let value = cell(record, column);
    value.parse::<i32>().map_err(|_| RowError::Integer {
        column,
        value: value.to_string(),
    })
}

impl CsvRow for Department {
    const MIN_COLUMNS: usize = 2;
    const ALL_INVALID_MESSAGE: &'static str = "All rows invalid for departments";

    fn from_record(record: &StringRecord) -> Result<Self, RowError> {
        Ok(Department {
            id: int_cell(record, 0)?,
            name: cell(record, 1).to_string(),
        })
    }
}

impl CsvRow for Job {
    const MIN_COLUMNS: usize = 2;
    const ALL_INVALID_MESSAGE: &'static str = "All rows invalid for jobs";

    fn from_record(record: &StringRecord) -> Result<Self, RowError> {
        Ok(Job {
            id: int_cell(record, 0)?,
            name: cell(record, 1).to_string(),
        })
    }
}

impl CsvRow for HiredEmployee {
    const MIN_COLUMNS: usize = 5;
    const ALL_INVALID_MESSAGE: &'static str =
        "CSV parse/insert error: all rows invalid or header-only file";

    fn from_record(record: &StringRecord) -> Result<Self, RowError> {
        let id = int_cell(record, 0)?;
        let name = cell(record, 1).to_string();
        let raw_ts = cell(record, 2);
        let hired_at = parse_timestamp(raw_ts).ok_or_else(|| RowError::Timestamp {
            column: 2,
            value: raw_ts.to_string(),
        })?;
        Ok(HiredEmployee {
            id,
            name,
            hired_at,
            department_id: int_cell(record, 3)?,
            job_id: int_cell(record, 4)?,
        })
    }
}

/// An optional sign followed by ASCII digits, regardless of whether it fits an `i32`.
fn is_integer_literal(value: &str) -> bool {
    let digits = value.strip_prefix(['+', '-']).unwrap_or(value);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// A first record whose leading cell is not an integer is treated as a header.
fn looks_like_header(record: &StringRecord) -> bool {
    !is_integer_literal(cell(record, 0))
}

/// Parses an uploaded CSV body into typed rows.
///
/// Malformed rows are dropped and counted in `skipped`; the upload as a whole
/// fails only when it is empty, undecodable, or every attempted row is malformed.
pub fn parse_csv<T: CsvRow>(raw: &[u8]) -> Result<ParsedCsv<T>, AppError> {
    let text = std::str::from_utf8(raw)
        .map_err(|err| AppError::Parse(format!("CSV is not valid UTF-8: {}", err)))?;

    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let records = reader
        .records()
        .collect::<Result<Vec<StringRecord>, csv::Error>>()
        .map_err(|err| AppError::Parse(format!("CSV parse error: {}", err)))?;

    let first = records
        .first()
        .ok_or_else(|| AppError::Validation("Empty CSV".to_string()))?;
    let data = if looks_like_header(first) {
        &records[1..]
    } else {
        &records[..]
    };

    let mut rows = Vec::with_capacity(data.len());
    let mut skipped = 0;
    for record in data {
        if record.len() < T::MIN_COLUMNS {
            continue;
        }
        match T::from_record(record) {
            Ok(row) => rows.push(row),
            Err(err) => {
                let line = record.position().map(|p| p.line()).unwrap_or_default();
                debug!("skipping CSV line {}: {}", line, err);
                skipped += 1;
            }
        }
    }

    if rows.is_empty() && skipped > 0 {
        return Err(AppError::NoValidRows(T::ALL_INVALID_MESSAGE.to_string()));
    }

    Ok(ParsedCsv { rows, skipped })
}
