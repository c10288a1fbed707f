use serde::Serialize;

/// Hires per calendar quarter for one department/job pair.
#[derive(sqlx::FromRow, Serialize, Debug, Clone, PartialEq)]
pub struct QuarterlyHires {
    pub department: String,
    pub job: String,
    pub q1: i64,
    pub q2: i64,
    pub q3: i64,
    pub q4: i64,
}

#[derive(sqlx::FromRow, Serialize, Debug, Clone, PartialEq)]
pub struct DepartmentHires {
    pub id: i32,
    pub department: String,
    pub hired: i64,
}
