use sqlx::PgPool;

use crate::models::metrics::{DepartmentHires, QuarterlyHires};

const QUARTERLY_HIRES_SQL: &str = r#"
    SELECT d.department, j.job,
           COUNT(*) FILTER (WHERE EXTRACT(QUARTER FROM he.datetime) = 1) AS q1,
           COUNT(*) FILTER (WHERE EXTRACT(QUARTER FROM he.datetime) = 2) AS q2,
           COUNT(*) FILTER (WHERE EXTRACT(QUARTER FROM he.datetime) = 3) AS q3,
           COUNT(*) FILTER (WHERE EXTRACT(QUARTER FROM he.datetime) = 4) AS q4
    FROM hired_employees he
    JOIN departments d ON d.id = he.department_id
    JOIN jobs j ON j.id = he.job_id
    WHERE EXTRACT(YEAR FROM he.datetime) = $1
    GROUP BY d.department, j.job
    ORDER BY d.department ASC, j.job ASC
"#;

// Departments with no hires count as zero towards the mean.
const DEPARTMENTS_ABOVE_MEAN_SQL: &str = r#"
    WITH per_dept AS (
        SELECT d.id, d.department, COUNT(he.id) AS hired
        FROM departments d
        LEFT JOIN hired_employees he
               ON he.department_id = d.id
              AND EXTRACT(YEAR FROM he.datetime) = $1
        GROUP BY d.id, d.department
    )
    SELECT id, department, hired
    FROM per_dept
    WHERE hired > (SELECT AVG(hired) FROM per_dept)
    ORDER BY hired DESC, id ASC
"#;

/// Hires per quarter of `year` for every department/job pair that hired at least once that year.
pub async fn quarterly_hires(pool: &PgPool, year: i32) -> Result<Vec<QuarterlyHires>, sqlx::Error> {
    sqlx::query_as::<_, QuarterlyHires>(QUARTERLY_HIRES_SQL)
        .bind(year)
        .fetch_all(pool)
        .await
}

/// Departments whose hires in `year` are strictly above the mean across all departments.
pub async fn departments_above_mean(pool: &PgPool, year: i32) -> Result<Vec<DepartmentHires>, sqlx::Error> {
    sqlx::query_as::<_, DepartmentHires>(DEPARTMENTS_ABOVE_MEAN_SQL)
        .bind(year)
        .fetch_all(pool)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::upsert::upsert_batch;
    use crate::models::department::Department;
    use crate::models::hired_employee::HiredEmployee;
    use crate::models::job::Job;
    use crate::utils::datetime::parse_timestamp;

    async fn seed_catalogs(pool: &PgPool) {
        let departments = vec![
            Department { id: 1, name: "Engineering".into() },
            Department { id: 2, name: "HR".into() },
            Department { id: 3, name: "Sales".into() },
        ];
        let jobs = vec![
            Job { id: 1, name: "Data Engineer".into() },
            Job { id: 2, name: "Recruiter".into() },
        ];
        upsert_batch(pool, &departments).await.unwrap();
        upsert_batch(pool, &jobs).await.unwrap();
    }

    fn hires(start_id: i32, n: i32, department_id: i32, job_id: i32, ts: &str) -> Vec<HiredEmployee> {
        (0..n)
            .map(|i| HiredEmployee {
                id: start_id + i,
                name: format!("E{}", start_id + i),
                hired_at: parse_timestamp(ts).unwrap(),
                department_id,
                job_id,
            })
            .collect()
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires a Postgres instance at DATABASE_URL"]
    async fn quarterly_hires_for_a_quiet_year_is_empty(pool: PgPool) {
        seed_catalogs(&pool).await;
        upsert_batch(&pool, &hires(1, 3, 1, 1, "2021-02-01T08:00:00Z")).await.unwrap();

        assert!(quarterly_hires(&pool, 2019).await.unwrap().is_empty());
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires a Postgres instance at DATABASE_URL"]
    async fn quarterly_hires_buckets_by_quarter_and_sorts_by_name(pool: PgPool) {
        seed_catalogs(&pool).await;
        let mut rows = hires(1, 2, 2, 2, "2021-02-01T08:00:00Z");
        rows.extend(hires(10, 1, 2, 2, "2021-11-30T23:00:00Z"));
        rows.extend(hires(20, 1, 1, 1, "2021-05-15T12:00:00Z"));
        rows.extend(hires(30, 1, 1, 1, "2020-05-15T12:00:00Z"));
        upsert_batch(&pool, &rows).await.unwrap();

        let result = quarterly_hires(&pool, 2021).await.unwrap();
        assert_eq!(
            result,
            vec![
                QuarterlyHires {
                    department: "Engineering".into(),
                    job: "Data Engineer".into(),
                    q1: 0,
                    q2: 1,
                    q3: 0,
                    q4: 0,
                },
                QuarterlyHires {
                    department: "HR".into(),
                    job: "Recruiter".into(),
                    q1: 2,
                    q2: 0,
                    q3: 0,
                    q4: 1,
                },
            ]
        );
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires a Postgres instance at DATABASE_URL"]
    async fn only_departments_strictly_above_the_mean_are_returned(pool: PgPool) {
        seed_catalogs(&pool).await;
        // Engineering 10, HR 0, Sales 5: mean is 5.
        let mut rows = hires(1, 10, 1, 1, "2021-03-01T09:00:00Z");
        rows.extend(hires(100, 5, 3, 2, "2021-08-01T09:00:00Z"));
        upsert_batch(&pool, &rows).await.unwrap();

        let result = departments_above_mean(&pool, 2021).await.unwrap();
        assert_eq!(
            result,
            vec![DepartmentHires {
                id: 1,
                department: "Engineering".into(),
                hired: 10,
            }]
        );
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires a Postgres instance at DATABASE_URL"]
    async fn ties_above_the_mean_are_ordered_by_department_id(pool: PgPool) {
        seed_catalogs(&pool).await;
        // Sales 4, Engineering 4, HR 0: mean is 8/3.
        let mut rows = hires(1, 4, 3, 1, "2021-03-01T09:00:00Z");
        rows.extend(hires(100, 4, 1, 1, "2021-04-01T09:00:00Z"));
        upsert_batch(&pool, &rows).await.unwrap();

        let ids: Vec<i32> = departments_above_mean(&pool, 2021)
            .await
            .unwrap()
            .into_iter()
            .map(|d| d.id)
            .collect();
        assert_eq!(ids, vec![1, 3]);
    }
}
