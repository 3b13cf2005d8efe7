use sqlx::PgPool;
use tracing::info;

use super::manager::DatabaseError;

pub const WORK_TYPES: [&str; 3] = ["Remote", "OnSite", "Hybrid"];
pub const APPLICATION_STATUSES: [&str; 3] = ["Accepted", "Pending", "Declined"];

const DROP_TABLES: [&str; 3] = [
    "DROP TABLE IF EXISTS application CASCADE",
    "DROP TABLE IF EXISTS work_type CASCADE",
    "DROP TABLE IF EXISTS application_status CASCADE",
];

const CREATE_TABLES: [&str; 3] = [
    r#"
    CREATE TABLE work_type (
        id SERIAL PRIMARY KEY NOT NULL,
        name VARCHAR(255) NOT NULL
    )"#,
    r#"
    CREATE TABLE application_status (
        id SERIAL PRIMARY KEY NOT NULL,
        name VARCHAR(255) NOT NULL
    )"#,
    r#"
    CREATE TABLE application (
        id SERIAL PRIMARY KEY NOT NULL,
        user_id INTEGER NOT NULL,
        job_title VARCHAR(255) NOT NULL,
        work_type_id INTEGER NOT NULL DEFAULT 1,
        company_name VARCHAR(255) NOT NULL,
        submission_date DATE,
        status_id INTEGER NOT NULL DEFAULT 1,
        wanted_salary REAL,
        accepted_salary REAL,
        start_date DATE,
        commentary VARCHAR(500),

        FOREIGN KEY (work_type_id) REFERENCES work_type (id)
            ON DELETE SET DEFAULT,
        FOREIGN KEY (status_id) REFERENCES application_status (id)
            ON DELETE SET DEFAULT
    )"#,
];

/// Drop every table, recreate the schema and seed both enumeration tables.
/// Destroys all stored applications.
pub async fn recreate(pool: &PgPool) -> Result<(), DatabaseError> {
    for statement in DROP_TABLES.iter().chain(CREATE_TABLES.iter()) {
        sqlx::query(statement).execute(pool).await?;
    }

    for name in WORK_TYPES {
        sqlx::query("INSERT INTO work_type (name) VALUES ($1)")
            .bind(name)
            .execute(pool)
            .await?;
    }
    for name in APPLICATION_STATUSES {
        sqlx::query("INSERT INTO application_status (name) VALUES ($1)")
            .bind(name)
            .execute(pool)
            .await?;
    }

    info!(
        "Recreated schema with {} work types and {} statuses",
        WORK_TYPES.len(),
        APPLICATION_STATUSES.len()
    );
    Ok(())
}
