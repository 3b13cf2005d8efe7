use async_trait::async_trait;
use sqlx::PgPool;

use crate::database::manager::{self, DatabaseError};
use crate::database::models::{Application, ApplicationStatus, WorkType};
use crate::database::schema;

const APPLICATION_COLUMNS: &str = "id, user_id, job_title, work_type_id, company_name, submission_date, \
     status_id, wanted_salary, accepted_salary, start_date, commentary";

/// Storage for job applications. Every method is a single statement; nothing
/// here spans a transaction.
#[async_trait]
pub trait ApplicationStore: Send + Sync {
    async fn create_schema(&self) -> Result<(), DatabaseError>;

    /// Insert and return the generated id. The owner is taken as given.
    async fn insert(&self, application: &Application) -> Result<i32, DatabaseError>;

    /// `DatabaseError::NotFound` when no row has this id
    async fn get(&self, id: i32) -> Result<Application, DatabaseError>;

    async fn list_by_owner(&self, user_id: i32) -> Result<Vec<Application>, DatabaseError>;

    /// Overwrite every mutable column of the row with `application.id`
    async fn update(&self, application: &Application) -> Result<(), DatabaseError>;

    async fn delete(&self, id: i32) -> Result<(), DatabaseError>;

    async fn health_check(&self) -> Result<(), DatabaseError>;
}

/// Read-only enumeration tables
#[async_trait]
pub trait TypeStore: Send + Sync {
    async fn create_schema(&self) -> Result<(), DatabaseError>;
    async fn work_types(&self) -> Result<Vec<WorkType>, DatabaseError>;
    async fn statuses(&self) -> Result<Vec<ApplicationStatus>, DatabaseError>;
}

#[derive(Clone)]
pub struct ApplicationRepository {
    pool: PgPool,
}

impl ApplicationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ApplicationStore for ApplicationRepository {
    async fn create_schema(&self) -> Result<(), DatabaseError> {
        schema::recreate(&self.pool).await
    }

    async fn insert(&self, application: &Application) -> Result<i32, DatabaseError> {
        let id: i32 = sqlx::query_scalar(
            "INSERT INTO application (user_id, job_title, work_type_id, company_name, submission_date, \
             status_id, wanted_salary, accepted_salary, start_date, commentary) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) RETURNING id",
        )
        .bind(application.user_id)
        .bind(&application.job_title)
        .bind(application.work_type_id)
        .bind(&application.company_name)
        .bind(application.submission_date)
        .bind(application.status_id)
        .bind(application.wanted_salary)
        .bind(application.accepted_salary)
        .bind(application.start_date)
        .bind(&application.commentary)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    async fn get(&self, id: i32) -> Result<Application, DatabaseError> {
        let sql = format!("SELECT {} FROM application WHERE id = $1", APPLICATION_COLUMNS);

        sqlx::query_as::<_, Application>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("application {}", id)))
    }

    async fn list_by_owner(&self, user_id: i32) -> Result<Vec<Application>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM application WHERE user_id = $1 ORDER BY id",
            APPLICATION_COLUMNS
        );

        let applications = sqlx::query_as::<_, Application>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(applications)
    }

    async fn update(&self, application: &Application) -> Result<(), DatabaseError> {
        let result = sqlx::query(
            "UPDATE application SET user_id = $2, job_title = $3, work_type_id = $4, company_name = $5, \
             submission_date = $6, status_id = $7, wanted_salary = $8, accepted_salary = $9, \
             start_date = $10, commentary = $11 WHERE id = $1",
        )
        .bind(application.id)
        .bind(application.user_id)
        .bind(&application.job_title)
        .bind(application.work_type_id)
        .bind(&application.company_name)
        .bind(application.submission_date)
        .bind(application.status_id)
        .bind(application.wanted_salary)
        .bind(application.accepted_salary)
        .bind(application.start_date)
        .bind(&application.commentary)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("application {}", application.id)));
        }
        Ok(())
    }

    async fn delete(&self, id: i32) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM application WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("application {}", id)));
        }
        Ok(())
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        manager::health_check(&self.pool).await
    }
}

#[derive(Clone)]
pub struct TypesRepository {
    pool: PgPool,
}

impl TypesRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TypeStore for TypesRepository {
    async fn create_schema(&self) -> Result<(), DatabaseError> {
        schema::recreate(&self.pool).await
    }

    async fn work_types(&self) -> Result<Vec<WorkType>, DatabaseError> {
        let rows = sqlx::query_as::<_, WorkType>("SELECT id, name FROM work_type ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn statuses(&self) -> Result<Vec<ApplicationStatus>, DatabaseError> {
        let rows = sqlx::query_as::<_, ApplicationStatus>("SELECT id, name FROM application_status ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }
}
