use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use crate::auth::{generate_token, JwtKeys};
use crate::database::models::{Application, ApplicationStatus, WorkType};
use crate::database::schema::{APPLICATION_STATUSES, WORK_TYPES};
use crate::database::{ApplicationStore, DatabaseError, TypeStore};
use crate::state::AppState;

pub const SECRET: &[u8] = b"supersecretsignkey";

/// In-memory stand-in for both repositories. Mirrors the foreign key checks
/// of the real schema so invalid references fail the same way.
#[derive(Default)]
pub struct MemoryStore {
    rows: Mutex<Vec<Application>>,
    next_id: Mutex<i32>,
    failing: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            next_id: Mutex::new(1),
            ..Default::default()
        }
    }

    /// Make every subsequent call fail like a lost connection
    pub fn fail_all(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), DatabaseError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(DatabaseError::Sqlx(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }

    fn check_references(application: &Application) -> Result<(), DatabaseError> {
        let valid = |id: i32, len: usize| id >= 1 && id as usize <= len;

        if !valid(application.work_type_id, WORK_TYPES.len()) {
            return Err(DatabaseError::QueryError("work_type_id violates foreign key".into()));
        }
        if !valid(application.status_id, APPLICATION_STATUSES.len()) {
            return Err(DatabaseError::QueryError("status_id violates foreign key".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl ApplicationStore for MemoryStore {
    async fn create_schema(&self) -> Result<(), DatabaseError> {
        self.check()?;
        self.rows.lock().unwrap().clear();
        *self.next_id.lock().unwrap() = 1;
        Ok(())
    }

    async fn insert(&self, application: &Application) -> Result<i32, DatabaseError> {
        self.check()?;
        Self::check_references(application)?;

        let mut next_id = self.next_id.lock().unwrap();
        let mut row = application.clone();
        row.id = *next_id;
        *next_id += 1;

        self.rows.lock().unwrap().push(row);
        Ok(*next_id - 1)
    }

    async fn get(&self, id: i32) -> Result<Application, DatabaseError> {
        self.check()?;
        self.rows
            .lock()
            .unwrap()
            .iter()
            .find(|row| row.id == id)
            .cloned()
            .ok_or_else(|| DatabaseError::NotFound(format!("application {}", id)))
    }

    async fn list_by_owner(&self, user_id: i32) -> Result<Vec<Application>, DatabaseError> {
        self.check()?;
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|row| row.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn update(&self, application: &Application) -> Result<(), DatabaseError> {
        self.check()?;
        Self::check_references(application)?;

        let mut rows = self.rows.lock().unwrap();
        let row = rows
            .iter_mut()
            .find(|row| row.id == application.id)
            .ok_or_else(|| DatabaseError::NotFound(format!("application {}", application.id)))?;
        *row = application.clone();
        Ok(())
    }

    async fn delete(&self, id: i32) -> Result<(), DatabaseError> {
        self.check()?;
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|row| row.id != id);

        if rows.len() == before {
            return Err(DatabaseError::NotFound(format!("application {}", id)));
        }
        Ok(())
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        self.check()
    }
}

#[async_trait]
impl TypeStore for MemoryStore {
    async fn create_schema(&self) -> Result<(), DatabaseError> {
        ApplicationStore::create_schema(self).await
    }

    async fn work_types(&self) -> Result<Vec<WorkType>, DatabaseError> {
        self.check()?;
        Ok((1..)
            .zip(WORK_TYPES)
            .map(|(id, name)| WorkType { id, name: name.to_string() })
            .collect())
    }

    async fn statuses(&self) -> Result<Vec<ApplicationStatus>, DatabaseError> {
        self.check()?;
        Ok((1..)
            .zip(APPLICATION_STATUSES)
            .map(|(id, name)| ApplicationStatus { id, name: name.to_string() })
            .collect())
    }
}

pub fn keys() -> JwtKeys {
    JwtKeys::from_secret(SECRET).unwrap()
}

pub fn memory_state() -> AppState {
    let store = Arc::new(MemoryStore::new());
    AppState::new(store.clone(), store, keys())
}

/// A valid application owned by `user_id`
pub fn application(user_id: i32, job_title: &str) -> Application {
    Application {
        user_id,
        job_title: job_title.to_string(),
        company_name: "test company".to_string(),
        work_type_id: 1,
        status_id: 1,
        ..Application::default()
    }
}

/// Full router over a fresh in-memory store
pub struct TestApp {
    pub store: Arc<MemoryStore>,
    router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let state = AppState::new(store.clone(), store.clone(), keys());
        Self {
            store,
            router: crate::routes::app(state),
        }
    }

    pub async fn seed(&self, application: Application) -> i32 {
        self.store.insert(&application).await.unwrap()
    }

    /// Send a request, optionally authenticated as `user_id`, and decode the
    /// JSON body (Null when the body is not JSON).
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        user_id: Option<i32>,
        body: Option<String>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(user_id) = user_id {
            let token = generate_token(user_id, &format!("user{}", user_id), SECRET).unwrap();
            builder = builder.header(header::AUTHORIZATION, token);
        }

        let request = builder
            .body(body.map(Body::from).unwrap_or_else(Body::empty))
            .unwrap();
        let response = self.router.clone().oneshot(request).await.unwrap();

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_store_assigns_increasing_ids() {
        let store = MemoryStore::new();
        let first = store.insert(&application(1, "a")).await.unwrap();
        let second = store.insert(&application(1, "b")).await.unwrap();
        assert_eq!((first, second), (1, 2));
    }

    #[tokio::test]
    async fn memory_store_enforces_references() {
        let store = MemoryStore::new();
        let mut app = application(1, "a");
        app.status_id = 4;
        assert!(store.insert(&app).await.is_err());
    }

    #[tokio::test]
    async fn seeds_three_of_each_enumeration() {
        let store = MemoryStore::new();
        assert_eq!(store.work_types().await.unwrap().len(), 3);
        assert_eq!(store.statuses().await.unwrap().len(), 3);
    }
}
