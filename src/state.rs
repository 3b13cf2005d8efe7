use std::sync::Arc;

use sqlx::PgPool;

use crate::auth::JwtKeys;
use crate::database::{ApplicationRepository, ApplicationStore, TypeStore, TypesRepository};

/// Shared state handed to every handler. Both stores are explicitly
/// constructed and owned here; nothing is reached through globals.
#[derive(Clone)]
pub struct AppState {
    pub applications: Arc<dyn ApplicationStore>,
    pub types: Arc<dyn TypeStore>,
    pub keys: JwtKeys,
}

impl AppState {
    pub fn new(applications: Arc<dyn ApplicationStore>, types: Arc<dyn TypeStore>, keys: JwtKeys) -> Self {
        Self { applications, types, keys }
    }

    /// Both accessors share one pool
    pub fn from_pool(pool: PgPool, keys: JwtKeys) -> Self {
        Self::new(
            Arc::new(ApplicationRepository::new(pool.clone())),
            Arc::new(TypesRepository::new(pool)),
            keys,
        )
    }
}
