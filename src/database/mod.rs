pub mod manager;
pub mod models;
pub mod repository;
pub mod schema;

pub use manager::{connect, DatabaseError};
pub use repository::{ApplicationRepository, ApplicationStore, TypeStore, TypesRepository};
