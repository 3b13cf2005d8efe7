pub mod application;
pub mod types;

pub use application::Application;
pub use types::{ApplicationStatus, WorkType};
