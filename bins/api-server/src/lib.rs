pub mod config;
pub mod routes;

pub use routes::{api_routes, ApiError, AppState};
