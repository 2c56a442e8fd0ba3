pub mod auth;
pub mod handler;
pub mod response;
pub mod service;

pub use auth::{ApiKeyAuth, AuthError};
pub use handler::AppState;
pub use service::router;
