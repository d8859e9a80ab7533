//! service-core: Shared infrastructure for marketplace services.
pub mod error;
pub mod middleware;

pub use axum;
pub use mongodb;
pub use serde;
pub use serde_json;
pub use tracing;
pub use validator;
