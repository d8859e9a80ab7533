pub mod auth;

pub use auth::{auth_middleware, require_admin, require_customer, require_seller, AuthUser, SESSION_COOKIE};
