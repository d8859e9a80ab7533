pub mod audit;
pub mod jwt;
pub mod stripe;

pub use audit::{AuditEntry, AuditService};
pub use jwt::{Claims, JwtService};
pub use stripe::StripeClient;
