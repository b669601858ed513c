pub mod greeting;
pub mod health;
pub mod records;

pub use greeting::greeting;
pub use health::{health_check, metrics_endpoint, readiness_check};
pub use records::{create_record, list_records};
