use crate::models::Record;
use async_trait::async_trait;
use service_core::error::AppError;

/// Backing store for records. Each call is a single pass-through operation
/// with no retries.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Stores the record and returns the identifier the store assigned.
    async fn insert(&self, record: Record) -> Result<String, AppError>;

    /// Every stored record, in store order.
    async fn list(&self) -> Result<Vec<Record>, AppError>;

    async fn health_check(&self) -> Result<(), AppError>;
}
