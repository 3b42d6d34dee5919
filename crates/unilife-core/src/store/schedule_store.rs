//! ScheduleStore - weekly session list persistence trait.

use async_trait::async_trait;

use super::StoreError;
use crate::types::WeekSchedule;

/// Persistence seam for the weekly class sessions, keyed by user id.
/// A put replaces the whole week; sessions are immutable once saved.
#[async_trait]
pub trait ScheduleStore: Send + Sync {
    async fn get(&self, user_id: &str) -> Result<Option<WeekSchedule>, StoreError>;
    async fn put(&self, user_id: &str, schedule: &WeekSchedule) -> Result<(), StoreError>;
    async fn delete(&self, user_id: &str) -> Result<bool, StoreError>;
}
