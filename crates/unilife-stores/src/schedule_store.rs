//! ScheduleStore in-memory implementation.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

use unilife_core::store::{ScheduleStore, StoreError};
use unilife_core::types::WeekSchedule;

/// In-memory implementation for development and testing.
#[derive(Default)]
pub struct InMemoryScheduleStore {
    schedules: RwLock<HashMap<String, WeekSchedule>>,
}

impl InMemoryScheduleStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ScheduleStore for InMemoryScheduleStore {
    async fn get(&self, user_id: &str) -> Result<Option<WeekSchedule>, StoreError> {
        let schedules = self
            .schedules
            .read()
            .map_err(|e| StoreError::Internal(e.to_string()))?;
        Ok(schedules.get(user_id).cloned())
    }

    async fn put(&self, user_id: &str, schedule: &WeekSchedule) -> Result<(), StoreError> {
        let mut schedules = self
            .schedules
            .write()
            .map_err(|e| StoreError::Internal(e.to_string()))?;
        schedules.insert(user_id.to_string(), schedule.clone());
        Ok(())
    }

    async fn delete(&self, user_id: &str) -> Result<bool, StoreError> {
        let mut schedules = self
            .schedules
            .write()
            .map_err(|e| StoreError::Internal(e.to_string()))?;
        Ok(schedules.remove(user_id).is_some())
    }
}
