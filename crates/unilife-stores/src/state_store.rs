//! StateStore in-memory implementation.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

use unilife_core::store::{StateStore, StoreError};
use unilife_core::types::UserState;

/// In-memory implementation for development and testing.
#[derive(Default)]
pub struct InMemoryStateStore {
    states: RwLock<HashMap<String, UserState>>,
}

impl InMemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StateStore for InMemoryStateStore {
    async fn get(&self, user_id: &str) -> Result<Option<UserState>, StoreError> {
        let states = self
            .states
            .read()
            .map_err(|e| StoreError::Internal(e.to_string()))?;
        Ok(states.get(user_id).cloned())
    }

    async fn put(&self, state: &UserState) -> Result<(), StoreError> {
        let mut states = self
            .states
            .write()
            .map_err(|e| StoreError::Internal(e.to_string()))?;
        states.insert(state.user_id.clone(), state.clone());
        Ok(())
    }

    async fn compare_and_put(&self, state: &UserState) -> Result<(), StoreError> {
        let mut states = self
            .states
            .write()
            .map_err(|e| StoreError::Internal(e.to_string()))?;
        let stored_version = states.get(&state.user_id).map(|s| s.version);
        let expected = state.version.saturating_sub(1);
        match stored_version {
            None if state.version == 1 => {}
            Some(v) if v == expected => {}
            _ => {
                return Err(StoreError::Conflict(format!(
                    "state version mismatch for {}: stored {:?}, writing {}",
                    state.user_id, stored_version, state.version
                )))
            }
        }
        states.insert(state.user_id.clone(), state.clone());
        Ok(())
    }

    async fn delete(&self, user_id: &str) -> Result<bool, StoreError> {
        let mut states = self
            .states
            .write()
            .map_err(|e| StoreError::Internal(e.to_string()))?;
        Ok(states.remove(user_id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use unilife_core::types::{StateDelta, Timetable};

    #[test]
    fn test_compare_and_put_enforces_version_sequence() {
        tokio_test::block_on(async {
            let store = InMemoryStateStore::new();
            let s1 = UserState::new("u1", 100_000, Timetable::default(), Utc::now());
            store.compare_and_put(&s1).await.unwrap();

            let s2 = s1.apply(&StateDelta::ZERO, Utc::now());
            store.compare_and_put(&s2).await.unwrap();

            // Re-writing the same version loses the race.
            let stale = s1.apply(&StateDelta::ZERO, Utc::now());
            assert!(matches!(
                store.compare_and_put(&stale).await,
                Err(StoreError::Conflict(_))
            ));

            // An unconditional put always lands.
            store.put(&s1).await.unwrap();
            assert_eq!(store.get("u1").await.unwrap().unwrap().version, 1);
        });
    }
}
