//! ChoiceStore / BranchStore in-memory implementations.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

use unilife_core::store::{BranchStore, ChoiceStore, StoreError};
use unilife_core::types::{Branch, Choice};

/// In-memory Choice records keyed by user id.
#[derive(Default)]
pub struct InMemoryChoiceStore {
    choices: RwLock<HashMap<String, Vec<Choice>>>,
}

impl InMemoryChoiceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn sorted_by_slot(mut records: Vec<Choice>) -> Vec<Choice> {
    records.sort_by_key(|c| (c.day, c.hour));
    records
}

#[async_trait]
impl ChoiceStore for InMemoryChoiceStore {
    async fn insert(&self, choice: &Choice) -> Result<(), StoreError> {
        let mut choices = self
            .choices
            .write()
            .map_err(|e| StoreError::Internal(e.to_string()))?;
        let records = choices.entry(choice.user_id.clone()).or_default();
        if records
            .iter()
            .any(|c| c.day == choice.day && c.hour == choice.hour)
        {
            return Err(StoreError::Conflict(format!(
                "slot (day {}, hour {}) already decided for {}",
                choice.day, choice.hour, choice.user_id
            )));
        }
        records.push(choice.clone());
        Ok(())
    }

    async fn find_by_slot(
        &self,
        user_id: &str,
        day: u8,
        hour: u8,
    ) -> Result<Option<Choice>, StoreError> {
        let choices = self
            .choices
            .read()
            .map_err(|e| StoreError::Internal(e.to_string()))?;
        Ok(choices
            .get(user_id)
            .and_then(|records| records.iter().find(|c| c.day == day && c.hour == hour))
            .cloned())
    }

    async fn get(&self, user_id: &str, id: &str) -> Result<Option<Choice>, StoreError> {
        let choices = self
            .choices
            .read()
            .map_err(|e| StoreError::Internal(e.to_string()))?;
        Ok(choices
            .get(user_id)
            .and_then(|records| records.iter().find(|c| c.id == id))
            .cloned())
    }

    async fn update(&self, choice: &Choice) -> Result<(), StoreError> {
        let mut choices = self
            .choices
            .write()
            .map_err(|e| StoreError::Internal(e.to_string()))?;
        let records = choices
            .get_mut(&choice.user_id)
            .ok_or_else(|| StoreError::NotFound(choice.id.clone()))?;
        let slot = records
            .iter_mut()
            .find(|c| c.id == choice.id)
            .ok_or_else(|| StoreError::NotFound(choice.id.clone()))?;
        *slot = choice.clone();
        Ok(())
    }

    async fn delete(&self, user_id: &str, id: &str) -> Result<bool, StoreError> {
        let mut choices = self
            .choices
            .write()
            .map_err(|e| StoreError::Internal(e.to_string()))?;
        let Some(records) = choices.get_mut(user_id) else {
            return Ok(false);
        };
        let before = records.len();
        records.retain(|c| c.id != id);
        Ok(records.len() != before)
    }

    async fn list(&self, user_id: &str) -> Result<Vec<Choice>, StoreError> {
        let choices = self
            .choices
            .read()
            .map_err(|e| StoreError::Internal(e.to_string()))?;
        Ok(sorted_by_slot(
            choices.get(user_id).cloned().unwrap_or_default(),
        ))
    }

    async fn list_for_day(&self, user_id: &str, day: u8) -> Result<Vec<Choice>, StoreError> {
        let all = self.list(user_id).await?;
        Ok(all.into_iter().filter(|c| c.day == day).collect())
    }

    async fn clear(&self, user_id: &str) -> Result<(), StoreError> {
        let mut choices = self
            .choices
            .write()
            .map_err(|e| StoreError::Internal(e.to_string()))?;
        choices.remove(user_id);
        Ok(())
    }
}

/// In-memory Branch records keyed by user id.
#[derive(Default)]
pub struct InMemoryBranchStore {
    branches: RwLock<HashMap<String, Vec<Branch>>>,
}

impl InMemoryBranchStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BranchStore for InMemoryBranchStore {
    async fn insert(&self, branch: &Branch) -> Result<(), StoreError> {
        let mut branches = self
            .branches
            .write()
            .map_err(|e| StoreError::Internal(e.to_string()))?;
        branches
            .entry(branch.user_id.clone())
            .or_default()
            .push(branch.clone());
        Ok(())
    }

    async fn list(&self, user_id: &str) -> Result<Vec<Branch>, StoreError> {
        let branches = self
            .branches
            .read()
            .map_err(|e| StoreError::Internal(e.to_string()))?;
        let mut records = branches.get(user_id).cloned().unwrap_or_default();
        records.sort_by_key(|b| (b.day, b.hour));
        Ok(records)
    }

    async fn list_for_day(&self, user_id: &str, day: u8) -> Result<Vec<Branch>, StoreError> {
        let all = self.list(user_id).await?;
        Ok(all.into_iter().filter(|b| b.day == day).collect())
    }

    async fn delete_for_slot(
        &self,
        user_id: &str,
        day: u8,
        hour: u8,
    ) -> Result<usize, StoreError> {
        let mut branches = self
            .branches
            .write()
            .map_err(|e| StoreError::Internal(e.to_string()))?;
        let Some(records) = branches.get_mut(user_id) else {
            return Ok(0);
        };
        let before = records.len();
        records.retain(|b| !(b.day == day && b.hour == hour));
        Ok(before - records.len())
    }

    async fn clear(&self, user_id: &str) -> Result<(), StoreError> {
        let mut branches = self
            .branches
            .write()
            .map_err(|e| StoreError::Internal(e.to_string()))?;
        branches.remove(user_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use unilife_core::types::{SlotType, StateDelta};

    fn choice(user: &str, day: u8, hour: u8) -> Choice {
        Choice::new(user, day, hour, SlotType::Meal, "cafeteria", 6000, 60, Utc::now())
    }

    #[test]
    fn test_insert_rejects_duplicate_slot() {
        tokio_test::block_on(async {
            let store = InMemoryChoiceStore::new();
            store.insert(&choice("u1", 0, 12)).await.unwrap();

            // Same slot, different record id: the store still says no.
            assert!(matches!(
                store.insert(&choice("u1", 0, 12)).await,
                Err(StoreError::Conflict(_))
            ));

            // Other users and other slots are unaffected.
            store.insert(&choice("u2", 0, 12)).await.unwrap();
            store.insert(&choice("u1", 0, 13)).await.unwrap();
        });
    }

    #[test]
    fn test_list_orders_by_day_then_hour() {
        tokio_test::block_on(async {
            let store = InMemoryChoiceStore::new();
            store.insert(&choice("u1", 2, 9)).await.unwrap();
            store.insert(&choice("u1", 0, 18)).await.unwrap();
            store.insert(&choice("u1", 0, 12)).await.unwrap();

            let slots: Vec<(u8, u8)> = store
                .list("u1")
                .await
                .unwrap()
                .iter()
                .map(|c| (c.day, c.hour))
                .collect();
            assert_eq!(slots, [(0, 12), (0, 18), (2, 9)]);
        });
    }

    #[test]
    fn test_branch_slot_deletion_counts_removals() {
        tokio_test::block_on(async {
            let store = InMemoryBranchStore::new();
            for action in ["rest", "study"] {
                store
                    .insert(&Branch::new(
                        "u1",
                        1,
                        15,
                        SlotType::AiBranch,
                        action,
                        0,
                        "alt",
                        StateDelta::ZERO,
                        Utc::now(),
                    ))
                    .await
                    .unwrap();
            }

            assert_eq!(store.delete_for_slot("u1", 1, 15).await.unwrap(), 2);
            assert_eq!(store.delete_for_slot("u1", 1, 15).await.unwrap(), 0);
            assert!(store.list("u1").await.unwrap().is_empty());
        });
    }
}
