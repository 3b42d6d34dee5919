//! ChoiceStore / BranchStore - per-slot record persistence traits.

use async_trait::async_trait;

use super::StoreError;
use crate::types::{Branch, Choice};

/// Actual-universe records. The store itself enforces the at-most-one
/// Choice per (user, day, hour) invariant: `insert` is insert-if-absent.
#[async_trait]
pub trait ChoiceStore: Send + Sync {
    /// Insert a new record; a duplicate (user, day, hour) key is a
    /// [`StoreError::Conflict`].
    async fn insert(&self, choice: &Choice) -> Result<(), StoreError>;

    async fn find_by_slot(
        &self,
        user_id: &str,
        day: u8,
        hour: u8,
    ) -> Result<Option<Choice>, StoreError>;

    async fn get(&self, user_id: &str, id: &str) -> Result<Option<Choice>, StoreError>;

    /// Replace an existing record in place (corrections only).
    async fn update(&self, choice: &Choice) -> Result<(), StoreError>;

    async fn delete(&self, user_id: &str, id: &str) -> Result<bool, StoreError>;

    /// All records for a user, ordered by (day, hour).
    async fn list(&self, user_id: &str) -> Result<Vec<Choice>, StoreError>;

    /// Records for one weekday, ordered by hour.
    async fn list_for_day(&self, user_id: &str, day: u8) -> Result<Vec<Choice>, StoreError>;

    async fn clear(&self, user_id: &str) -> Result<(), StoreError>;
}

/// Counterfactual records; a slot may hold several.
#[async_trait]
pub trait BranchStore: Send + Sync {
    async fn insert(&self, branch: &Branch) -> Result<(), StoreError>;

    /// All branches for a user, ordered by (day, hour).
    async fn list(&self, user_id: &str) -> Result<Vec<Branch>, StoreError>;

    async fn list_for_day(&self, user_id: &str, day: u8) -> Result<Vec<Branch>, StoreError>;

    /// Drop every branch under one slot key; returns how many were removed.
    async fn delete_for_slot(&self, user_id: &str, day: u8, hour: u8)
        -> Result<usize, StoreError>;

    async fn clear(&self, user_id: &str) -> Result<(), StoreError>;
}
