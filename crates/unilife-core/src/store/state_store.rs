//! StateStore - versioned UserState persistence trait.

use async_trait::async_trait;

use super::StoreError;
use crate::types::UserState;

/// Persistence seam for the cumulative ledger, keyed by user id.
#[async_trait]
pub trait StateStore: Send + Sync {
    async fn get(&self, user_id: &str) -> Result<Option<UserState>, StoreError>;

    /// Unconditional write (settings submission, reset, rollback).
    async fn put(&self, state: &UserState) -> Result<(), StoreError>;

    /// Optimistic write: succeeds only when the stored version is exactly
    /// `state.version - 1` (or the record is new at version 1). Anything
    /// else is a [`StoreError::Conflict`], which surfaces a lost race to
    /// the caller instead of double-applying a delta.
    async fn compare_and_put(&self, state: &UserState) -> Result<(), StoreError>;

    async fn delete(&self, user_id: &str) -> Result<bool, StoreError>;
}
