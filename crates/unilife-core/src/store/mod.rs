//! Store traits
//!
//! The persistent collaborator exposes per-aggregate traits:
//! - StateStore: the versioned UserState ledger
//! - ScheduleStore: the weekly session list
//! - ChoiceStore: actual-universe records, unique per (user, day, hour)
//! - BranchStore: counterfactual records, 1..N per slot
//!
//! Note: Implementations are in the unilife-stores crate. The engine never
//! assumes guarantees stronger than last-write-wins per key, except for the
//! two explicitly-contracted checks: `StateStore::compare_and_put` and the
//! duplicate-slot rejection of `ChoiceStore::insert`.

mod choice_store;
mod schedule_store;
mod state_store;

pub use choice_store::{BranchStore, ChoiceStore};
pub use schedule_store::ScheduleStore;
pub use state_store::StateStore;

use thiserror::Error;

/// Store error types
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Item not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
