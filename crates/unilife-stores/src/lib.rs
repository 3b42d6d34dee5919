//! # Unilife Stores
//!
//! In-memory implementations of the unilife-core store traits, for
//! development and testing. Each store is a RwLock-guarded map keyed the
//! same way a backing database would be; the contracted checks (optimistic
//! state writes, duplicate-slot rejection) are enforced here so service
//! tests exercise the real failure paths.

mod choice_store;
mod schedule_store;
mod state_store;

pub use choice_store::{InMemoryBranchStore, InMemoryChoiceStore};
pub use schedule_store::InMemoryScheduleStore;
pub use state_store::InMemoryStateStore;
