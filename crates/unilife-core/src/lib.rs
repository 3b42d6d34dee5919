//! # Unilife Core
//!
//! Core abstractions and deterministic logic for the Unilife temporal
//! decision engine.
//!
//! This crate contains:
//! - UserState / StateDelta / Choice / Branch definitions
//! - Timetable Index (period windows, next-class scan)
//! - Score Aggregator (normalized 0-100 scores, weakest category)
//! - Slot Resolver (which decision is due "now")
//! - Choice Resolution Engine (action -> signed counter deltas)
//! - Store traits (implementations live in unilife-stores)
//!
//! This crate does NOT care about:
//! - How state is persisted
//! - How the generative collaborator is reached
//! - How questions and answers travel over the wire
//!
//! Every function here takes "now" as a parameter; nothing reads the wall
//! clock, so the whole crate is deterministic under test.

pub mod resolver;
pub mod rules;
pub mod scores;
pub mod store;
pub mod timetable;
pub mod types;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::resolver::{
        resolve_slot, two_stage_class_question, PendingQuestion, QuestionOption, ResolverInputs,
        SlotQuestion,
    };
    pub use crate::rules::{describe_action, DeltaPolicy, Penalty};
    pub use crate::scores::{compute_scores, days_passed, weakest_category, ScoreTargets, Scores};
    pub use crate::store::{BranchStore, ChoiceStore, ScheduleStore, StateStore, StoreError};
    pub use crate::timetable::{next_class, period_for_clock_time, NextClass, PERIOD_WINDOWS};
    pub use crate::types::{
        Branch, Category, Choice, ClassSession, FreeTimeOption, FreeTimePair, SlotType, StateDelta,
        Timetable, UserState, WeekSchedule,
    };
}

pub use resolver::{resolve_slot, PendingQuestion, SlotQuestion};
pub use rules::{DeltaPolicy, Penalty};
pub use scores::{compute_scores, weakest_category, ScoreTargets, Scores};
pub use store::{BranchStore, ChoiceStore, ScheduleStore, StateStore, StoreError};
pub use timetable::{next_class, NextClass};
pub use types::{
    Branch, Category, Choice, ClassSession, SlotType, StateDelta, Timetable, UserState,
    WeekSchedule,
};
