//! # Unilife API
//!
//! Inbound decision API: request/response DTOs, the error taxonomy, and the
//! `DecisionService` transaction layer. A thin HTTP layer maps routes onto
//! [`DecisionApi`] one-to-one; nothing in here knows about transports.

mod dto;
mod error;
mod service;

pub use dto::{
    HistoryView, ParallelOption, SettingsRequest, SettingsView, StatisticsView,
    SubmitChoiceRequest, SubmitOutcome, UniverseView,
};
pub use error::{ApiError, ErrorCode};
pub use service::{DecisionApi, DecisionService};
