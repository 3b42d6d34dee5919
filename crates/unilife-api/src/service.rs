//! DecisionService - the transaction layer over the stores and the
//! synthesizer.
//!
//! Writes follow a strict order with explicit compensation: the Choice is
//! inserted first (its duplicate-slot rejection is the authoritative
//! existence check), then the versioned state, then the branches. A failure
//! at any later step undoes the earlier writes before surfacing
//! [`ApiError::Retryable`], so the caller never observes a half-applied
//! decision.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Datelike, Timelike, Utc};
use tracing::{debug, info, warn};

use unilife_core::resolver::{resolve_slot, two_stage_class_question, ResolverInputs};
use unilife_core::rules::{describe_action, DeltaPolicy};
use unilife_core::scores::{compute_scores, days_passed, weakest_category, ScoreTargets, Scores};
use unilife_core::store::{BranchStore, ChoiceStore, ScheduleStore, StateStore, StoreError};
use unilife_core::timetable::next_class;
use unilife_core::types::{Branch, Category, Choice, SlotType, StateDelta, WEEKDAYS};
use unilife_core::{PendingQuestion, SlotQuestion};
use unilife_synth::BranchSynthesizer;

use crate::{
    ApiError, HistoryView, SettingsRequest, SettingsView, StatisticsView, SubmitChoiceRequest,
    SubmitOutcome, UniverseView,
};

const DEFAULT_DURATION_MINUTES: i64 = 60;

/// The inbound decision API. A thin HTTP layer maps routes onto these
/// methods one-to-one; everything below this trait is transport-agnostic.
#[async_trait]
pub trait DecisionApi: Send + Sync {
    async fn save_settings(
        &self,
        user_id: &str,
        request: SettingsRequest,
        now: DateTime<Utc>,
    ) -> Result<SettingsView, ApiError>;

    async fn get_settings(&self, user_id: &str) -> Result<SettingsView, ApiError>;

    async fn current_question(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<SlotQuestion, ApiError>;

    async fn branch_question(
        &self,
        user_id: &str,
        day: u8,
        hour: u8,
        subject: &str,
        base_choice: &str,
    ) -> Result<PendingQuestion, ApiError>;

    async fn submit_choice(
        &self,
        user_id: &str,
        request: SubmitChoiceRequest,
        now: DateTime<Utc>,
    ) -> Result<SubmitOutcome, ApiError>;

    async fn scores(&self, user_id: &str, now: DateTime<Utc>) -> Result<Scores, ApiError>;

    async fn statistics(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<StatisticsView, ApiError>;

    async fn history(&self, user_id: &str) -> Result<HistoryView, ApiError>;

    async fn history_for_day(&self, user_id: &str, day: u8) -> Result<HistoryView, ApiError>;

    async fn update_choice(
        &self,
        user_id: &str,
        choice_id: &str,
        action: &str,
        cost: i64,
        now: DateTime<Utc>,
    ) -> Result<Choice, ApiError>;

    async fn delete_choice(
        &self,
        user_id: &str,
        choice_id: &str,
        now: DateTime<Utc>,
    ) -> Result<(), ApiError>;

    async fn reset(&self, user_id: &str, now: DateTime<Utc>) -> Result<(), ApiError>;
}

pub struct DecisionService {
    state_store: Arc<dyn StateStore>,
    schedule_store: Arc<dyn ScheduleStore>,
    choice_store: Arc<dyn ChoiceStore>,
    branch_store: Arc<dyn BranchStore>,
    synthesizer: BranchSynthesizer,
    policy: DeltaPolicy,
    targets: ScoreTargets,
}

impl DecisionService {
    pub fn new(
        state_store: Arc<dyn StateStore>,
        schedule_store: Arc<dyn ScheduleStore>,
        choice_store: Arc<dyn ChoiceStore>,
        branch_store: Arc<dyn BranchStore>,
        synthesizer: BranchSynthesizer,
        policy: DeltaPolicy,
        targets: ScoreTargets,
    ) -> Self {
        Self {
            state_store,
            schedule_store,
            choice_store,
            branch_store,
            synthesizer,
            policy,
            targets,
        }
    }

    async fn require_state(
        &self,
        user_id: &str,
    ) -> Result<unilife_core::types::UserState, ApiError> {
        self.state_store
            .get(user_id)
            .await?
            .ok_or_else(|| ApiError::ConfigurationMissing(format!("no settings for {user_id}")))
    }

    async fn require_schedule(
        &self,
        user_id: &str,
    ) -> Result<unilife_core::types::WeekSchedule, ApiError> {
        self.schedule_store
            .get(user_id)
            .await?
            .ok_or_else(|| ApiError::ConfigurationMissing(format!("no schedule for {user_id}")))
    }

    /// Compensated commit of one decided slot: choice, then state, then
    /// branches, undoing earlier writes when a later one fails.
    async fn commit_decision(
        &self,
        old_state: &unilife_core::types::UserState,
        new_state: &unilife_core::types::UserState,
        choice: &Choice,
        branches: &[Branch],
    ) -> Result<(), ApiError> {
        match self.choice_store.insert(choice).await {
            Ok(()) => {}
            Err(StoreError::Conflict(msg)) => return Err(ApiError::Conflict(msg)),
            Err(other) => return Err(other.into()),
        }

        if let Err(err) = self.state_store.compare_and_put(new_state).await {
            warn!(user_id = %choice.user_id, error = %err, "state write failed, undoing choice");
            let _ = self
                .choice_store
                .delete(&choice.user_id, &choice.id)
                .await;
            return Err(ApiError::Retryable(format!(
                "state update lost, decision rolled back: {err}"
            )));
        }

        for branch in branches {
            if let Err(err) = self.branch_store.insert(branch).await {
                warn!(user_id = %choice.user_id, error = %err, "branch write failed, rolling back");
                let _ = self
                    .branch_store
                    .delete_for_slot(&choice.user_id, choice.day, choice.hour)
                    .await;
                let _ = self
                    .choice_store
                    .delete(&choice.user_id, &choice.id)
                    .await;
                let _ = self.state_store.put(old_state).await;
                return Err(ApiError::Retryable(format!(
                    "branch persistence lost, decision rolled back: {err}"
                )));
            }
        }

        Ok(())
    }

    /// Branches for one committed choice. A two-way fork carries its
    /// unchosen options in the request; everything else gets the single
    /// synthesized opposite.
    async fn branches_for(
        &self,
        choice: &Choice,
        request: &SubmitChoiceRequest,
        now: DateTime<Utc>,
    ) -> Vec<Branch> {
        if choice.slot_type == SlotType::AiBranch && !request.parallel_options.is_empty() {
            return request
                .parallel_options
                .iter()
                .map(|opt| {
                    // The earning lexicon reads the human label; the action
                    // id (choice_A/choice_B) carries no vocabulary.
                    let delta = self.policy.resolve(
                        SlotType::AiBranch,
                        &opt.label,
                        opt.cost,
                        choice.duration_minutes,
                        Some(opt.category),
                    );
                    Branch::new(
                        choice.user_id.clone(),
                        choice.day,
                        choice.hour,
                        SlotType::AiBranch,
                        opt.action.clone(),
                        opt.cost,
                        opt.label.clone(),
                        delta,
                        now,
                    )
                })
                .collect();
        }

        let opposite = self
            .synthesizer
            .synthesize(
                choice.slot_type,
                &choice.action,
                choice.cost,
                choice.duration_minutes,
                choice.subject.as_deref(),
                &self.policy,
            )
            .await;
        vec![Branch::new(
            choice.user_id.clone(),
            choice.day,
            choice.hour,
            choice.slot_type,
            opposite.action,
            opposite.cost,
            opposite.description,
            opposite.delta,
            now,
        )]
    }
}

/// Whether an action must arrive with an explicit cost figure. Mirrors the
/// options the resolver tags with `requires_cost`; a fork option needs one
/// exactly when it is finance-tagged.
fn cost_required(slot_type: SlotType, action: &str, category: Option<Category>) -> bool {
    match slot_type {
        SlotType::Class => matches!(action, "attend_coffee" | "skip_play"),
        SlotType::Meal => matches!(action, "restaurant" | "cafeteria" | "convenience" | "custom"),
        SlotType::Sleep => action == "stay_up_play",
        SlotType::FreeTime => matches!(action, "hobby" | "part_time"),
        SlotType::AiBranch => category == Some(Category::Finance),
        _ => false,
    }
}

fn validate_slot(day: u8, hour: u8) -> Result<(), ApiError> {
    if day as usize >= WEEKDAYS {
        return Err(ApiError::InvalidArgument(format!(
            "day {day} outside the tracked week (0-4)"
        )));
    }
    if hour >= 24 {
        return Err(ApiError::InvalidArgument(format!("hour {hour} out of range")));
    }
    Ok(())
}

#[async_trait]
impl DecisionApi for DecisionService {
    async fn save_settings(
        &self,
        user_id: &str,
        request: SettingsRequest,
        now: DateTime<Utc>,
    ) -> Result<SettingsView, ApiError> {
        if request.initial_budget <= 0 {
            return Err(ApiError::InvalidArgument(
                "initial_budget must be positive".to_string(),
            ));
        }

        let state = unilife_core::types::UserState::new(
            user_id,
            request.initial_budget,
            request.timetable,
            now,
        );
        self.state_store.put(&state).await?;
        self.schedule_store.put(user_id, &request.schedule).await?;
        info!(user_id, initial_budget = request.initial_budget, "settings saved");

        Ok(SettingsView {
            user_id: state.user_id,
            initial_budget: state.initial_budget,
            current_budget: state.current_budget,
            week_start: state.week_start,
            timetable: state.timetable,
            schedule: request.schedule,
        })
    }

    async fn get_settings(&self, user_id: &str) -> Result<SettingsView, ApiError> {
        let state = self.require_state(user_id).await?;
        let schedule = self.require_schedule(user_id).await?;
        Ok(SettingsView {
            user_id: state.user_id,
            initial_budget: state.initial_budget,
            current_budget: state.current_budget,
            week_start: state.week_start,
            timetable: state.timetable,
            schedule,
        })
    }

    async fn current_question(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<SlotQuestion, ApiError> {
        let state = self.require_state(user_id).await?;
        let schedule = self.require_schedule(user_id).await?;

        let upcoming = next_class(&state.timetable, &schedule, now);
        let existing_for_next_class = match &upcoming {
            Some(next) => {
                self.choice_store
                    .find_by_slot(user_id, next.day, next.hour)
                    .await?
            }
            None => None,
        };
        let weekday = now.weekday().num_days_from_monday() as usize;
        let existing_for_current_hour = if weekday < WEEKDAYS {
            self.choice_store
                .find_by_slot(user_id, weekday as u8, now.hour() as u8)
                .await?
        } else {
            None
        };

        let first = resolve_slot(ResolverInputs {
            now,
            state: &state,
            schedule: &schedule,
            next_class: upcoming.clone(),
            existing_for_next_class: existing_for_next_class.clone(),
            existing_for_current_hour: existing_for_current_hour.clone(),
            free_time_options: None,
        });

        // Only a free-time slot is worth a collaborator round trip; the
        // second pass re-resolves with the generated pair.
        let is_free_time = matches!(
            &first,
            SlotQuestion::Pending(p) if p.slot_type == SlotType::FreeTime
        );
        if !is_free_time {
            return Ok(first);
        }

        let scores = compute_scores(&state, now, &self.targets);
        let generated = self
            .synthesizer
            .free_time_options(&scores, Some(weakest_category(&scores)))
            .await;
        if generated.is_none() {
            return Ok(first);
        }

        debug!(user_id, "free time question upgraded with generated options");
        Ok(resolve_slot(ResolverInputs {
            now,
            state: &state,
            schedule: &schedule,
            next_class: upcoming,
            existing_for_next_class,
            existing_for_current_hour,
            free_time_options: generated,
        }))
    }

    async fn branch_question(
        &self,
        user_id: &str,
        day: u8,
        hour: u8,
        subject: &str,
        base_choice: &str,
    ) -> Result<PendingQuestion, ApiError> {
        validate_slot(day, hour)?;
        if let Some(existing) = self.choice_store.find_by_slot(user_id, day, hour).await? {
            return Err(ApiError::Conflict(format!(
                "slot (day {day}, hour {hour}) already decided by {}",
                existing.action
            )));
        }
        two_stage_class_question(day, hour, subject, base_choice).ok_or_else(|| {
            ApiError::InvalidArgument(format!("unknown base choice '{base_choice}'"))
        })
    }

    async fn submit_choice(
        &self,
        user_id: &str,
        request: SubmitChoiceRequest,
        now: DateTime<Utc>,
    ) -> Result<SubmitOutcome, ApiError> {
        let state = self.require_state(user_id).await?;
        validate_slot(request.day, request.hour)?;

        let cost = match request.cost {
            Some(cost) if cost < 0 => {
                return Err(ApiError::InvalidCost(format!(
                    "cost must be a non-negative magnitude, got {cost}"
                )));
            }
            Some(cost) => cost,
            None => {
                if cost_required(request.slot_type, &request.action, request.category) {
                    return Err(ApiError::InvalidCost(format!(
                        "cost is required for {}",
                        request.action
                    )));
                }
                0
            }
        };
        let duration = request
            .duration_minutes
            .unwrap_or(DEFAULT_DURATION_MINUTES);
        if duration <= 0 {
            return Err(ApiError::InvalidArgument(format!(
                "duration_minutes must be positive, got {duration}"
            )));
        }

        if let Some(existing) = self
            .choice_store
            .find_by_slot(user_id, request.day, request.hour)
            .await?
        {
            return Ok(SubmitOutcome::AlreadyDecided {
                message: "This hour is already decided.".to_string(),
                existing,
            });
        }

        let delta = self.policy.resolve(
            request.slot_type,
            &request.action,
            cost,
            duration,
            request.category,
        );
        let description = match &request.description {
            Some(text) if !text.trim().is_empty() => text.clone(),
            _ => describe_action(
                request.slot_type,
                &request.action,
                request.subject.as_deref(),
                delta.finance_change,
            ),
        };

        let mut choice = Choice::new(
            user_id,
            request.day,
            request.hour,
            request.slot_type,
            request.action.clone(),
            cost,
            duration,
            now,
        );
        choice.subject = request.subject.clone();
        choice.category = request.category;
        choice.delta = delta;
        choice.description = description;

        let branches = self.branches_for(&choice, &request, now).await;
        let new_state = state.apply(&delta, now);

        match self
            .commit_decision(&state, &new_state, &choice, &branches)
            .await
        {
            Ok(()) => {}
            // A concurrent submission won the slot between the existence
            // check and the insert; report it the same way.
            Err(ApiError::Conflict(_)) => {
                if let Some(existing) = self
                    .choice_store
                    .find_by_slot(user_id, request.day, request.hour)
                    .await?
                {
                    return Ok(SubmitOutcome::AlreadyDecided {
                        message: "This hour is already decided.".to_string(),
                        existing,
                    });
                }
                return Err(ApiError::Retryable(
                    "slot insert conflicted but no record was found".to_string(),
                ));
            }
            Err(other) => return Err(other),
        }

        info!(
            user_id,
            day = request.day,
            hour = request.hour,
            action = %request.action,
            "decision committed"
        );

        Ok(SubmitOutcome::Saved {
            choice_id: choice.id.clone(),
            actual: UniverseView {
                action: choice.action.clone(),
                description: choice.description.clone(),
                delta: choice.delta,
            },
            parallel: branches
                .iter()
                .map(|b| UniverseView {
                    action: b.opposite_action.clone(),
                    description: b.opposite_description.clone(),
                    delta: b.opposite_delta,
                })
                .collect(),
            scores: compute_scores(&new_state, now, &self.targets),
        })
    }

    async fn scores(&self, user_id: &str, now: DateTime<Utc>) -> Result<Scores, ApiError> {
        let state = self.require_state(user_id).await?;
        Ok(compute_scores(&state, now, &self.targets))
    }

    async fn statistics(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<StatisticsView, ApiError> {
        let state = self.require_state(user_id).await?;
        let choices = self.choice_store.list(user_id).await?;

        let days = days_passed(state.week_start, now);
        let class_decisions: Vec<&Choice> = choices
            .iter()
            .filter(|c| c.slot_type == SlotType::Class)
            .collect();
        let attended = class_decisions
            .iter()
            .filter(|c| c.action.starts_with("attend"))
            .count();
        let attendance_rate = if class_decisions.is_empty() {
            0.0
        } else {
            attended as f64 / class_decisions.len() as f64
        };
        let budget_spent = state.initial_budget - state.current_budget;

        Ok(StatisticsView {
            days_passed: days,
            scores: compute_scores(&state, now, &self.targets),
            average_sleep_hours: state.total_sleep_minutes as f64 / 60.0 / days as f64,
            attended_classes: attended,
            total_class_decisions: class_decisions.len(),
            attendance_rate,
            budget_spent,
            daily_average_spend: budget_spent / days,
            total_study_minutes: state.total_study_minutes,
            total_sleep_minutes: state.total_sleep_minutes,
        })
    }

    async fn history(&self, user_id: &str) -> Result<HistoryView, ApiError> {
        Ok(HistoryView {
            choices: self.choice_store.list(user_id).await?,
            branches: self.branch_store.list(user_id).await?,
        })
    }

    async fn history_for_day(&self, user_id: &str, day: u8) -> Result<HistoryView, ApiError> {
        validate_slot(day, 0)?;
        Ok(HistoryView {
            choices: self.choice_store.list_for_day(user_id, day).await?,
            branches: self.branch_store.list_for_day(user_id, day).await?,
        })
    }

    async fn update_choice(
        &self,
        user_id: &str,
        choice_id: &str,
        action: &str,
        cost: i64,
        now: DateTime<Utc>,
    ) -> Result<Choice, ApiError> {
        if cost < 0 {
            return Err(ApiError::InvalidCost(format!(
                "cost must be a non-negative magnitude, got {cost}"
            )));
        }
        let state = self.require_state(user_id).await?;
        let old = self
            .choice_store
            .get(user_id, choice_id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("choice {choice_id}")))?;
        if old.slot_type == SlotType::AiBranch {
            return Err(ApiError::InvalidArgument(
                "generated fork decisions cannot be corrected".to_string(),
            ));
        }

        let new_delta = self.policy.resolve(
            old.slot_type,
            action,
            cost,
            old.duration_minutes,
            old.category,
        );
        let mut updated = old.clone();
        updated.action = action.to_string();
        updated.cost = cost;
        updated.delta = new_delta;
        updated.description = describe_action(
            old.slot_type,
            action,
            old.subject.as_deref(),
            new_delta.finance_change,
        );

        // One combined delta keeps the state write a single version step.
        let correction = StateDelta {
            finance_change: new_delta.finance_change - old.delta.finance_change,
            sleep_change_minutes: new_delta.sleep_change_minutes - old.delta.sleep_change_minutes,
            study_change_minutes: new_delta.study_change_minutes - old.delta.study_change_minutes,
        };
        let new_state = state.apply(&correction, now);

        self.choice_store.update(&updated).await?;
        if let Err(err) = self.state_store.compare_and_put(&new_state).await {
            warn!(user_id, choice_id, error = %err, "state write failed, undoing correction");
            let _ = self.choice_store.update(&old).await;
            return Err(ApiError::Retryable(format!(
                "state update lost, correction rolled back: {err}"
            )));
        }

        // Regenerate the counterfactual for the corrected action.
        let old_branches = self.branch_store.list_for_day(user_id, old.day).await?;
        let old_branches: Vec<Branch> = old_branches
            .into_iter()
            .filter(|b| b.hour == old.hour)
            .collect();
        self.branch_store
            .delete_for_slot(user_id, old.day, old.hour)
            .await?;
        let branches = self
            .branches_for(
                &updated,
                &SubmitChoiceRequest {
                    day: updated.day,
                    hour: updated.hour,
                    slot_type: updated.slot_type,
                    action: updated.action.clone(),
                    subject: updated.subject.clone(),
                    category: updated.category,
                    cost: Some(updated.cost),
                    duration_minutes: Some(updated.duration_minutes),
                    description: None,
                    parallel_options: Vec::new(),
                },
                now,
            )
            .await;
        for branch in &branches {
            if let Err(err) = self.branch_store.insert(branch).await {
                warn!(user_id, choice_id, error = %err, "branch regeneration failed, restoring");
                let _ = self
                    .branch_store
                    .delete_for_slot(user_id, old.day, old.hour)
                    .await;
                for previous in &old_branches {
                    let _ = self.branch_store.insert(previous).await;
                }
                let _ = self.choice_store.update(&old).await;
                let _ = self.state_store.put(&state).await;
                return Err(ApiError::Retryable(format!(
                    "branch persistence lost, correction rolled back: {err}"
                )));
            }
        }

        info!(user_id, choice_id, action, "decision corrected");
        Ok(updated)
    }

    async fn delete_choice(
        &self,
        user_id: &str,
        choice_id: &str,
        now: DateTime<Utc>,
    ) -> Result<(), ApiError> {
        let state = self.require_state(user_id).await?;
        let choice = self
            .choice_store
            .get(user_id, choice_id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("choice {choice_id}")))?;

        let rolled_back = state.apply(&choice.delta.inverse(), now);

        if !self.choice_store.delete(user_id, choice_id).await? {
            return Err(ApiError::NotFound(format!("choice {choice_id}")));
        }
        if let Err(err) = self.state_store.compare_and_put(&rolled_back).await {
            warn!(user_id, choice_id, error = %err, "state write failed, restoring choice");
            let _ = self.choice_store.insert(&choice).await;
            return Err(ApiError::Retryable(format!(
                "state update lost, deletion rolled back: {err}"
            )));
        }
        self.branch_store
            .delete_for_slot(user_id, choice.day, choice.hour)
            .await?;

        info!(user_id, choice_id, "decision removed and rolled back");
        Ok(())
    }

    async fn reset(&self, user_id: &str, now: DateTime<Utc>) -> Result<(), ApiError> {
        let state = self.require_state(user_id).await?;
        self.state_store.put(&state.reset(now)).await?;
        self.choice_store.clear(user_id).await?;
        self.branch_store.clear(user_id).await?;
        info!(user_id, "week reset");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use unilife_core::types::{ClassSession, Timetable, WeekSchedule};
    use unilife_stores::{
        InMemoryBranchStore, InMemoryChoiceStore, InMemoryScheduleStore, InMemoryStateStore,
    };

    /// 2026-08-24 is a Monday.
    fn at(day_offset: u32, hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 24 + day_offset, hour, minute, 0)
            .unwrap()
    }

    fn service() -> DecisionService {
        DecisionService::new(
            Arc::new(InMemoryStateStore::new()),
            Arc::new(InMemoryScheduleStore::new()),
            Arc::new(InMemoryChoiceStore::new()),
            Arc::new(InMemoryBranchStore::new()),
            BranchSynthesizer::deterministic(),
            DeltaPolicy::default(),
            ScoreTargets::default(),
        )
    }

    fn settings() -> SettingsRequest {
        let mut timetable = Timetable::default();
        timetable.0[0][0] = 1; // Monday period 1
        let mut schedule = WeekSchedule::default();
        schedule.days[0].push(ClassSession {
            start: 540,
            end: 615,
            subject: "Calculus".to_string(),
        });
        SettingsRequest {
            initial_budget: 100_000,
            timetable,
            schedule,
        }
    }

    fn submit(day: u8, hour: u8, slot_type: SlotType, action: &str) -> SubmitChoiceRequest {
        SubmitChoiceRequest {
            day,
            hour,
            slot_type,
            action: action.to_string(),
            subject: None,
            category: None,
            cost: None,
            duration_minutes: None,
            description: None,
            parallel_options: Vec::new(),
        }
    }

    fn saved(outcome: SubmitOutcome) -> (String, Vec<UniverseView>, Scores) {
        match outcome {
            SubmitOutcome::Saved {
                choice_id,
                parallel,
                scores,
                ..
            } => (choice_id, parallel, scores),
            other => panic!("expected saved, got {other:?}"),
        }
    }

    #[test]
    fn test_submit_commits_choice_state_and_branch() {
        tokio_test::block_on(async {
            let svc = service();
            svc.save_settings("u1", settings(), at(0, 8, 0)).await.unwrap();

            let mut request = submit(0, 9, SlotType::Class, "attend");
            request.subject = Some("Calculus".to_string());
            request.duration_minutes = Some(75);
            let (_, parallel, _) = saved(
                svc.submit_choice("u1", request, at(0, 9, 0)).await.unwrap(),
            );
            assert_eq!(parallel.len(), 1);
            assert_eq!(parallel[0].action, "skip_sleep");

            let stats = svc.statistics("u1", at(0, 10, 0)).await.unwrap();
            assert_eq!(stats.total_study_minutes, 75);
            assert_eq!(stats.attended_classes, 1);
            assert_eq!(stats.attendance_rate, 1.0);

            let history = svc.history("u1").await.unwrap();
            assert_eq!(history.choices.len(), 1);
            assert_eq!(history.branches.len(), 1);
        });
    }

    #[test]
    fn test_second_submission_reports_already_decided() {
        tokio_test::block_on(async {
            let svc = service();
            svc.save_settings("u1", settings(), at(0, 8, 0)).await.unwrap();

            svc.submit_choice("u1", submit(0, 9, SlotType::Class, "attend"), at(0, 9, 0))
                .await
                .unwrap();
            let outcome = svc
                .submit_choice("u1", submit(0, 9, SlotType::Class, "skip_sleep"), at(0, 9, 5))
                .await
                .unwrap();
            match outcome {
                SubmitOutcome::AlreadyDecided { existing, .. } => {
                    assert_eq!(existing.action, "attend");
                }
                other => panic!("expected already-decided, got {other:?}"),
            }

            // The duplicate must not have moved the counters.
            let stats = svc.statistics("u1", at(0, 10, 0)).await.unwrap();
            assert_eq!(stats.total_study_minutes, 60);
        });
    }

    #[test]
    fn test_negative_cost_is_rejected_before_any_write() {
        tokio_test::block_on(async {
            let svc = service();
            svc.save_settings("u1", settings(), at(0, 8, 0)).await.unwrap();

            let mut request = submit(0, 12, SlotType::Meal, "restaurant");
            request.cost = Some(-500);
            let err = svc
                .submit_choice("u1", request, at(0, 12, 0))
                .await
                .unwrap_err();
            assert_eq!(err.code(), crate::ErrorCode::InvalidCost);
            assert!(svc.history("u1").await.unwrap().choices.is_empty());
        });
    }

    #[test]
    fn test_missing_cost_on_cost_requiring_action_is_rejected() {
        tokio_test::block_on(async {
            let svc = service();
            svc.save_settings("u1", settings(), at(0, 8, 0)).await.unwrap();

            // A paid meal without a cost figure must not commit at zero.
            let err = svc
                .submit_choice("u1", submit(0, 12, SlotType::Meal, "restaurant"), at(0, 12, 0))
                .await
                .unwrap_err();
            assert_eq!(err.code(), crate::ErrorCode::InvalidCost);
            assert!(svc.history("u1").await.unwrap().choices.is_empty());
            assert_eq!(svc.get_settings("u1").await.unwrap().current_budget, 100_000);

            let err = svc
                .submit_choice("u1", submit(0, 15, SlotType::FreeTime, "hobby"), at(0, 15, 0))
                .await
                .unwrap_err();
            assert_eq!(err.code(), crate::ErrorCode::InvalidCost);

            // A finance-tagged fork option needs its figure too.
            let mut fork = submit(0, 16, SlotType::AiBranch, "choice_B");
            fork.category = Some(Category::Finance);
            let err = svc.submit_choice("u1", fork, at(0, 16, 0)).await.unwrap_err();
            assert_eq!(err.code(), crate::ErrorCode::InvalidCost);

            // Free actions still submit without one.
            let skipped = svc
                .submit_choice("u1", submit(0, 12, SlotType::Meal, "skip"), at(0, 12, 0))
                .await
                .unwrap();
            assert!(matches!(skipped, SubmitOutcome::Saved { .. }));
        });
    }

    #[test]
    fn test_missing_settings_is_configuration_missing() {
        tokio_test::block_on(async {
            let svc = service();
            let err = svc.current_question("ghost", at(0, 9, 30)).await.unwrap_err();
            assert_eq!(err.code(), crate::ErrorCode::ConfigurationMissing);
        });
    }

    #[test]
    fn test_current_question_is_idempotent_and_writes_nothing() {
        tokio_test::block_on(async {
            let svc = service();
            svc.save_settings("u1", settings(), at(0, 8, 0)).await.unwrap();

            let first = svc.current_question("u1", at(1, 15, 0)).await.unwrap();
            let second = svc.current_question("u1", at(1, 15, 0)).await.unwrap();
            assert_eq!(first, second);
            assert!(svc.history("u1").await.unwrap().choices.is_empty());
        });
    }

    #[test]
    fn test_scenario_skip_play_penalty() {
        tokio_test::block_on(async {
            let svc = service();
            svc.save_settings("u1", settings(), at(0, 8, 0)).await.unwrap();

            let mut request = submit(0, 9, SlotType::Class, "skip_play");
            request.cost = Some(5_000);
            request.duration_minutes = Some(75);
            svc.submit_choice("u1", request, at(0, 9, 0)).await.unwrap();

            let view = svc.get_settings("u1").await.unwrap();
            assert_eq!(view.current_budget, 95_000);
            let stats = svc.statistics("u1", at(0, 10, 0)).await.unwrap();
            assert_eq!(stats.total_study_minutes, -75);
            assert_eq!(stats.total_sleep_minutes, 0);
        });
    }

    #[test]
    fn test_fork_submission_writes_one_branch_per_unchosen_option() {
        tokio_test::block_on(async {
            let svc = service();
            svc.save_settings("u1", settings(), at(0, 8, 0)).await.unwrap();

            let mut request = submit(0, 15, SlotType::AiBranch, "choice_A");
            request.category = Some(Category::Sleep);
            request.parallel_options = vec![crate::ParallelOption {
                action: "choice_B".to_string(),
                label: "Pick up a cafe shift".to_string(),
                category: Category::Finance,
                cost: 8_000,
            }];
            let (_, parallel, _) = saved(
                svc.submit_choice("u1", request, at(0, 15, 0)).await.unwrap(),
            );
            assert_eq!(parallel.len(), 1);
            // Finance-tagged shift earns in the alternate universe.
            assert_eq!(parallel[0].delta.finance_change, 8_000);

            let history = svc.history_for_day("u1", 0).await.unwrap();
            assert_eq!(history.branches.len(), 1);
            assert_eq!(history.branches[0].opposite_action, "choice_B");
        });
    }

    struct FailingBranchStore;

    #[async_trait]
    impl BranchStore for FailingBranchStore {
        async fn insert(&self, _branch: &Branch) -> Result<(), StoreError> {
            Err(StoreError::Io("disk full".to_string()))
        }
        async fn list(&self, _user_id: &str) -> Result<Vec<Branch>, StoreError> {
            Ok(Vec::new())
        }
        async fn list_for_day(&self, _user_id: &str, _day: u8) -> Result<Vec<Branch>, StoreError> {
            Ok(Vec::new())
        }
        async fn delete_for_slot(
            &self,
            _user_id: &str,
            _day: u8,
            _hour: u8,
        ) -> Result<usize, StoreError> {
            Ok(0)
        }
        async fn clear(&self, _user_id: &str) -> Result<(), StoreError> {
            Ok(())
        }
    }

    #[test]
    fn test_branch_failure_rolls_the_whole_decision_back() {
        tokio_test::block_on(async {
            let svc = DecisionService::new(
                Arc::new(InMemoryStateStore::new()),
                Arc::new(InMemoryScheduleStore::new()),
                Arc::new(InMemoryChoiceStore::new()),
                Arc::new(FailingBranchStore),
                BranchSynthesizer::deterministic(),
                DeltaPolicy::default(),
                ScoreTargets::default(),
            );
            svc.save_settings("u1", settings(), at(0, 8, 0)).await.unwrap();

            let err = svc
                .submit_choice("u1", submit(0, 9, SlotType::Class, "attend"), at(0, 9, 0))
                .await
                .unwrap_err();
            assert_eq!(err.code(), crate::ErrorCode::Retryable);

            // Counters untouched, slot free again.
            let view = svc.get_settings("u1").await.unwrap();
            assert_eq!(view.current_budget, 100_000);
            let stats = svc.statistics("u1", at(0, 10, 0)).await.unwrap();
            assert_eq!(stats.total_study_minutes, 0);
            assert!(svc.history("u1").await.unwrap().choices.is_empty());
        });
    }

    #[test]
    fn test_update_choice_rolls_back_and_reapplies() {
        tokio_test::block_on(async {
            let svc = service();
            svc.save_settings("u1", settings(), at(0, 8, 0)).await.unwrap();

            let mut request = submit(0, 9, SlotType::Class, "attend");
            request.duration_minutes = Some(75);
            let (choice_id, _, _) = saved(
                svc.submit_choice("u1", request, at(0, 9, 0)).await.unwrap(),
            );

            let updated = svc
                .update_choice("u1", &choice_id, "skip_sleep", 0, at(0, 10, 0))
                .await
                .unwrap();
            assert_eq!(updated.action, "skip_sleep");

            let stats = svc.statistics("u1", at(0, 11, 0)).await.unwrap();
            assert_eq!(stats.total_study_minutes, 0);
            assert_eq!(stats.total_sleep_minutes, 75);

            // The counterfactual was regenerated for the new action.
            let history = svc.history_for_day("u1", 0).await.unwrap();
            assert_eq!(history.branches.len(), 1);
            assert_eq!(history.branches[0].opposite_action, "attend");
        });
    }

    #[test]
    fn test_delete_choice_rolls_back_and_drops_branches() {
        tokio_test::block_on(async {
            let svc = service();
            svc.save_settings("u1", settings(), at(0, 8, 0)).await.unwrap();

            let mut request = submit(0, 12, SlotType::Meal, "restaurant");
            request.cost = Some(12_000);
            let (choice_id, _, _) = saved(
                svc.submit_choice("u1", request, at(0, 12, 0)).await.unwrap(),
            );
            assert_eq!(svc.get_settings("u1").await.unwrap().current_budget, 88_000);

            svc.delete_choice("u1", &choice_id, at(0, 13, 0)).await.unwrap();
            assert_eq!(svc.get_settings("u1").await.unwrap().current_budget, 100_000);
            let history = svc.history("u1").await.unwrap();
            assert!(history.choices.is_empty());
            assert!(history.branches.is_empty());

            let err = svc
                .delete_choice("u1", &choice_id, at(0, 13, 5))
                .await
                .unwrap_err();
            assert_eq!(err.code(), crate::ErrorCode::NotFound);
        });
    }

    #[test]
    fn test_fork_decisions_cannot_be_corrected() {
        tokio_test::block_on(async {
            let svc = service();
            svc.save_settings("u1", settings(), at(0, 8, 0)).await.unwrap();

            let mut request = submit(0, 15, SlotType::AiBranch, "choice_A");
            request.category = Some(Category::Study);
            let (choice_id, _, _) = saved(
                svc.submit_choice("u1", request, at(0, 15, 0)).await.unwrap(),
            );

            let err = svc
                .update_choice("u1", &choice_id, "choice_B", 0, at(0, 16, 0))
                .await
                .unwrap_err();
            assert_eq!(err.code(), crate::ErrorCode::InvalidArgument);
        });
    }

    #[test]
    fn test_reset_restores_counters_and_clears_history() {
        tokio_test::block_on(async {
            let svc = service();
            svc.save_settings("u1", settings(), at(0, 8, 0)).await.unwrap();
            let mut request = submit(0, 12, SlotType::Meal, "restaurant");
            request.cost = Some(9_000);
            svc.submit_choice("u1", request, at(0, 12, 0)).await.unwrap();

            svc.reset("u1", at(2, 0, 0)).await.unwrap();

            let view = svc.get_settings("u1").await.unwrap();
            assert_eq!(view.current_budget, 100_000);
            assert_eq!(view.week_start, at(2, 0, 0));
            assert!(svc.history("u1").await.unwrap().choices.is_empty());

            // The freed slot can be decided again.
            let outcome = svc
                .submit_choice("u1", submit(0, 12, SlotType::Meal, "skip"), at(2, 12, 0))
                .await
                .unwrap();
            assert!(matches!(outcome, SubmitOutcome::Saved { .. }));
        });
    }

    #[test]
    fn test_branch_question_narrows_the_base_choice() {
        tokio_test::block_on(async {
            let svc = service();
            svc.save_settings("u1", settings(), at(0, 8, 0)).await.unwrap();

            let question = svc
                .branch_question("u1", 0, 9, "Calculus", "skip_base")
                .await
                .unwrap();
            assert!(question.final_stage);
            assert_eq!(question.options[0].value, "skip_sleep");

            let err = svc
                .branch_question("u1", 0, 9, "Calculus", "nonsense")
                .await
                .unwrap_err();
            assert_eq!(err.code(), crate::ErrorCode::InvalidArgument);
        });
    }
}
