//! Savings goals for the planning view.
//!
//! Goals live for the session only; nothing here touches the record store.

use chrono::{NaiveDate, Utc};
use log::info;
use serde::{Deserialize, Serialize};
use shared::{Goal, GoalCategory, MonthsToGoal};
use thiserror::Error;

use crate::services::localization::{translate, Language, TranslationKey};

/// Quick progress adjustments offered next to each goal
pub const PROGRESS_PRESETS: [f64; 3] = [500.0, 1000.0, -500.0];

const DEADLINE_FORMAT: &str = "%Y-%m-%d";

/// The two goals a new planning view opens with: an emergency fund and a car
pub fn example_goals(language: Language) -> Vec<Goal> {
    let examples = [
        (1, TranslationKey::EmergencyFund, 30000.0, 8000.0, (2024, 12, 31), GoalCategory::Emergency),
        (2, TranslationKey::NewCar, 80000.0, 15000.0, (2025, 6, 30), GoalCategory::Purchase),
    ];
    examples
        .into_iter()
        .filter_map(|(seq, title, target_amount, current_amount, (y, m, d), category)| {
            Some(Goal {
                id: Goal::generate_id(seq),
                title: translate(language, title).to_string(),
                target_amount,
                current_amount,
                deadline: NaiveDate::from_ymd_opt(y, m, d)?,
                category,
            })
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GoalValidationError {
    #[error("goal title is required")]
    MissingTitle,
    #[error("target amount is required")]
    MissingTarget,
    #[error("target amount must be a positive number, got {0:?}")]
    InvalidTarget(String),
    #[error("deadline is required")]
    MissingDeadline,
    #[error("deadline must be a YYYY-MM-DD date, got {0:?}")]
    InvalidDeadline(String),
    #[error("no goal with id {0}")]
    UnknownGoal(String),
}

/// Raw input of the add-goal form
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GoalForm {
    pub title: String,
    pub target_amount: String,
    pub deadline: String,
    pub category: GoalCategory,
}

impl GoalForm {
    fn validate(&self) -> Result<(String, f64, NaiveDate), GoalValidationError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(GoalValidationError::MissingTitle);
        }

        let target = self.target_amount.trim();
        if target.is_empty() {
            return Err(GoalValidationError::MissingTarget);
        }
        let target_amount = match target.parse::<f64>() {
            Ok(amount) if amount.is_finite() && amount > 0.0 => amount,
            _ => return Err(GoalValidationError::InvalidTarget(target.to_string())),
        };

        let deadline = self.deadline.trim();
        if deadline.is_empty() {
            return Err(GoalValidationError::MissingDeadline);
        }
        let deadline = NaiveDate::parse_from_str(deadline, DEADLINE_FORMAT)
            .map_err(|_| GoalValidationError::InvalidDeadline(deadline.to_string()))?;

        Ok((title.to_string(), target_amount, deadline))
    }
}

/// Derived numbers shown on a goal card
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalMetrics {
    pub remaining: f64,
    pub progress_percent: f64,
    pub months_to_goal: MonthsToGoal,
}

impl GoalMetrics {
    pub fn for_goal(goal: &Goal, balance: f64) -> Self {
        Self {
            remaining: goal.remaining(),
            progress_percent: goal.progress_percent(),
            months_to_goal: goal.months_to_goal(balance),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct GoalTracker {
    goals: Vec<Goal>,
    pending_delete: Option<String>,
    last_id_millis: u64,
}

impl GoalTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tracker preloaded with [`example_goals`]
    pub fn with_examples(language: Language) -> Self {
        Self::with_goals(example_goals(language))
    }

    pub fn with_goals(goals: Vec<Goal>) -> Self {
        let last_id_millis = goals
            .iter()
            .filter_map(|g| Goal::parse_id(&g.id).ok())
            .max()
            .unwrap_or(0);
        Self {
            goals,
            pending_delete: None,
            last_id_millis,
        }
    }

    pub fn goals(&self) -> &[Goal] {
        &self.goals
    }

    pub fn get(&self, id: &str) -> Option<&Goal> {
        self.goals.iter().find(|g| g.id == id)
    }

    pub fn len(&self) -> usize {
        self.goals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.goals.is_empty()
    }

    /// Validate the form and append a new goal with no progress
    pub fn add(&mut self, form: &GoalForm) -> Result<&Goal, GoalValidationError> {
        let now = u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0);
        self.add_at(form, now)
    }

    /// Same as [`GoalTracker::add`] with an explicit clock reading.
    ///
    /// Ids stay unique when several goals are added within one millisecond.
    pub fn add_at(&mut self, form: &GoalForm, now_millis: u64) -> Result<&Goal, GoalValidationError> {
        let (title, target_amount, deadline) = form.validate()?;

        let millis = now_millis.max(self.last_id_millis + 1);
        self.last_id_millis = millis;

        let goal = Goal {
            id: Goal::generate_id(millis),
            title,
            target_amount,
            current_amount: 0.0,
            deadline,
            category: form.category,
        };
        info!(
            "[planning] Added goal {} ({}, target {:.2}, due {})",
            goal.id,
            goal.category.as_str(),
            goal.target_amount,
            goal.deadline
        );

        let index = self.goals.len();
        self.goals.push(goal);
        Ok(&self.goals[index])
    }

    /// Add a signed amount to a goal; the result never drops below 0
    pub fn adjust_progress(&mut self, id: &str, delta: f64) -> Result<&Goal, GoalValidationError> {
        let goal = self
            .goals
            .iter_mut()
            .find(|g| g.id == id)
            .ok_or_else(|| GoalValidationError::UnknownGoal(id.to_string()))?;

        let delta = if delta.is_finite() { delta } else { 0.0 };
        goal.current_amount = (goal.current_amount + delta).max(0.0);
        info!(
            "[planning] Goal {} progress {:+.2} -> {:.2}",
            goal.id, delta, goal.current_amount
        );
        Ok(&*goal)
    }

    /// First step of deletion: remember which goal the user wants gone
    pub fn request_delete(&mut self, id: &str) -> Result<&Goal, GoalValidationError> {
        let goal = self
            .goals
            .iter()
            .find(|g| g.id == id)
            .ok_or_else(|| GoalValidationError::UnknownGoal(id.to_string()))?;
        self.pending_delete = Some(goal.id.clone());
        Ok(goal)
    }

    /// Goal awaiting confirmation, for the confirmation dialog
    pub fn pending_delete(&self) -> Option<&Goal> {
        self.pending_delete.as_deref().and_then(|id| self.get(id))
    }

    /// Remove the goal awaiting confirmation
    pub fn confirm_delete(&mut self) -> Option<Goal> {
        let id = self.pending_delete.take()?;
        let index = self.goals.iter().position(|g| g.id == id)?;
        let removed = self.goals.remove(index);
        info!("[planning] Deleted goal {} ({})", removed.id, removed.title);
        Some(removed)
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    pub fn metrics(&self, id: &str, balance: f64) -> Option<GoalMetrics> {
        self.get(id).map(|goal| GoalMetrics::for_goal(goal, balance))
    }
}
