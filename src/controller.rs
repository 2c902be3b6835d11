use std::collections::HashMap;

use chrono::{Local, NaiveDate};
use tracing::{debug, info};

use crate::errors::GoalError;
use crate::flow::{FlowOutcome, FlowState, ThresholdFlow};
use crate::models::{parse_day_count, BoardResponse, FlowView, Goal, GoalId, StatsResponse};
use crate::progress::{build_board, build_summary};
use crate::quotes::Motivation;
use crate::storage::GoalStore;

pub const VALIDATION_NOTICE: &str = "Please enter a habit name and a positive number of days.";
pub const STOPPED_MESSAGE: &str = "Amazing work — feel proud! 🎉";
pub const NOT_EXTENDED_MESSAGE: &str = "No extra days added.";

/// Result of marking a goal done for the day.
#[derive(Debug, Clone)]
pub struct Completion {
    pub goal_id: GoalId,
    pub completed_days: u32,
    pub motivation: &'static str,
    /// Set when the target was reached; the increment is written when the
    /// flow resolves.
    pub flow: Option<FlowView>,
}

/// One answered step of a threshold flow. `message` is set once resolved.
#[derive(Debug, Clone)]
pub struct FlowStep {
    pub prompt: Option<FlowView>,
    pub message: Option<String>,
}

/// Validated mutations over the goals held by a [`GoalStore`].
pub struct GoalController {
    store: GoalStore,
    flows: HashMap<GoalId, ThresholdFlow>,
    motivation: Motivation,
}

impl GoalController {
    pub fn new(store: GoalStore, motivation: Motivation) -> Self {
        Self {
            store,
            flows: HashMap::new(),
            motivation,
        }
    }

    pub fn store(&self) -> &GoalStore {
        &self.store
    }

    pub fn board(&self) -> BoardResponse {
        build_board(self.store.revision(), self.store.all(), &self.flows)
    }

    pub fn summary(&self) -> StatsResponse {
        build_summary(self.store.all())
    }

    pub fn pending_flow(&self, id: GoalId) -> Option<&ThresholdFlow> {
        self.flows.get(&id)
    }

    pub async fn create(&mut self, name: &str, target_days: &str) -> Result<GoalId, GoalError> {
        let name = name.trim();
        let target_days = match parse_day_count(target_days) {
            Some(days) if !name.is_empty() => days,
            _ => return Err(GoalError::Validation(VALIDATION_NOTICE.to_string())),
        };

        let goal = Goal::new(name, target_days);
        let id = goal.id;
        self.store.push(goal);
        self.store.persist().await?;

        info!(%id, goal_name = name, target_days, "goal created");
        Ok(id)
    }

    pub async fn complete(&mut self, id: GoalId) -> Result<Option<Completion>, GoalError> {
        self.complete_on(id, Local::now().date_naive()).await
    }

    /// Marks `id` done on `today`. Unknown ids are ignored. Repeat completions
    /// on the same day all count.
    pub async fn complete_on(
        &mut self,
        id: GoalId,
        today: NaiveDate,
    ) -> Result<Option<Completion>, GoalError> {
        let Some(goal) = self.store.get_mut(id) else {
            debug!(%id, "complete ignored for unknown goal");
            return Ok(None);
        };

        goal.completed_days = goal.completed_days.saturating_add(1);
        goal.last_updated = Some(today);
        let completed_days = goal.completed_days;
        let flow = ThresholdFlow::evaluate(goal);

        let motivation = self.motivation.pick();
        let flow = match flow {
            Some(flow) => {
                info!(%id, completed_days, "goal reached its target");
                let view = flow.view();
                self.flows.insert(id, flow);
                Some(view)
            }
            None => {
                self.store.persist().await?;
                None
            }
        };

        Ok(Some(Completion {
            goal_id: id,
            completed_days,
            motivation,
            flow,
        }))
    }

    /// Answers the keep-going question of an open threshold flow.
    pub async fn decide(&mut self, id: GoalId, keep_going: bool) -> Result<FlowStep, GoalError> {
        let flow = self.flows.get_mut(&id).ok_or(GoalError::NoPendingFlow(id))?;
        match flow.decide(keep_going)? {
            FlowState::Resolved(outcome) => self.resolve(id, outcome).await,
            _ => Ok(FlowStep {
                prompt: Some(flow.view()),
                message: None,
            }),
        }
    }

    /// Answers the how-many-more-days prompt; `raw` is the text typed, if any.
    pub async fn extend(&mut self, id: GoalId, raw: Option<&str>) -> Result<FlowStep, GoalError> {
        let flow = self.flows.get_mut(&id).ok_or(GoalError::NoPendingFlow(id))?;
        let outcome = flow.supply_amount(raw)?;
        self.resolve(id, outcome).await
    }

    async fn resolve(&mut self, id: GoalId, outcome: FlowOutcome) -> Result<FlowStep, GoalError> {
        self.flows.remove(&id);

        let message = match (outcome, self.store.get_mut(id)) {
            (FlowOutcome::Extended { added }, Some(goal)) => {
                goal.target_days = goal.target_days.saturating_add(added);
                info!(%id, added, target_days = goal.target_days, "goal extended");
                format!(
                    "Added {added} more day(s). New target: {} days.",
                    goal.target_days
                )
            }
            (FlowOutcome::Stopped, _) => STOPPED_MESSAGE.to_string(),
            _ => NOT_EXTENDED_MESSAGE.to_string(),
        };

        self.store.persist().await?;
        Ok(FlowStep {
            prompt: None,
            message: Some(message),
        })
    }

    /// Removes `id` if `confirmed`. Returns whether anything was removed.
    pub async fn remove(&mut self, id: GoalId, confirmed: bool) -> Result<bool, GoalError> {
        if self.store.get(id).is_none() {
            debug!(%id, "remove ignored for unknown goal");
            return Ok(false);
        }
        if !confirmed {
            return Ok(false);
        }

        self.store.remove(id);
        self.flows.remove(&id);
        self.store.persist().await?;

        info!(%id, "goal removed");
        Ok(true)
    }
}
