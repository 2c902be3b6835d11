//! Extend-or-stop sequence opened when a goal's completed days reach its target.
//!
//!   Evaluating -> AwaitingExtendDecision -> AwaitingExtendAmount -> Resolved
//!                                        \-> Resolved (stopped)
//!
//! Each step is driven by an explicit answer from the user; nothing here
//! waits on a timer.

use std::fmt;

use crate::errors::GoalError;
use crate::models::{parse_day_count, FlowView, Goal, GoalId};
use crate::progress::has_reached_target;

/// Lets the incremented state render before the congratulation shows.
pub const FLOW_DELAY_MS: u64 = 200;

pub const DEFAULT_EXTENSION: &str = "7";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowOutcome {
    Extended { added: u32 },
    NotExtended,
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowState {
    Evaluating,
    AwaitingExtendDecision,
    AwaitingExtendAmount,
    Resolved(FlowOutcome),
}

impl fmt::Display for FlowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlowState::Evaluating => write!(f, "evaluating"),
            FlowState::AwaitingExtendDecision => write!(f, "awaiting_extend_decision"),
            FlowState::AwaitingExtendAmount => write!(f, "awaiting_extend_amount"),
            FlowState::Resolved(_) => write!(f, "resolved"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ThresholdFlow {
    goal_id: GoalId,
    goal_name: String,
    target_days: u32,
    state: FlowState,
}

impl ThresholdFlow {
    /// Opens a flow awaiting the keep-going decision if `goal` has reached
    /// its target, `None` otherwise.
    pub fn evaluate(goal: &Goal) -> Option<Self> {
        let mut flow = Self {
            goal_id: goal.id,
            goal_name: goal.name.clone(),
            target_days: goal.target_days,
            state: FlowState::Evaluating,
        };
        if !has_reached_target(goal) {
            return None;
        }
        flow.state = FlowState::AwaitingExtendDecision;
        Some(flow)
    }

    pub fn goal_id(&self) -> GoalId {
        self.goal_id
    }

    pub fn state(&self) -> FlowState {
        self.state
    }

    pub fn outcome(&self) -> Option<FlowOutcome> {
        match self.state {
            FlowState::Resolved(outcome) => Some(outcome),
            _ => None,
        }
    }

    /// Question to put to the user in the current state.
    pub fn prompt(&self) -> String {
        match self.state {
            FlowState::AwaitingExtendDecision => format!(
                "🎉 Congrats for completing \"{}\"!\n\nYou finished {} day(s).\n\nWould you like to keep it on for some more days?",
                self.goal_name, self.target_days
            ),
            FlowState::AwaitingExtendAmount => {
                "How many more days would you like to add?".to_string()
            }
            FlowState::Evaluating | FlowState::Resolved(_) => String::new(),
        }
    }

    pub fn view(&self) -> FlowView {
        let default_amount = match self.state {
            FlowState::AwaitingExtendAmount => Some(DEFAULT_EXTENSION.to_string()),
            _ => None,
        };
        FlowView {
            goal_id: self.goal_id,
            state: self.state.to_string(),
            prompt: self.prompt(),
            default_amount,
            delay_ms: FLOW_DELAY_MS,
        }
    }

    pub fn decide(&mut self, keep_going: bool) -> Result<FlowState, GoalError> {
        let next = if keep_going {
            FlowState::AwaitingExtendAmount
        } else {
            FlowState::Resolved(FlowOutcome::Stopped)
        };
        self.advance(FlowState::AwaitingExtendDecision, next)
    }

    /// Takes the raw prompt answer; a missing or non-positive amount resolves
    /// without extending.
    pub fn supply_amount(&mut self, raw: Option<&str>) -> Result<FlowOutcome, GoalError> {
        let outcome = match raw.and_then(parse_day_count) {
            Some(added) => FlowOutcome::Extended { added },
            None => FlowOutcome::NotExtended,
        };
        self.advance(FlowState::AwaitingExtendAmount, FlowState::Resolved(outcome))?;
        Ok(outcome)
    }

    fn advance(&mut self, expected: FlowState, next: FlowState) -> Result<FlowState, GoalError> {
        if self.state != expected {
            return Err(GoalError::InvalidTransition {
                goal_id: self.goal_id,
                from: self.state.to_string(),
                to: next.to_string(),
            });
        }
        self.state = next;
        Ok(next)
    }
}
