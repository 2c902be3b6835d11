use std::collections::HashMap;

use crate::flow::ThresholdFlow;
use crate::models::{BoardResponse, Goal, GoalId, GoalStatus, GoalView, StatsResponse};

pub fn completion_percentage(completed_days: u32, target_days: u32) -> u8 {
    if target_days == 0 {
        return 0;
    }
    let perc = (f64::from(completed_days) / f64::from(target_days) * 100.0).round();
    perc.clamp(0.0, 100.0) as u8
}

/// Progress-ring sweep in degrees, 0 to 360.
pub fn ring_angle(percentage: u8) -> f64 {
    f64::from(percentage) * 36.0 / 10.0
}

pub fn streak_message(completed_days: u32) -> String {
    if completed_days > 0 {
        format!("🔥 Into day {} streak!", u64::from(completed_days) + 1)
    } else {
        "Start your streak today!".to_string()
    }
}

pub fn has_reached_target(goal: &Goal) -> bool {
    goal.completed_days >= goal.target_days
}

pub fn goal_status(goal: &Goal) -> GoalStatus {
    if has_reached_target(goal) {
        GoalStatus::Reached
    } else if goal.completed_days == 0 {
        GoalStatus::NotStarted
    } else {
        GoalStatus::InProgress
    }
}

pub fn goal_view(index: usize, goal: &Goal) -> GoalView {
    let percentage = completion_percentage(goal.completed_days, goal.target_days);
    GoalView {
        index,
        id: goal.id,
        name: goal.name.clone(),
        target_days: goal.target_days,
        completed_days: goal.completed_days,
        last_updated: goal.last_updated,
        percentage,
        angle: ring_angle(percentage),
        streak: streak_message(goal.completed_days),
        status: goal_status(goal),
        flow: None,
    }
}

pub fn build_board(
    revision: u64,
    goals: &[Goal],
    flows: &HashMap<GoalId, ThresholdFlow>,
) -> BoardResponse {
    BoardResponse {
        revision,
        goals: goals
            .iter()
            .enumerate()
            .map(|(index, goal)| GoalView {
                flow: flows.get(&goal.id).map(ThresholdFlow::view),
                ..goal_view(index, goal)
            })
            .collect(),
    }
}

pub fn build_summary(goals: &[Goal]) -> StatsResponse {
    let reached_count = goals.iter().filter(|goal| has_reached_target(goal)).count();
    let total_completed_days = goals
        .iter()
        .map(|goal| u64::from(goal.completed_days))
        .fold(0u64, u64::saturating_add);
    let perc_sum: f64 = goals
        .iter()
        .map(|goal| f64::from(completion_percentage(goal.completed_days, goal.target_days)))
        .sum();
    let denom = if goals.is_empty() { 1.0 } else { goals.len() as f64 };

    StatsResponse {
        goal_count: goals.len(),
        reached_count,
        total_completed_days,
        average_percentage: perc_sum / denom,
    }
}
