use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/goals", post(handlers::create_goal_form))
        .route("/goals/:index/complete", post(handlers::complete_at))
        .route("/goals/:index/decision", post(handlers::decide_at))
        .route("/goals/:index/extend", post(handlers::extend_at))
        .route("/goals/:index/remove", post(handlers::remove_at))
        .route("/api/goals", get(handlers::list_goals).post(handlers::create_goal))
        .route("/api/goals/:id/complete", post(handlers::complete_goal))
        .route("/api/goals/:id/decision", post(handlers::decide))
        .route("/api/goals/:id/extend", post(handlers::extend))
        .route("/api/goals/:id/remove", post(handlers::remove_goal))
        .route("/api/stats", get(handlers::get_stats))
        .with_state(state)
}
