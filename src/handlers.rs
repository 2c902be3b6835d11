use crate::controller::{Completion, FlowStep, GoalController};
use crate::errors::AppError;
use crate::models::{
    ActionResponse, BoardResponse, CreateGoalRequest, DecisionRequest, DelayedMessage,
    ExtendRequest, GoalId, RemoveRequest, StatsResponse,
};
use crate::quotes::MOTIVATION_DELAY_MS;
use crate::state::AppState;
use crate::ui::render_index;
use axum::{
    extract::{Path, State},
    response::{Html, Redirect},
    Form, Json,
};

pub async fn index(State(state): State<AppState>) -> Html<String> {
    let controller = state.controller.lock().await;
    Html(render_index(&controller.board()))
}

pub async fn list_goals(State(state): State<AppState>) -> Json<BoardResponse> {
    let controller = state.controller.lock().await;
    Json(controller.board())
}

pub async fn get_stats(State(state): State<AppState>) -> Json<StatsResponse> {
    let controller = state.controller.lock().await;
    Json(controller.summary())
}

pub async fn create_goal(
    State(state): State<AppState>,
    Json(payload): Json<CreateGoalRequest>,
) -> Result<Json<ActionResponse>, AppError> {
    let mut controller = state.controller.lock().await;
    apply_create(&mut controller, payload).await?;

    Ok(Json(ActionResponse {
        clear_inputs: true,
        ..respond(&controller)
    }))
}

pub async fn complete_goal(
    State(state): State<AppState>,
    Path(id): Path<GoalId>,
) -> Result<Json<ActionResponse>, AppError> {
    let mut controller = state.controller.lock().await;
    let completion = controller.complete(id).await?;

    let mut response = respond(&controller);
    if let Some(Completion {
        motivation, flow, ..
    }) = completion
    {
        response.motivation = Some(DelayedMessage {
            text: motivation.to_string(),
            delay_ms: MOTIVATION_DELAY_MS,
        });
        response.flow = flow;
    }
    Ok(Json(response))
}

pub async fn decide(
    State(state): State<AppState>,
    Path(id): Path<GoalId>,
    Json(payload): Json<DecisionRequest>,
) -> Result<Json<ActionResponse>, AppError> {
    let mut controller = state.controller.lock().await;
    let step = controller.decide(id, payload.keep_going).await?;
    Ok(Json(with_step(&controller, step)))
}

pub async fn extend(
    State(state): State<AppState>,
    Path(id): Path<GoalId>,
    Json(payload): Json<ExtendRequest>,
) -> Result<Json<ActionResponse>, AppError> {
    let raw = payload.days.map(|days| days.as_text());
    let mut controller = state.controller.lock().await;
    let step = controller.extend(id, raw.as_deref()).await?;
    Ok(Json(with_step(&controller, step)))
}

pub async fn remove_goal(
    State(state): State<AppState>,
    Path(id): Path<GoalId>,
    Json(payload): Json<RemoveRequest>,
) -> Result<Json<ActionResponse>, AppError> {
    let mut controller = state.controller.lock().await;
    controller.remove(id, payload.confirmed).await?;
    Ok(Json(respond(&controller)))
}

fn respond(controller: &GoalController) -> ActionResponse {
    ActionResponse {
        board: controller.board(),
        clear_inputs: false,
        motivation: None,
        flow: None,
        message: None,
    }
}

fn with_step(controller: &GoalController, step: FlowStep) -> ActionResponse {
    ActionResponse {
        flow: step.prompt,
        message: step.message,
        ..respond(controller)
    }
}

async fn apply_create(
    controller: &mut GoalController,
    payload: CreateGoalRequest,
) -> Result<(), AppError> {
    let target_days = payload
        .target_days
        .map(|days| days.as_text())
        .unwrap_or_default();
    controller.create(&payload.name, &target_days).await?;
    Ok(())
}

// Form actions for the page without script. Cards are addressed by their
// rendered position; the position is mapped to a goal id here and a stale
// position is ignored.

pub async fn create_goal_form(
    State(state): State<AppState>,
    Form(payload): Form<CreateGoalRequest>,
) -> Result<Redirect, AppError> {
    let mut controller = state.controller.lock().await;
    apply_create(&mut controller, payload).await?;
    Ok(Redirect::to("/"))
}

pub async fn complete_at(
    State(state): State<AppState>,
    Path(index): Path<usize>,
) -> Result<Redirect, AppError> {
    let mut controller = state.controller.lock().await;
    if let Some(id) = controller.store().id_at(index) {
        controller.complete(id).await?;
    }
    Ok(Redirect::to("/"))
}

pub async fn decide_at(
    State(state): State<AppState>,
    Path(index): Path<usize>,
    Form(payload): Form<DecisionRequest>,
) -> Result<Redirect, AppError> {
    let mut controller = state.controller.lock().await;
    if let Some(id) = controller.store().id_at(index) {
        controller.decide(id, payload.keep_going).await?;
    }
    Ok(Redirect::to("/"))
}

pub async fn extend_at(
    State(state): State<AppState>,
    Path(index): Path<usize>,
    Form(payload): Form<ExtendRequest>,
) -> Result<Redirect, AppError> {
    let raw = payload.days.map(|days| days.as_text());
    let mut controller = state.controller.lock().await;
    if let Some(id) = controller.store().id_at(index) {
        controller.extend(id, raw.as_deref()).await?;
    }
    Ok(Redirect::to("/"))
}

pub async fn remove_at(
    State(state): State<AppState>,
    Path(index): Path<usize>,
    Form(payload): Form<RemoveRequest>,
) -> Result<Redirect, AppError> {
    let mut controller = state.controller.lock().await;
    if let Some(id) = controller.store().id_at(index) {
        controller.remove(id, payload.confirmed).await?;
    }
    Ok(Redirect::to("/"))
}
