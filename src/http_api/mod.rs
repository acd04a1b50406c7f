use std::net::SocketAddr;

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{
    Day, EventId, FixedEvent, NewFixedEvent, NewTask, PlannerError, RegenerateSummary, Slot,
    SlotUpdate, Task, TaskId, TaskState, WeeklyPlanner, grid,
};

/// Header carrying the authenticated user's id. Session handling lives upstream.
pub const USER_HEADER: &str = "x-user-id";

#[derive(Clone)]
pub struct AppState {
    planner: WeeklyPlanner,
}

impl AppState {
    pub fn new(planner: WeeklyPlanner) -> Self {
        Self { planner }
    }

    fn planner(&self) -> &WeeklyPlanner {
        &self.planner
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
}

#[derive(Debug)]
enum ApiError {
    Unauthorized,
    NotFound(String),
    Invalid(String),
    Internal(String),
}

impl ApiError {
    fn invalid(message: impl Into<String>) -> Self {
        ApiError::Invalid(message.into())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Invalid(rejection.body_text())
    }
}

impl From<PlannerError> for ApiError {
    fn from(value: PlannerError) -> Self {
        match value {
            PlannerError::Validation(err) => ApiError::Invalid(err.to_string()),
            err @ PlannerError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            PlannerError::Persistence(err) => {
                tracing::error!(error = %err, "scheduler store failure");
                ApiError::Internal(err.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                format!("missing {USER_HEADER} header"),
            ),
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, "not_found", message),
            ApiError::Invalid(message) => (StatusCode::BAD_REQUEST, "invalid_request", message),
            ApiError::Internal(message) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", message)
            }
        };
        (status, Json(ErrorBody { error, message })).into_response()
    }
}

fn user_id(headers: &HeaderMap) -> Result<String, ApiError> {
    headers
        .get(USER_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(ToOwned::to_owned)
        .ok_or(ApiError::Unauthorized)
}

/// Task as the grid view consumes it: slot flattened, nulls when unscheduled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskView {
    pub id: TaskId,
    pub name: String,
    pub duration_hours: u8,
    pub scheduled_day: Option<Day>,
    pub scheduled_start_time: Option<String>,
    pub state: TaskState,
}

impl From<Task> for TaskView {
    fn from(task: Task) -> Self {
        Self {
            id: task.id,
            scheduled_day: task.scheduled_day(),
            scheduled_start_time: task.scheduled_start_time(),
            state: task.state(),
            duration_hours: task.duration_hours,
            name: task.name,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulerView {
    pub fixed_events: Vec<FixedEvent>,
    pub tasks: Vec<TaskView>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GenerateView {
    pub tasks: Vec<TaskView>,
    pub summary: RegenerateSummary,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateTaskPayload {
    name: String,
    duration_hours: u32,
    #[serde(default)]
    scheduled_day: Option<Day>,
    #[serde(default)]
    scheduled_start_time: Option<String>,
    /// Let the engine pick the earliest free slot before storing.
    #[serde(default)]
    auto_place: bool,
}

impl CreateTaskPayload {
    fn requested_slot(&self) -> Result<Option<Slot>, ApiError> {
        match (self.scheduled_day, self.scheduled_start_time.as_deref()) {
            (Some(day), Some(start)) => {
                let hour = grid::parse_hour(start).map_err(|err| ApiError::invalid(err.to_string()))?;
                Ok(Some(Slot::new(day, hour)))
            }
            (None, None) => Ok(None),
            _ => Err(ApiError::invalid(
                "scheduledDay and scheduledStartTime must be given together",
            )),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EverydayTaskPayload {
    name: String,
    duration_hours: u32,
}

#[derive(Debug, Deserialize)]
struct BatchPayload {
    updates: Vec<SlotUpdate>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/scheduler", get(list_scheduler).delete(reset_scheduler))
        .route("/scheduler/fixed", post(create_fixed_event))
        .route("/scheduler/fixed/:id", delete(delete_fixed_event))
        .route("/scheduler/tasks", post(create_task))
        .route("/scheduler/tasks/everyday", post(create_everyday_task))
        .route("/scheduler/tasks/batch", put(batch_reassign))
        .route("/scheduler/tasks/:id", delete(delete_task))
        .route("/scheduler/generate", post(generate_schedule))
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, planner: WeeklyPlanner) -> std::io::Result<()> {
    let app = router(AppState::new(planner));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "study planner HTTP API listening");
    axum::serve(listener, app).await
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn list_scheduler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<SchedulerView>, ApiError> {
    let user = user_id(&headers)?;
    let snapshot = state.planner().snapshot(&user)?;
    Ok(Json(SchedulerView {
        fixed_events: snapshot.fixed_events,
        tasks: snapshot.tasks.into_iter().map(TaskView::from).collect(),
    }))
}

async fn reset_scheduler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    let user = user_id(&headers)?;
    state.planner().reset(&user)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn create_fixed_event(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<NewFixedEvent>, JsonRejection>,
) -> Result<(StatusCode, Json<FixedEvent>), ApiError> {
    let user = user_id(&headers)?;
    let Json(payload) = payload?;
    let created = state.planner().add_fixed_event(&user, payload)?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn delete_fixed_event(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<EventId>,
) -> Result<StatusCode, ApiError> {
    let user = user_id(&headers)?;
    state.planner().remove_fixed_event(&user, id)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn create_task(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<CreateTaskPayload>, JsonRejection>,
) -> Result<(StatusCode, Json<TaskView>), ApiError> {
    let user = user_id(&headers)?;
    let Json(payload) = payload?;
    let created = if payload.auto_place {
        state
            .planner()
            .add_task(&user, &payload.name, payload.duration_hours)?
    } else {
        let slot = payload.requested_slot()?;
        let task = NewTask::new(payload.name, payload.duration_hours).with_slot(slot);
        state.planner().add_prepared_task(&user, task)?
    };
    Ok((StatusCode::CREATED, Json(created.into())))
}

async fn create_everyday_task(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<EverydayTaskPayload>, JsonRejection>,
) -> Result<(StatusCode, Json<Vec<TaskView>>), ApiError> {
    let user = user_id(&headers)?;
    let Json(payload) = payload?;
    let created = state
        .planner()
        .add_everyday_task(&user, &payload.name, payload.duration_hours)?;
    let views = created.into_iter().map(TaskView::from).collect();
    Ok((StatusCode::CREATED, Json(views)))
}

async fn delete_task(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<TaskId>,
) -> Result<StatusCode, ApiError> {
    let user = user_id(&headers)?;
    state.planner().remove_task(&user, id)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn batch_reassign(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<BatchPayload>, JsonRejection>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let user = user_id(&headers)?;
    let Json(payload) = payload?;
    state.planner().reassign(&user, &payload.updates)?;
    Ok(Json(json!({ "success": true, "updated": payload.updates.len() })))
}

async fn generate_schedule(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<GenerateView>, ApiError> {
    let user = user_id(&headers)?;
    let (tasks, summary) = state.planner().generate(&user)?;
    Ok(Json(GenerateView {
        tasks: tasks.into_iter().map(TaskView::from).collect(),
        summary,
    }))
}
