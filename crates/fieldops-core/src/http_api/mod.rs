pub mod rate_limit;

use std::{net::SocketAddr, sync::Arc, time::Instant};

use axum::{
    Json, Router,
    extract::{Path, Request, State},
    http::{HeaderMap, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::NaiveDateTime;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};

use crate::availability::{AvailabilityResolver, AvailabilityResult};
use crate::calculations::{CriticalPathResult, compute_critical_path};
use crate::conflicts::{ConflictChecker, ConflictResult};
use crate::dispatch::{DispatchBoard, DispatchCandidate};
use crate::error::{ScheduleError, ValidationError};
use crate::gantt::{GanttLayout, chart_bounds, project_layout};
use crate::model::{Appointment, WorkerProfile};
use crate::persistence::FieldOpsSnapshot;
use crate::records::AppointmentRecord;

pub use rate_limit::RateLimiter;

#[derive(Clone)]
pub struct AppState {
    snapshot: Arc<RwLock<FieldOpsSnapshot>>,
    resolver: Arc<AvailabilityResolver>,
    limiter: Arc<RateLimiter>,
}

impl AppState {
    pub fn new(
        snapshot: FieldOpsSnapshot,
        resolver: AvailabilityResolver,
        limiter: RateLimiter,
    ) -> Self {
        Self {
            snapshot: Arc::new(RwLock::new(snapshot)),
            resolver: Arc::new(resolver),
            limiter: Arc::new(limiter),
        }
    }

    pub fn with_shared(
        snapshot: Arc<RwLock<FieldOpsSnapshot>>,
        resolver: Arc<AvailabilityResolver>,
        limiter: Arc<RateLimiter>,
    ) -> Self {
        Self {
            snapshot,
            resolver,
            limiter,
        }
    }

    pub fn limiter(&self) -> Arc<RateLimiter> {
        self.limiter.clone()
    }

    fn snapshot(&self) -> Arc<RwLock<FieldOpsSnapshot>> {
        self.snapshot.clone()
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
}

#[derive(Debug)]
enum ApiError {
    NotFound(String),
    Invalid(String),
    Unprocessable(String),
    RateLimited,
}

impl ApiError {
    fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }
}

impl From<ValidationError> for ApiError {
    fn from(value: ValidationError) -> Self {
        ApiError::Invalid(value.to_string())
    }
}

impl From<ScheduleError> for ApiError {
    fn from(value: ScheduleError) -> Self {
        ApiError::Unprocessable(value.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, "not_found", message),
            ApiError::Invalid(message) => (StatusCode::BAD_REQUEST, "invalid_request", message),
            ApiError::Unprocessable(message) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "schedule_error", message)
            }
            ApiError::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                "rate_limited",
                "too many requests, retry later".to_string(),
            ),
        };
        (status, Json(ErrorBody { error, message })).into_response()
    }
}

#[derive(Debug, Deserialize)]
struct AvailabilityRequest {
    worker_id: String,
    start: NaiveDateTime,
    end: NaiveDateTime,
}

#[derive(Debug, Deserialize)]
struct ConflictRequest {
    worker_id: String,
    start: NaiveDateTime,
    end: NaiveDateTime,
    #[serde(default)]
    exclude_appointment_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DispatchRequest {
    start: NaiveDateTime,
    end: NaiveDateTime,
    #[serde(default)]
    exclude_appointment_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct GanttRequest {
    #[serde(default)]
    chart_start: Option<chrono::NaiveDate>,
    #[serde(default)]
    chart_end: Option<chrono::NaiveDate>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/workers", get(list_workers))
        .route("/appointments", get(list_appointments).post(upsert_appointments))
        .route("/availability", post(check_availability))
        .route("/conflicts", post(check_conflicts))
        .route("/dispatch", post(dispatch))
        .route("/projects/:id/critical-path", post(critical_path))
        .route("/projects/:id/gantt", post(gantt))
        .route_layer(middleware::from_fn_with_state(state.clone(), rate_limit))
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, state: AppState) -> std::io::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "fieldops HTTP API listening");
    axum::serve(listener, app).await
}

fn client_key(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| "local".to_string())
}

async fn rate_limit(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let key = client_key(request.headers());
    if !state.limiter.check(&key, Instant::now()) {
        warn!(client = %key, "rate limit exceeded");
        return ApiError::RateLimited.into_response();
    }
    next.run(request).await
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn list_workers(State(state): State<AppState>) -> Json<Vec<WorkerProfile>> {
    let snapshot = state.snapshot();
    let workers = snapshot.read().workers.clone();
    Json(workers)
}

async fn list_appointments(State(state): State<AppState>) -> Json<Vec<Appointment>> {
    let snapshot = state.snapshot();
    let appointments = snapshot.read().appointments.clone();
    Json(appointments)
}

async fn upsert_appointments(
    State(state): State<AppState>,
    Json(records): Json<Vec<AppointmentRecord>>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    let appointments = records
        .iter()
        .map(Appointment::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    let snapshot = state.snapshot();
    let stored = snapshot.write().merge_appointments(appointments);
    Ok((StatusCode::CREATED, Json(json!({ "stored": stored }))))
}

async fn check_availability(
    State(state): State<AppState>,
    Json(payload): Json<AvailabilityRequest>,
) -> Result<Json<AvailabilityResult>, ApiError> {
    if payload.worker_id.trim().is_empty() {
        return Err(ValidationError::MissingWorkerId.into());
    }
    let snapshot = state.snapshot();
    let worker = {
        let guard = snapshot.read();
        guard.find_worker(&payload.worker_id).cloned()
    };
    let worker = worker
        .ok_or_else(|| ApiError::not_found(format!("worker {} not found", payload.worker_id)))?;
    let result = state.resolver.check(&worker, payload.start, payload.end)?;
    Ok(Json(result))
}

async fn check_conflicts(
    State(state): State<AppState>,
    Json(payload): Json<ConflictRequest>,
) -> Result<Json<ConflictResult>, ApiError> {
    let snapshot = state.snapshot();
    let guard = snapshot.read();
    let result = ConflictChecker::new(&guard.appointments).check(
        &payload.worker_id,
        payload.start,
        payload.end,
        payload.exclude_appointment_id.as_deref(),
    )?;
    Ok(Json(result))
}

async fn dispatch(
    State(state): State<AppState>,
    Json(payload): Json<DispatchRequest>,
) -> Result<Json<Vec<DispatchCandidate>>, ApiError> {
    let snapshot = state.snapshot();
    let guard = snapshot.read();
    let candidates = DispatchBoard::new(&state.resolver, &guard.appointments).candidates(
        &guard.workers,
        payload.start,
        payload.end,
        payload.exclude_appointment_id.as_deref(),
    )?;
    Ok(Json(candidates))
}

async fn critical_path(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
) -> Result<Json<CriticalPathResult>, ApiError> {
    let snapshot = state.snapshot();
    let project = {
        let guard = snapshot.read();
        guard.find_project(&project_id).cloned()
    };
    let project =
        project.ok_or_else(|| ApiError::not_found(format!("project {project_id} not found")))?;
    let result = compute_critical_path(&project.tasks, &project.dependencies)?;
    Ok(Json(result))
}

async fn gantt(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
    payload: Option<Json<GanttRequest>>,
) -> Result<Json<GanttLayout>, ApiError> {
    let request = payload.map(|Json(r)| r).unwrap_or_default();
    let snapshot = state.snapshot();
    let project = {
        let guard = snapshot.read();
        guard.find_project(&project_id).cloned()
    };
    let project =
        project.ok_or_else(|| ApiError::not_found(format!("project {project_id} not found")))?;

    let bounds = chart_bounds(&project.tasks);
    let (Some(chart_start), Some(chart_end)) = (
        request.chart_start.or(bounds.map(|(s, _)| s)),
        request.chart_end.or(bounds.map(|(_, e)| e)),
    ) else {
        return Err(ApiError::Invalid(format!(
            "project {project_id} has no tasks; chart_start and chart_end are required"
        )));
    };

    let cpm = compute_critical_path(&project.tasks, &project.dependencies)?;
    let layout = project_layout(chart_start, chart_end, &project.tasks, Some(&cpm))?;
    Ok(Json(layout))
}
