use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use serde_json::json;

use super::assignment::AssignmentError;
use super::availability::{AvailabilityError, DayInput};
use super::domain::{
    Actor, Assignee, LocationId, PeriodDraft, PeriodId, PeriodStatus, StaffingSettings,
    SubmissionId, UserId,
};
use super::periods::PeriodError;
use super::service::{SchedulingApp, SettingsError};

/// Router exposing the scheduling engine's thin adapters.
pub fn scheduling_router(app: Arc<SchedulingApp>) -> Router {
    Router::new()
        .route("/api/v1/periods", post(create_period).get(list_periods))
        .route("/api/v1/periods/:period_id/status", post(transition_period))
        .route("/api/v1/periods/:period_id/form/:user_id", get(day_defaults))
        .route("/api/v1/periods/:period_id/submissions", post(submit_availability))
        .route("/api/v1/periods/:period_id/review", get(review_submissions))
        .route("/api/v1/periods/:period_id/approve", post(approve_submissions))
        .route("/api/v1/periods/:period_id/reject", post(reject_submission))
        .route("/api/v1/periods/:period_id/dashboard", get(dashboard))
        .route("/api/v1/periods/:period_id/remind", post(manual_reminder))
        .route("/api/v1/periods/:period_id/export", get(export_csv))
        .route("/api/v1/assignments/candidates", get(list_candidates))
        .route("/api/v1/assignments", put(assign).delete(unassign).get(list_assignments))
        .route("/api/v1/settings", get(get_settings).put(update_settings))
        .with_state(app)
}

fn period_error_response(err: PeriodError) -> Response {
    let status = match &err {
        PeriodError::NotFound => StatusCode::NOT_FOUND,
        PeriodError::AccessDenied => StatusCode::FORBIDDEN,
        PeriodError::InvalidWindow(_) => StatusCode::UNPROCESSABLE_ENTITY,
        PeriodError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(json!({ "error": err.to_string() }))).into_response()
}

fn availability_error_response(err: AvailabilityError) -> Response {
    match err {
        AvailabilityError::Rejected { violations } => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "error": "submission rejected", "violations": violations })),
        )
            .into_response(),
        AvailabilityError::PeriodClosed => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "error": err.to_string() })),
        )
            .into_response(),
        AvailabilityError::AccessDenied => (
            StatusCode::FORBIDDEN,
            Json(json!({ "error": err.to_string() })),
        )
            .into_response(),
        AvailabilityError::ProfileNotFound | AvailabilityError::SubmissionNotFound => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": err.to_string() })),
        )
            .into_response(),
        AvailabilityError::Period(inner) => period_error_response(inner),
        AvailabilityError::Repository(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": err.to_string() })),
        )
            .into_response(),
    }
}

fn assignment_error_response(err: AssignmentError) -> Response {
    let status = match &err {
        AssignmentError::AccessDenied => StatusCode::FORBIDDEN,
        AssignmentError::LocationNotFound | AssignmentError::AssigneeNotFound => {
            StatusCode::NOT_FOUND
        }
        AssignmentError::DriverRequired { .. } => StatusCode::CONFLICT,
        AssignmentError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(json!({ "error": err.to_string() }))).into_response()
}

#[derive(Debug, Deserialize)]
struct CreatePeriodRequest {
    actor: Actor,
    #[serde(flatten)]
    draft: PeriodDraft,
}

async fn create_period(
    State(app): State<Arc<SchedulingApp>>,
    Json(payload): Json<CreatePeriodRequest>,
) -> Response {
    match app.create_period(payload.actor, payload.draft) {
        Ok((period, notification)) => (
            StatusCode::CREATED,
            Json(json!({ "period": period, "notification": notification })),
        )
            .into_response(),
        Err(err) => period_error_response(err),
    }
}

async fn list_periods(State(app): State<Arc<SchedulingApp>>) -> Response {
    match app.periods.list_all(Utc::now()) {
        Ok(periods) => (StatusCode::OK, Json(periods)).into_response(),
        Err(err) => period_error_response(err),
    }
}

#[derive(Debug, Deserialize)]
struct TransitionRequest {
    actor: Actor,
    status: PeriodStatus,
}

async fn transition_period(
    State(app): State<Arc<SchedulingApp>>,
    Path(period_id): Path<u64>,
    Json(payload): Json<TransitionRequest>,
) -> Response {
    match app
        .periods
        .transition(payload.actor, PeriodId(period_id), payload.status)
    {
        Ok(period) => (StatusCode::OK, Json(period)).into_response(),
        Err(err) => period_error_response(err),
    }
}

async fn day_defaults(
    State(app): State<Arc<SchedulingApp>>,
    Path((period_id, user_id)): Path<(u64, u64)>,
) -> Response {
    let period = match app.periods.get(PeriodId(period_id)) {
        Ok(period) => period,
        Err(err) => return period_error_response(err),
    };
    match app.availability.build_day_defaults(UserId(user_id), &period) {
        Ok(days) => (
            StatusCode::OK,
            Json(json!({ "period": period, "days": days })),
        )
            .into_response(),
        Err(err) => availability_error_response(err),
    }
}

#[derive(Debug, Deserialize)]
struct SubmitRequest {
    actor: Actor,
    user: UserId,
    days: Vec<DayInput>,
    #[serde(default)]
    remarks: String,
}

async fn submit_availability(
    State(app): State<Arc<SchedulingApp>>,
    Path(period_id): Path<u64>,
    Json(payload): Json<SubmitRequest>,
) -> Response {
    match app.availability.validate_and_save(
        payload.actor,
        payload.user,
        PeriodId(period_id),
        payload.days,
        payload.remarks,
        Utc::now(),
    ) {
        Ok(submission) => (StatusCode::OK, Json(submission)).into_response(),
        Err(err) => availability_error_response(err),
    }
}

async fn review_submissions(
    State(app): State<Arc<SchedulingApp>>,
    Path(period_id): Path<u64>,
) -> Response {
    match app.availability.review_summaries(PeriodId(period_id)) {
        Ok(summaries) => (StatusCode::OK, Json(summaries)).into_response(),
        Err(err) => availability_error_response(err),
    }
}

#[derive(Debug, Deserialize)]
struct ApproveRequest {
    actor: Actor,
    submission_ids: Vec<SubmissionId>,
}

async fn approve_submissions(
    State(app): State<Arc<SchedulingApp>>,
    Path(period_id): Path<u64>,
    Json(payload): Json<ApproveRequest>,
) -> Response {
    match app
        .availability
        .approve(payload.actor, PeriodId(period_id), &payload.submission_ids)
    {
        Ok(approved) => (StatusCode::OK, Json(json!({ "approved": approved }))).into_response(),
        Err(err) => availability_error_response(err),
    }
}

#[derive(Debug, Deserialize)]
struct RejectRequest {
    actor: Actor,
    submission_id: SubmissionId,
    #[serde(default)]
    admin_note: String,
}

async fn reject_submission(
    State(app): State<Arc<SchedulingApp>>,
    Path(_period_id): Path<u64>,
    Json(payload): Json<RejectRequest>,
) -> Response {
    match app
        .availability
        .reject(payload.actor, payload.submission_id, payload.admin_note)
    {
        Ok(submission) => (StatusCode::OK, Json(submission)).into_response(),
        Err(err) => availability_error_response(err),
    }
}

async fn dashboard(
    State(app): State<Arc<SchedulingApp>>,
    Path(period_id): Path<u64>,
) -> Response {
    match app.dashboard(PeriodId(period_id), Utc::now()) {
        Ok((period, heatmap)) => (
            StatusCode::OK,
            Json(json!({ "period": period, "heatmap": heatmap })),
        )
            .into_response(),
        Err(err) => period_error_response(err),
    }
}

#[derive(Debug, Deserialize)]
struct RemindRequest {
    actor: Actor,
}

async fn manual_reminder(
    State(app): State<Arc<SchedulingApp>>,
    Path(period_id): Path<u64>,
    Json(payload): Json<RemindRequest>,
) -> Response {
    match app.manual_reminder(payload.actor, PeriodId(period_id), Utc::now()) {
        Ok(notification) => (StatusCode::OK, Json(notification)).into_response(),
        Err(err) => period_error_response(err),
    }
}

async fn export_csv(
    State(app): State<Arc<SchedulingApp>>,
    Path(period_id): Path<u64>,
) -> Response {
    match app.export_csv(PeriodId(period_id)) {
        Ok(csv) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/csv; charset=utf-8")],
            csv,
        )
            .into_response(),
        Err(err) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": err.to_string() })),
        )
            .into_response(),
    }
}

#[derive(Debug, Deserialize)]
struct CandidateQuery {
    period: u64,
    date: NaiveDate,
    location: u64,
}

async fn list_candidates(
    State(app): State<Arc<SchedulingApp>>,
    Query(query): Query<CandidateQuery>,
) -> Response {
    match app.assignments.list_candidates(
        PeriodId(query.period),
        query.date,
        LocationId(query.location),
    ) {
        Ok(candidates) => (StatusCode::OK, Json(candidates)).into_response(),
        Err(err) => assignment_error_response(err),
    }
}

#[derive(Debug, Deserialize)]
struct AssignRequest {
    actor: Actor,
    date: NaiveDate,
    location: LocationId,
    assignee: Assignee,
    #[serde(default)]
    admin_note: String,
}

async fn assign(
    State(app): State<Arc<SchedulingApp>>,
    Json(payload): Json<AssignRequest>,
) -> Response {
    match app.assignments.assign(
        payload.actor,
        payload.date,
        payload.location,
        payload.assignee,
        payload.admin_note,
    ) {
        Ok(assignment) => (StatusCode::OK, Json(assignment)).into_response(),
        Err(err) => assignment_error_response(err),
    }
}

#[derive(Debug, Deserialize)]
struct UnassignRequest {
    actor: Actor,
    date: NaiveDate,
    location: LocationId,
}

async fn unassign(
    State(app): State<Arc<SchedulingApp>>,
    Json(payload): Json<UnassignRequest>,
) -> Response {
    match app
        .assignments
        .unassign(payload.actor, payload.date, payload.location)
    {
        Ok(removed) => (StatusCode::OK, Json(json!({ "removed": removed }))).into_response(),
        Err(err) => assignment_error_response(err),
    }
}

#[derive(Debug, Deserialize)]
struct AssignmentRangeQuery {
    start: NaiveDate,
    end: NaiveDate,
}

async fn list_assignments(
    State(app): State<Arc<SchedulingApp>>,
    Query(query): Query<AssignmentRangeQuery>,
) -> Response {
    match app.assignments.assignments_in_range(query.start, query.end) {
        Ok(assignments) => (StatusCode::OK, Json(assignments)).into_response(),
        Err(err) => assignment_error_response(err),
    }
}

async fn get_settings(State(app): State<Arc<SchedulingApp>>) -> Response {
    match app.settings() {
        Ok(settings) => (StatusCode::OK, Json(settings)).into_response(),
        Err(err) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": err.to_string() })),
        )
            .into_response(),
    }
}

#[derive(Debug, Deserialize)]
struct SettingsRequest {
    actor: Actor,
    #[serde(flatten)]
    settings: StaffingSettings,
}

async fn update_settings(
    State(app): State<Arc<SchedulingApp>>,
    Json(payload): Json<SettingsRequest>,
) -> Response {
    match app.update_settings(payload.actor, payload.settings) {
        Ok(settings) => (StatusCode::OK, Json(settings)).into_response(),
        Err(err) => {
            let status = match &err {
                SettingsError::AccessDenied => StatusCode::FORBIDDEN,
                SettingsError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
            };
            (status, Json(json!({ "error": err.to_string() }))).into_response()
        }
    }
}
