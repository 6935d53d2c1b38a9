// --- File: crates/bookify_scheduling/src/handlers.rs ---
use crate::logic::{
    self, AvailabilityQuery, AvailabilityResponse, CancellationResponse,
    CreateAppointmentRequest, ListAppointmentsQuery, SchedulingError, StatsQuery, StatsResponse,
    UpdateAppointmentRequest,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use bookify_common::models::Appointment;
use bookify_common::{Actor, HttpStatusCode};
use bookify_config::AppConfig;
use bookify_db::Repositories;
use std::sync::Arc;
use tracing::error;

// Shared state for the scheduling routes.
#[derive(Clone)]
pub struct SchedulingState {
    pub config: Arc<AppConfig>,
    pub repos: Repositories,
}

/// Translate an engine error into a response. Server-side failures are logged
/// here and replaced with a generic message; everything else carries the
/// engine's classification through.
fn error_response(e: SchedulingError) -> (StatusCode, String) {
    let status =
        StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    if status.is_server_error() {
        error!("scheduling operation failed: {e}");
        return (status, "Internal server error".to_string());
    }
    (status, e.to_string())
}

/// Handler to book an appointment.
#[axum::debug_handler]
pub async fn create_appointment_handler(
    State(state): State<Arc<SchedulingState>>,
    actor: Actor,
    Json(request): Json<CreateAppointmentRequest>,
) -> Result<(StatusCode, Json<Appointment>), (StatusCode, String)> {
    let appointment =
        logic::create_appointment(&state.repos, &state.config.booking, &actor, request)
            .await
            .map_err(error_response)?;
    Ok((StatusCode::CREATED, Json(appointment)))
}

/// Handler to list appointments (own ones for clients, all for admins).
#[axum::debug_handler]
pub async fn list_appointments_handler(
    State(state): State<Arc<SchedulingState>>,
    actor: Actor,
    Query(query): Query<ListAppointmentsQuery>,
) -> Result<Json<Vec<Appointment>>, (StatusCode, String)> {
    let appointments = logic::list_appointments(&state.repos, &actor, query)
        .await
        .map_err(error_response)?;
    Ok(Json(appointments))
}

/// Handler to fetch a single appointment.
#[axum::debug_handler]
pub async fn get_appointment_handler(
    State(state): State<Arc<SchedulingState>>,
    actor: Actor,
    Path(id): Path<String>,
) -> Result<Json<Appointment>, (StatusCode, String)> {
    let appointment = logic::get_appointment(&state.repos, &actor, &id)
        .await
        .map_err(error_response)?;
    Ok(Json(appointment))
}

/// Handler to patch an appointment (reschedule, status change, notes).
#[axum::debug_handler]
pub async fn update_appointment_handler(
    State(state): State<Arc<SchedulingState>>,
    actor: Actor,
    Path(id): Path<String>,
    Json(request): Json<UpdateAppointmentRequest>,
) -> Result<Json<Appointment>, (StatusCode, String)> {
    let appointment =
        logic::update_appointment(&state.repos, &state.config.booking, &actor, &id, request)
            .await
            .map_err(error_response)?;
    Ok(Json(appointment))
}

/// Handler to cancel an appointment. The record stays; only its status moves.
#[axum::debug_handler]
pub async fn cancel_appointment_handler(
    State(state): State<Arc<SchedulingState>>,
    actor: Actor,
    Path(id): Path<String>,
) -> Result<Json<CancellationResponse>, (StatusCode, String)> {
    let appointment = logic::cancel_appointment(&state.repos, &actor, &id)
        .await
        .map_err(error_response)?;
    Ok(Json(CancellationResponse {
        success: true,
        message: format!("appointment {} cancelled", appointment.id),
    }))
}

/// Handler to probe whether a slot is free.
#[axum::debug_handler]
pub async fn availability_handler(
    State(state): State<Arc<SchedulingState>>,
    _actor: Actor,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<AvailabilityResponse>, (StatusCode, String)> {
    let available = logic::check_availability(
        state.repos.appointments.as_ref(),
        &query.employee_id,
        query.date,
        query.time,
        None,
    )
    .await
    .map_err(error_response)?;
    Ok(Json(AvailabilityResponse { available }))
}

/// Handler for the admin stats aggregation.
#[axum::debug_handler]
pub async fn stats_handler(
    State(state): State<Arc<SchedulingState>>,
    actor: Actor,
    Query(query): Query<StatsQuery>,
) -> Result<Json<StatsResponse>, (StatusCode, String)> {
    let stats = logic::appointment_stats(&state.repos, &actor, query)
        .await
        .map_err(error_response)?;
    Ok(Json(stats))
}
