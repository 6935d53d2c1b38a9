// --- File: crates/bookify_catalog/src/handlers.rs ---
use crate::logic::{
    self, AssignServicesRequest, CatalogError, CreateEmployeeRequest, CreateServiceRequest,
    DayAvailabilityQuery, DayAvailabilityResponse, DeactivationResponse, ListEmployeesQuery,
    ListServicesQuery, UpdateEmployeeRequest, UpdateServiceRequest,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use bookify_common::models::{Employee, Service, ServiceCategory};
use bookify_common::{Actor, HttpStatusCode};
use bookify_db::Repositories;
use std::sync::Arc;
use tracing::error;

// Shared state for the catalog routes.
#[derive(Clone)]
pub struct CatalogState {
    pub repos: Repositories,
}

fn error_response(e: CatalogError) -> (StatusCode, String) {
    let status =
        StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    if status.is_server_error() {
        error!("catalog operation failed: {e}");
        return (status, "Internal server error".to_string());
    }
    (status, e.to_string())
}

// --- Services ---

#[axum::debug_handler]
pub async fn list_services_handler(
    State(state): State<Arc<CatalogState>>,
    _actor: Actor,
    Query(query): Query<ListServicesQuery>,
) -> Result<Json<Vec<Service>>, (StatusCode, String)> {
    let services = logic::list_services(&state.repos, query)
        .await
        .map_err(error_response)?;
    Ok(Json(services))
}

#[axum::debug_handler]
pub async fn list_categories_handler(
    State(state): State<Arc<CatalogState>>,
    _actor: Actor,
) -> Result<Json<Vec<ServiceCategory>>, (StatusCode, String)> {
    let categories = logic::list_categories(&state.repos)
        .await
        .map_err(error_response)?;
    Ok(Json(categories))
}

#[axum::debug_handler]
pub async fn get_service_handler(
    State(state): State<Arc<CatalogState>>,
    _actor: Actor,
    Path(id): Path<String>,
) -> Result<Json<Service>, (StatusCode, String)> {
    let service = logic::get_service(&state.repos, &id)
        .await
        .map_err(error_response)?;
    Ok(Json(service))
}

#[axum::debug_handler]
pub async fn create_service_handler(
    State(state): State<Arc<CatalogState>>,
    actor: Actor,
    Json(request): Json<CreateServiceRequest>,
) -> Result<(StatusCode, Json<Service>), (StatusCode, String)> {
    let service = logic::create_service(&state.repos, &actor, request)
        .await
        .map_err(error_response)?;
    Ok((StatusCode::CREATED, Json(service)))
}

#[axum::debug_handler]
pub async fn update_service_handler(
    State(state): State<Arc<CatalogState>>,
    actor: Actor,
    Path(id): Path<String>,
    Json(request): Json<UpdateServiceRequest>,
) -> Result<Json<Service>, (StatusCode, String)> {
    let service = logic::update_service(&state.repos, &actor, &id, request)
        .await
        .map_err(error_response)?;
    Ok(Json(service))
}

#[axum::debug_handler]
pub async fn deactivate_service_handler(
    State(state): State<Arc<CatalogState>>,
    actor: Actor,
    Path(id): Path<String>,
) -> Result<Json<DeactivationResponse>, (StatusCode, String)> {
    let service = logic::deactivate_service(&state.repos, &actor, &id)
        .await
        .map_err(error_response)?;
    Ok(Json(DeactivationResponse {
        success: true,
        message: format!("service {} deactivated", service.id),
    }))
}

// --- Employees ---

#[axum::debug_handler]
pub async fn list_employees_handler(
    State(state): State<Arc<CatalogState>>,
    _actor: Actor,
    Query(query): Query<ListEmployeesQuery>,
) -> Result<Json<Vec<Employee>>, (StatusCode, String)> {
    let employees = logic::list_employees(&state.repos, query)
        .await
        .map_err(error_response)?;
    Ok(Json(employees))
}

#[axum::debug_handler]
pub async fn get_employee_handler(
    State(state): State<Arc<CatalogState>>,
    _actor: Actor,
    Path(id): Path<String>,
) -> Result<Json<Employee>, (StatusCode, String)> {
    let employee = logic::get_employee(&state.repos, &id)
        .await
        .map_err(error_response)?;
    Ok(Json(employee))
}

#[axum::debug_handler]
pub async fn create_employee_handler(
    State(state): State<Arc<CatalogState>>,
    actor: Actor,
    Json(request): Json<CreateEmployeeRequest>,
) -> Result<(StatusCode, Json<Employee>), (StatusCode, String)> {
    let employee = logic::create_employee(&state.repos, &actor, request)
        .await
        .map_err(error_response)?;
    Ok((StatusCode::CREATED, Json(employee)))
}

#[axum::debug_handler]
pub async fn update_employee_handler(
    State(state): State<Arc<CatalogState>>,
    actor: Actor,
    Path(id): Path<String>,
    Json(request): Json<UpdateEmployeeRequest>,
) -> Result<Json<Employee>, (StatusCode, String)> {
    let employee = logic::update_employee(&state.repos, &actor, &id, request)
        .await
        .map_err(error_response)?;
    Ok(Json(employee))
}

#[axum::debug_handler]
pub async fn deactivate_employee_handler(
    State(state): State<Arc<CatalogState>>,
    actor: Actor,
    Path(id): Path<String>,
) -> Result<Json<DeactivationResponse>, (StatusCode, String)> {
    let employee = logic::deactivate_employee(&state.repos, &actor, &id)
        .await
        .map_err(error_response)?;
    Ok(Json(DeactivationResponse {
        success: true,
        message: format!("employee {} deactivated", employee.id),
    }))
}

#[axum::debug_handler]
pub async fn assign_services_handler(
    State(state): State<Arc<CatalogState>>,
    actor: Actor,
    Path(id): Path<String>,
    Json(request): Json<AssignServicesRequest>,
) -> Result<Json<Employee>, (StatusCode, String)> {
    let employee = logic::assign_services(&state.repos, &actor, &id, request)
        .await
        .map_err(error_response)?;
    Ok(Json(employee))
}

#[axum::debug_handler]
pub async fn day_availability_handler(
    State(state): State<Arc<CatalogState>>,
    _actor: Actor,
    Path(id): Path<String>,
    Query(query): Query<DayAvailabilityQuery>,
) -> Result<Json<DayAvailabilityResponse>, (StatusCode, String)> {
    let availability = logic::day_availability(&state.repos, &id, query.date)
        .await
        .map_err(error_response)?;
    Ok(Json(availability))
}
