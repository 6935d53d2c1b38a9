// --- File: crates/bookify_catalog/src/routes.rs ---

use crate::handlers::{
    assign_services_handler, create_employee_handler, create_service_handler,
    day_availability_handler, deactivate_employee_handler, deactivate_service_handler,
    get_employee_handler, get_service_handler, list_categories_handler, list_employees_handler,
    list_services_handler, update_employee_handler, update_service_handler, CatalogState,
};
use axum::{
    routing::{delete, get, post, put},
    Router,
};
use bookify_db::Repositories;
use std::sync::Arc;

/// Creates a router containing all routes for the catalog feature.
pub fn routes(repos: Repositories) -> Router {
    let state = Arc::new(CatalogState { repos });

    Router::new()
        .route("/services", post(create_service_handler))
        .route("/services", get(list_services_handler))
        .route("/services/categories", get(list_categories_handler))
        .route("/services/{id}", get(get_service_handler))
        .route("/services/{id}", put(update_service_handler))
        .route("/services/{id}", delete(deactivate_service_handler))
        .route("/employees", post(create_employee_handler))
        .route("/employees", get(list_employees_handler))
        .route("/employees/{id}", get(get_employee_handler))
        .route("/employees/{id}", put(update_employee_handler))
        .route("/employees/{id}", delete(deactivate_employee_handler))
        .route("/employees/{id}/services", post(assign_services_handler))
        .route("/employees/{id}/availability", get(day_availability_handler))
        .with_state(state)
}
