// --- File: crates/bookify_scheduling/src/routes.rs ---

use crate::handlers::{
    availability_handler, cancel_appointment_handler, create_appointment_handler,
    get_appointment_handler, list_appointments_handler, stats_handler,
    update_appointment_handler, SchedulingState,
};
use axum::{
    routing::{delete, get, post, put},
    Router,
};
use bookify_config::AppConfig;
use bookify_db::Repositories;
use std::sync::Arc;

/// Creates a router containing all routes for the scheduling feature.
pub fn routes(config: Arc<AppConfig>, repos: Repositories) -> Router {
    let state = Arc::new(SchedulingState { config, repos });

    Router::new()
        .route("/appointments", post(create_appointment_handler))
        .route("/appointments", get(list_appointments_handler))
        .route("/appointments/availability", get(availability_handler))
        .route("/appointments/stats", get(stats_handler))
        .route("/appointments/{id}", get(get_appointment_handler))
        .route("/appointments/{id}", put(update_appointment_handler))
        .route("/appointments/{id}", delete(cancel_appointment_handler))
        .with_state(state)
}
