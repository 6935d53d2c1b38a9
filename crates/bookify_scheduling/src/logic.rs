// --- File: crates/bookify_scheduling/src/logic.rs ---
//! The scheduling engine: slot availability, employee auto-selection and the
//! appointment state machine.
//!
//! The availability check here exists for a good error message; the store's
//! uniqueness constraint is what actually prevents double booking when two
//! requests race (see `bookify_db`). A `UniqueViolation` bubbling out of an
//! insert or update is therefore translated into [`SchedulingError::Conflict`]
//! just like a failed pre-check.

use crate::policy;
use bookify_common::models::{
    Appointment, AppointmentStatus, Employee, PaymentStatus, TimeOfDay,
};
use bookify_common::{Actor, HttpStatusCode};
use bookify_config::BookingConfig;
use bookify_db::{
    AppointmentFilter, AppointmentRepository, ClientRepository, DbError, EmployeeRepository,
    Repositories, ServiceBucket, ServiceRepository, StatusBucket,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

// --- Error Handling ---
use thiserror::Error;
#[derive(Error, Debug)]
pub enum SchedulingError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Slot conflict: {0}")]
    Conflict(String),
    #[error("Invalid state: {0}")]
    InvalidState(String),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Storage error: {0}")]
    Repository(#[from] DbError),
}

impl HttpStatusCode for SchedulingError {
    fn status_code(&self) -> u16 {
        match self {
            SchedulingError::NotFound(_) => 404,
            SchedulingError::Forbidden(_) => 403,
            SchedulingError::Conflict(_) => 409,
            SchedulingError::InvalidState(_) => 400,
            SchedulingError::Validation(_) => 400,
            SchedulingError::Repository(_) => 500,
        }
    }
}

/// Write-path error mapping: the storage constraint firing is a booking
/// conflict, not a server error.
fn conflict_on_unique(e: DbError) -> SchedulingError {
    match e {
        DbError::UniqueViolation(msg) => SchedulingError::Conflict(msg),
        other => SchedulingError::Repository(other),
    }
}

// --- Data Structures ---

#[derive(Deserialize, Debug)]
pub struct CreateAppointmentRequest {
    pub service_id: String,
    /// Omit to let the engine pick the first available qualified employee.
    pub employee_id: Option<String>,
    /// Calendar date, `YYYY-MM-DD`.
    pub date: NaiveDate,
    /// `HH:MM`, 24h.
    pub time: TimeOfDay,
    pub notes: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
pub struct UpdateAppointmentRequest {
    pub employee_id: Option<String>,
    pub date: Option<NaiveDate>,
    pub time: Option<TimeOfDay>,
    pub status: Option<AppointmentStatus>,
    pub notes: Option<String>,
    pub payment_status: Option<PaymentStatus>,
}

impl UpdateAppointmentRequest {
    fn changes_slot(&self) -> bool {
        self.employee_id.is_some() || self.date.is_some() || self.time.is_some()
    }
}

#[derive(Deserialize, Debug)]
pub struct AvailabilityQuery {
    pub employee_id: String,
    pub date: NaiveDate,
    pub time: TimeOfDay,
}

#[derive(Serialize, Debug)]
pub struct AvailabilityResponse {
    pub available: bool,
}

#[derive(Deserialize, Debug, Default)]
pub struct ListAppointmentsQuery {
    pub status: Option<AppointmentStatus>,
    pub date: Option<NaiveDate>,
    pub employee_id: Option<String>,
    pub client_id: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
pub struct StatsQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Serialize, Debug)]
pub struct StatsResponse {
    pub status_stats: Vec<StatusBucket>,
    pub service_stats: Vec<ServiceBucket>,
}

#[derive(Serialize, Debug)]
pub struct CancellationResponse {
    pub success: bool,
    pub message: String,
}

// --- Availability Logic ---

/// Reports whether the (employee, date, time) slot is free.
///
/// A slot is taken iff an appointment with status pending or confirmed exists
/// for exactly that employee, calendar date and time. `exclude_id` lets a
/// reschedule ignore the appointment being edited so moving an appointment to
/// its current slot always succeeds.
///
/// Pure read; qualification and active-flag checks belong to the caller.
pub async fn check_availability(
    appointments: &dyn AppointmentRepository,
    employee_id: &str,
    date: NaiveDate,
    time: TimeOfDay,
    exclude_id: Option<&str>,
) -> Result<bool, SchedulingError> {
    let conflicting = appointments
        .find_conflicting(employee_id, date, time, exclude_id)
        .await?;
    Ok(conflicting.is_none())
}

/// Picks an employee for a booking the client left unassigned.
///
/// Candidates are the active employees qualified for the service, enumerated
/// in creation order; the first one whose slot is free wins. Greedy first-fit,
/// no load balancing (see DESIGN.md).
pub async fn select_employee(
    employees: &dyn EmployeeRepository,
    appointments: &dyn AppointmentRepository,
    service_id: &str,
    date: NaiveDate,
    time: TimeOfDay,
) -> Result<Option<Employee>, SchedulingError> {
    for candidate in employees.list_active_for_service(service_id).await? {
        if check_availability(appointments, &candidate.id, date, time, None).await? {
            return Ok(Some(candidate));
        }
    }
    Ok(None)
}

// --- Appointment operations ---

fn validate_notes(notes: &Option<String>, booking: &BookingConfig) -> Result<(), SchedulingError> {
    if let Some(notes) = notes {
        if notes.chars().count() > booking.max_notes_len {
            return Err(SchedulingError::Validation(format!(
                "notes may not exceed {} characters",
                booking.max_notes_len
            )));
        }
    }
    Ok(())
}

/// Books a new appointment for the acting client.
///
/// The service must be active. An explicitly requested employee must be
/// active, qualified and free; without one, auto-selection runs and an empty
/// candidate set fails the whole request with nothing persisted. New
/// appointments enter the state machine as `pending` with the service price
/// snapshotted.
pub async fn create_appointment(
    repos: &Repositories,
    booking: &BookingConfig,
    actor: &Actor,
    request: CreateAppointmentRequest,
) -> Result<Appointment, SchedulingError> {
    validate_notes(&request.notes, booking)?;

    let service = repos
        .services
        .find_active_service(&request.service_id)
        .await?
        .ok_or_else(|| {
            SchedulingError::NotFound(format!(
                "service {} not found or inactive",
                request.service_id
            ))
        })?;

    let employee = match &request.employee_id {
        Some(employee_id) => {
            let employee = repos
                .employees
                .find_active_employee(employee_id)
                .await?
                .ok_or_else(|| {
                    SchedulingError::NotFound(format!(
                        "employee {employee_id} not found or inactive"
                    ))
                })?;
            if !employee.is_qualified_for(&service.id) {
                return Err(SchedulingError::Validation(format!(
                    "employee {} cannot perform service {}",
                    employee.id, service.id
                )));
            }
            let available = check_availability(
                repos.appointments.as_ref(),
                &employee.id,
                request.date,
                request.time,
                None,
            )
            .await?;
            if !available {
                return Err(SchedulingError::Conflict(format!(
                    "employee {} is not available on {} at {}",
                    employee.id, request.date, request.time
                )));
            }
            employee
        }
        None => select_employee(
            repos.employees.as_ref(),
            repos.appointments.as_ref(),
            &service.id,
            request.date,
            request.time,
        )
        .await?
        .ok_or_else(|| {
            SchedulingError::NotFound(format!(
                "no employee available on {} at {}",
                request.date, request.time
            ))
        })?,
    };

    let now = Utc::now();
    let appointment = Appointment {
        id: Uuid::new_v4().to_string(),
        client_id: actor.id.clone(),
        service_id: service.id.clone(),
        employee_id: Some(employee.id.clone()),
        date: request.date,
        time: request.time,
        status: AppointmentStatus::Pending,
        notes: request.notes,
        total_price: service.price,
        payment_status: PaymentStatus::Pending,
        created_by: actor.role,
        created_at: now,
        updated_at: now,
    };

    // The store enforces the slot constraint atomically; losing the
    // check-then-act race surfaces here as a conflict.
    let created = repos
        .appointments
        .insert(appointment)
        .await
        .map_err(conflict_on_unique)?;

    // History is bookkeeping; a client record missing from the store (e.g.
    // registration handled elsewhere) must not undo the booking.
    match repos
        .clients
        .append_appointment(&created.client_id, &created.id)
        .await
    {
        Ok(()) => {}
        Err(DbError::NotFound(_)) => {
            debug!(client_id = %created.client_id, "no client record, history not updated");
        }
        Err(e) => return Err(SchedulingError::Repository(e)),
    }

    debug!(id = %created.id, employee_id = %employee.id, "appointment created");
    Ok(created)
}

/// Applies a patch to an existing appointment.
///
/// Rejected outright when the appointment is terminal (completed or
/// cancelled; no-show stays editable). Slot changes re-run the availability
/// check against the prospective triple with the appointment itself excluded;
/// status changes must follow the transition table.
pub async fn update_appointment(
    repos: &Repositories,
    booking: &BookingConfig,
    actor: &Actor,
    appointment_id: &str,
    request: UpdateAppointmentRequest,
) -> Result<Appointment, SchedulingError> {
    let mut appointment = repos
        .appointments
        .find_by_id(appointment_id)
        .await?
        .ok_or_else(|| SchedulingError::NotFound(format!("appointment {appointment_id}")))?;

    policy::authorize(actor, &appointment)?;

    if appointment.status.is_terminal() {
        return Err(SchedulingError::InvalidState(format!(
            "appointment {} is {} and can no longer be modified",
            appointment.id, appointment.status
        )));
    }

    if request.notes.is_some() {
        validate_notes(&request.notes, booking)?;
    }

    if let Some(next) = request.status {
        if !appointment.status.can_transition_to(next) {
            return Err(SchedulingError::InvalidState(format!(
                "cannot move appointment {} from {} to {}",
                appointment.id, appointment.status, next
            )));
        }
    }

    if request.changes_slot() {
        let new_employee_id = request
            .employee_id
            .clone()
            .or_else(|| appointment.employee_id.clone())
            .ok_or_else(|| {
                SchedulingError::Validation(format!(
                    "appointment {} has no employee assigned",
                    appointment.id
                ))
            })?;
        let new_date = request.date.unwrap_or(appointment.date);
        let new_time = request.time.unwrap_or(appointment.time);

        // A newly assigned employee must be able to do the job at all.
        if appointment.employee_id.as_deref() != Some(new_employee_id.as_str()) {
            let employee = repos
                .employees
                .find_active_employee(&new_employee_id)
                .await?
                .ok_or_else(|| {
                    SchedulingError::NotFound(format!(
                        "employee {new_employee_id} not found or inactive"
                    ))
                })?;
            if !employee.is_qualified_for(&appointment.service_id) {
                return Err(SchedulingError::Validation(format!(
                    "employee {} cannot perform service {}",
                    employee.id, appointment.service_id
                )));
            }
        }

        let available = check_availability(
            repos.appointments.as_ref(),
            &new_employee_id,
            new_date,
            new_time,
            Some(&appointment.id),
        )
        .await?;
        if !available {
            return Err(SchedulingError::Conflict(format!(
                "employee {new_employee_id} is not available on {new_date} at {new_time}"
            )));
        }

        appointment.employee_id = Some(new_employee_id);
        appointment.date = new_date;
        appointment.time = new_time;
    }

    if let Some(status) = request.status {
        appointment.status = status;
    }
    if let Some(notes) = request.notes {
        appointment.notes = Some(notes);
    }
    if let Some(payment_status) = request.payment_status {
        appointment.payment_status = payment_status;
    }
    appointment.updated_at = Utc::now();

    repos
        .appointments
        .update(appointment)
        .await
        .map_err(conflict_on_unique)
}

/// Cancels an appointment: a status change, never a deletion.
///
/// Allowed from any status except `completed`.
pub async fn cancel_appointment(
    repos: &Repositories,
    actor: &Actor,
    appointment_id: &str,
) -> Result<Appointment, SchedulingError> {
    let mut appointment = repos
        .appointments
        .find_by_id(appointment_id)
        .await?
        .ok_or_else(|| SchedulingError::NotFound(format!("appointment {appointment_id}")))?;

    policy::authorize(actor, &appointment)?;

    if appointment.status == AppointmentStatus::Completed {
        return Err(SchedulingError::InvalidState(format!(
            "appointment {} is completed and cannot be cancelled",
            appointment.id
        )));
    }

    appointment.status = AppointmentStatus::Cancelled;
    appointment.updated_at = Utc::now();
    Ok(repos.appointments.update(appointment).await?)
}

/// Fetch one appointment, ownership-checked.
pub async fn get_appointment(
    repos: &Repositories,
    actor: &Actor,
    appointment_id: &str,
) -> Result<Appointment, SchedulingError> {
    let appointment = repos
        .appointments
        .find_by_id(appointment_id)
        .await?
        .ok_or_else(|| SchedulingError::NotFound(format!("appointment {appointment_id}")))?;
    policy::authorize(actor, &appointment)?;
    Ok(appointment)
}

/// List appointments. Non-admin callers only ever see their own, whatever
/// filter they send.
pub async fn list_appointments(
    repos: &Repositories,
    actor: &Actor,
    query: ListAppointmentsQuery,
) -> Result<Vec<Appointment>, SchedulingError> {
    let mut filter = AppointmentFilter {
        status: query.status,
        date: query.date,
        employee_id: query.employee_id,
        client_id: query.client_id,
    };
    if !actor.is_admin() {
        filter.client_id = Some(actor.id.clone());
    }
    Ok(repos.appointments.list(filter).await?)
}

/// Status and per-service revenue aggregation, admin only.
pub async fn appointment_stats(
    repos: &Repositories,
    actor: &Actor,
    query: StatsQuery,
) -> Result<StatsResponse, SchedulingError> {
    policy::require_admin(actor)?;
    let status_stats = repos
        .appointments
        .status_breakdown(query.start_date, query.end_date)
        .await?;
    let service_stats = repos
        .appointments
        .service_breakdown(query.start_date, query.end_date)
        .await?;
    Ok(StatsResponse {
        status_stats,
        service_stats,
    })
}
