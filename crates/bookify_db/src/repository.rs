//! Repository traits for the booking domain
//!
//! These traits keep the scheduling engine agnostic of the storage backend.
//! They are object safe (`async_trait`) so the backend binary can inject
//! either implementation behind `Arc<dyn ...>` at process start.

use crate::error::DbError;
use async_trait::async_trait;
use bookify_common::models::{Appointment, AppointmentStatus, Client, Employee, Service, TimeOfDay};
use chrono::NaiveDate;

/// Optional criteria for listing appointments.
#[derive(Debug, Clone, Default)]
pub struct AppointmentFilter {
    pub status: Option<AppointmentStatus>,
    /// Exact calendar day.
    pub date: Option<NaiveDate>,
    pub employee_id: Option<String>,
    pub client_id: Option<String>,
}

/// One row of the status aggregation: how many appointments and how much
/// revenue sit in each status.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct StatusBucket {
    pub status: AppointmentStatus,
    pub count: u64,
    pub revenue: i64,
}

/// One row of the per-service aggregation.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ServiceBucket {
    pub service_id: String,
    pub count: u64,
    pub revenue: i64,
}

/// Store for appointments.
///
/// `insert` and `update` must enforce the slot-uniqueness invariant
/// atomically and report a violation as [`DbError::UniqueViolation`].
#[async_trait]
pub trait AppointmentRepository: Send + Sync {
    /// Find an appointment occupying the given slot, i.e. same employee,
    /// exact date, exact time, status pending or confirmed. `exclude_id`
    /// lets a reschedule ignore the appointment being edited.
    async fn find_conflicting(
        &self,
        employee_id: &str,
        date: NaiveDate,
        time: TimeOfDay,
        exclude_id: Option<&str>,
    ) -> Result<Option<Appointment>, DbError>;

    async fn insert(&self, appointment: Appointment) -> Result<Appointment, DbError>;

    /// Replace the stored appointment. Fails with [`DbError::NotFound`] if
    /// the id is absent and [`DbError::UniqueViolation`] if the new slot is
    /// already taken.
    async fn update(&self, appointment: Appointment) -> Result<Appointment, DbError>;

    async fn find_by_id(&self, id: &str) -> Result<Option<Appointment>, DbError>;

    /// List matching appointments ordered by date, then time.
    async fn list(&self, filter: AppointmentFilter) -> Result<Vec<Appointment>, DbError>;

    async fn status_breakdown(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<StatusBucket>, DbError>;

    async fn service_breakdown(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<ServiceBucket>, DbError>;
}

/// Store for the service catalog.
#[async_trait]
pub trait ServiceRepository: Send + Sync {
    async fn find_service(&self, id: &str) -> Result<Option<Service>, DbError>;

    /// Like `find_service`, but only returns services flagged active.
    async fn find_active_service(&self, id: &str) -> Result<Option<Service>, DbError>;

    async fn list_services(&self, only_active: bool) -> Result<Vec<Service>, DbError>;

    async fn insert_service(&self, service: Service) -> Result<Service, DbError>;

    async fn update_service(&self, service: Service) -> Result<Service, DbError>;
}

/// Store for staff.
#[async_trait]
pub trait EmployeeRepository: Send + Sync {
    async fn find_employee(&self, id: &str) -> Result<Option<Employee>, DbError>;

    async fn find_active_employee(&self, id: &str) -> Result<Option<Employee>, DbError>;

    /// Active employees qualified for the given service, in creation order.
    /// The auto-selector relies on this order being stable.
    async fn list_active_for_service(&self, service_id: &str) -> Result<Vec<Employee>, DbError>;

    async fn list_employees(&self, only_active: bool) -> Result<Vec<Employee>, DbError>;

    async fn insert_employee(&self, employee: Employee) -> Result<Employee, DbError>;

    async fn update_employee(&self, employee: Employee) -> Result<Employee, DbError>;
}

/// Store for registered clients.
#[async_trait]
pub trait ClientRepository: Send + Sync {
    async fn find_client(&self, id: &str) -> Result<Option<Client>, DbError>;

    async fn insert_client(&self, client: Client) -> Result<Client, DbError>;

    /// Append an appointment id to the client's history. The history is
    /// append-only; entries are never removed.
    async fn append_appointment(&self, client_id: &str, appointment_id: &str)
        -> Result<(), DbError>;
}
