// --- File: crates/bookify_catalog/src/logic.rs ---
//! Catalog operations on services and employees.

use bookify_common::models::{
    DayHours, Employee, Service, ServiceCategory, TimeOfDay, WeeklyHours,
};
use bookify_common::{Actor, HttpStatusCode};
use bookify_db::{DbError, EmployeeRepository, Repositories, ServiceRepository};
use chrono::{Datelike, Duration, NaiveDate, Timelike, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

// --- Error Handling ---
use thiserror::Error;
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Storage error: {0}")]
    Repository(#[from] DbError),
}

impl HttpStatusCode for CatalogError {
    fn status_code(&self) -> u16 {
        match self {
            CatalogError::NotFound(_) => 404,
            CatalogError::Forbidden(_) => 403,
            CatalogError::Validation(_) => 400,
            CatalogError::Repository(_) => 500,
        }
    }
}

fn require_admin(actor: &Actor) -> Result<(), CatalogError> {
    if actor.is_admin() {
        Ok(())
    } else {
        Err(CatalogError::Forbidden(format!(
            "actor {} is not an admin",
            actor.id
        )))
    }
}

// --- Data Structures ---

#[derive(Deserialize, Debug, Default)]
pub struct ListServicesQuery {
    pub category: Option<ServiceCategory>,
    pub is_active: Option<bool>,
}

#[derive(Deserialize, Debug)]
pub struct CreateServiceRequest {
    pub name: String,
    pub description: String,
    pub duration_minutes: u32,
    /// In cents.
    pub price: i64,
    #[serde(default)]
    pub category: ServiceCategory,
}

#[derive(Deserialize, Debug, Default)]
pub struct UpdateServiceRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub duration_minutes: Option<u32>,
    pub price: Option<i64>,
    pub category: Option<ServiceCategory>,
    pub is_active: Option<bool>,
}

#[derive(Deserialize, Debug, Default)]
pub struct ListEmployeesQuery {
    pub is_active: Option<bool>,
    /// Only employees qualified for this service.
    pub service_id: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct CreateEmployeeRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub specialization: String,
    #[serde(default)]
    pub service_ids: Vec<String>,
    pub working_hours: Option<WeeklyHours>,
    pub hire_date: Option<NaiveDate>,
}

#[derive(Deserialize, Debug, Default)]
pub struct UpdateEmployeeRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub specialization: Option<String>,
    pub service_ids: Option<Vec<String>>,
    pub working_hours: Option<WeeklyHours>,
    pub is_active: Option<bool>,
}

#[derive(Deserialize, Debug)]
pub struct AssignServicesRequest {
    pub service_ids: Vec<String>,
}

#[derive(Deserialize, Debug)]
pub struct DayAvailabilityQuery {
    pub date: NaiveDate,
}

/// Working-hours view of a single day with the bookable slot grid.
#[derive(Serialize, Debug)]
pub struct DayAvailabilityResponse {
    pub is_working: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub working_hours: Option<DayHours>,
    pub available_slots: Vec<TimeOfDay>,
}

#[derive(Serialize, Debug)]
pub struct DeactivationResponse {
    pub success: bool,
    pub message: String,
}

// --- Validation ---

const NAME_MAX: usize = 100;
const DESCRIPTION_MAX: usize = 500;
const DURATION_MIN: u32 = 15;
const DURATION_MAX: u32 = 480;

fn validate_name(name: &str) -> Result<(), CatalogError> {
    if name.trim().is_empty() {
        return Err(CatalogError::Validation("name must not be empty".into()));
    }
    if name.chars().count() > NAME_MAX {
        return Err(CatalogError::Validation(format!(
            "name may not exceed {NAME_MAX} characters"
        )));
    }
    Ok(())
}

fn validate_description(description: &str) -> Result<(), CatalogError> {
    if description.chars().count() > DESCRIPTION_MAX {
        return Err(CatalogError::Validation(format!(
            "description may not exceed {DESCRIPTION_MAX} characters"
        )));
    }
    Ok(())
}

fn validate_duration(minutes: u32) -> Result<(), CatalogError> {
    if !(DURATION_MIN..=DURATION_MAX).contains(&minutes) {
        return Err(CatalogError::Validation(format!(
            "duration must be between {DURATION_MIN} and {DURATION_MAX} minutes"
        )));
    }
    Ok(())
}

fn validate_price(price: i64) -> Result<(), CatalogError> {
    if price < 0 {
        return Err(CatalogError::Validation(
            "price must not be negative".into(),
        ));
    }
    Ok(())
}

fn validate_email(email: &str) -> Result<(), CatalogError> {
    if !email.contains('@') {
        return Err(CatalogError::Validation(format!(
            "invalid email address: {email}"
        )));
    }
    Ok(())
}

/// Every referenced service id must exist in the catalog; an unknown one
/// fails the whole request.
async fn validate_service_refs(
    repos: &Repositories,
    service_ids: &[String],
) -> Result<(), CatalogError> {
    for service_id in service_ids {
        if repos.services.find_service(service_id).await?.is_none() {
            return Err(CatalogError::Validation(format!(
                "service {service_id} does not exist"
            )));
        }
    }
    Ok(())
}

// --- Service operations ---

pub async fn list_services(
    repos: &Repositories,
    query: ListServicesQuery,
) -> Result<Vec<Service>, CatalogError> {
    let services = repos.services.list_services(false).await?;
    Ok(services
        .into_iter()
        .filter(|s| query.category.is_none_or(|c| s.category == c))
        .filter(|s| query.is_active.is_none_or(|active| s.is_active == active))
        .collect())
}

pub async fn get_service(repos: &Repositories, id: &str) -> Result<Service, CatalogError> {
    repos
        .services
        .find_service(id)
        .await?
        .ok_or_else(|| CatalogError::NotFound(format!("service {id}")))
}

/// Distinct categories currently present in the catalog.
pub async fn list_categories(repos: &Repositories) -> Result<Vec<ServiceCategory>, CatalogError> {
    let services = repos.services.list_services(false).await?;
    let mut categories: Vec<ServiceCategory> = Vec::new();
    for service in services {
        if !categories.contains(&service.category) {
            categories.push(service.category);
        }
    }
    Ok(categories)
}

pub async fn create_service(
    repos: &Repositories,
    actor: &Actor,
    request: CreateServiceRequest,
) -> Result<Service, CatalogError> {
    require_admin(actor)?;
    validate_name(&request.name)?;
    validate_description(&request.description)?;
    validate_duration(request.duration_minutes)?;
    validate_price(request.price)?;

    let now = Utc::now();
    let service = Service {
        id: Uuid::new_v4().to_string(),
        name: request.name,
        description: request.description,
        duration_minutes: request.duration_minutes,
        price: request.price,
        category: request.category,
        is_active: true,
        created_at: now,
        updated_at: now,
    };
    let created = repos.services.insert_service(service).await?;
    debug!(id = %created.id, name = %created.name, "service created");
    Ok(created)
}

pub async fn update_service(
    repos: &Repositories,
    actor: &Actor,
    id: &str,
    request: UpdateServiceRequest,
) -> Result<Service, CatalogError> {
    require_admin(actor)?;
    let mut service = get_service(repos, id).await?;

    if let Some(name) = request.name {
        validate_name(&name)?;
        service.name = name;
    }
    if let Some(description) = request.description {
        validate_description(&description)?;
        service.description = description;
    }
    if let Some(duration_minutes) = request.duration_minutes {
        validate_duration(duration_minutes)?;
        service.duration_minutes = duration_minutes;
    }
    if let Some(price) = request.price {
        validate_price(price)?;
        service.price = price;
    }
    if let Some(category) = request.category {
        service.category = category;
    }
    if let Some(is_active) = request.is_active {
        service.is_active = is_active;
    }
    service.updated_at = Utc::now();

    Ok(repos.services.update_service(service).await?)
}

/// Soft deactivation. The record stays so old appointments keep a valid
/// reference; the scheduling engine refuses new bookings for it.
pub async fn deactivate_service(
    repos: &Repositories,
    actor: &Actor,
    id: &str,
) -> Result<Service, CatalogError> {
    require_admin(actor)?;
    let mut service = get_service(repos, id).await?;
    service.is_active = false;
    service.updated_at = Utc::now();
    Ok(repos.services.update_service(service).await?)
}

// --- Employee operations ---

pub async fn list_employees(
    repos: &Repositories,
    query: ListEmployeesQuery,
) -> Result<Vec<Employee>, CatalogError> {
    let employees = repos.employees.list_employees(false).await?;
    Ok(employees
        .into_iter()
        .filter(|e| query.is_active.is_none_or(|active| e.is_active == active))
        .filter(|e| {
            query
                .service_id
                .as_deref()
                .is_none_or(|service_id| e.is_qualified_for(service_id))
        })
        .collect())
}

pub async fn get_employee(repos: &Repositories, id: &str) -> Result<Employee, CatalogError> {
    repos
        .employees
        .find_employee(id)
        .await?
        .ok_or_else(|| CatalogError::NotFound(format!("employee {id}")))
}

pub async fn create_employee(
    repos: &Repositories,
    actor: &Actor,
    request: CreateEmployeeRequest,
) -> Result<Employee, CatalogError> {
    require_admin(actor)?;
    validate_name(&request.name)?;
    validate_email(&request.email)?;
    validate_service_refs(repos, &request.service_ids).await?;

    let now = Utc::now();
    let employee = Employee {
        id: Uuid::new_v4().to_string(),
        name: request.name,
        email: request.email,
        phone: request.phone,
        specialization: request.specialization,
        service_ids: request.service_ids,
        working_hours: request.working_hours.unwrap_or_default(),
        is_active: true,
        hire_date: request.hire_date.unwrap_or_else(|| now.date_naive()),
        created_at: now,
        updated_at: now,
    };
    let created = repos.employees.insert_employee(employee).await?;
    debug!(id = %created.id, name = %created.name, "employee created");
    Ok(created)
}

pub async fn update_employee(
    repos: &Repositories,
    actor: &Actor,
    id: &str,
    request: UpdateEmployeeRequest,
) -> Result<Employee, CatalogError> {
    require_admin(actor)?;
    let mut employee = get_employee(repos, id).await?;

    if let Some(name) = request.name {
        validate_name(&name)?;
        employee.name = name;
    }
    if let Some(email) = request.email {
        validate_email(&email)?;
        employee.email = email;
    }
    if let Some(phone) = request.phone {
        employee.phone = phone;
    }
    if let Some(specialization) = request.specialization {
        employee.specialization = specialization;
    }
    if let Some(service_ids) = request.service_ids {
        validate_service_refs(repos, &service_ids).await?;
        employee.service_ids = service_ids;
    }
    if let Some(working_hours) = request.working_hours {
        employee.working_hours = working_hours;
    }
    if let Some(is_active) = request.is_active {
        employee.is_active = is_active;
    }
    employee.updated_at = Utc::now();

    Ok(repos.employees.update_employee(employee).await?)
}

/// Soft deactivation; the employee drops out of auto-selection immediately.
pub async fn deactivate_employee(
    repos: &Repositories,
    actor: &Actor,
    id: &str,
) -> Result<Employee, CatalogError> {
    require_admin(actor)?;
    let mut employee = get_employee(repos, id).await?;
    employee.is_active = false;
    employee.updated_at = Utc::now();
    Ok(repos.employees.update_employee(employee).await?)
}

/// Replaces an employee's qualification set wholesale.
pub async fn assign_services(
    repos: &Repositories,
    actor: &Actor,
    id: &str,
    request: AssignServicesRequest,
) -> Result<Employee, CatalogError> {
    require_admin(actor)?;
    validate_service_refs(repos, &request.service_ids).await?;

    let mut employee = get_employee(repos, id).await?;
    employee.service_ids = request.service_ids;
    employee.updated_at = Utc::now();
    Ok(repos.employees.update_employee(employee).await?)
}

/// The bookable slot grid for one employee on one day, derived from the
/// weekly working-hours table at 30-minute granularity. Slots already booked
/// are not subtracted here; the scheduling engine rejects those at booking
/// time.
pub async fn day_availability(
    repos: &Repositories,
    id: &str,
    date: NaiveDate,
) -> Result<DayAvailabilityResponse, CatalogError> {
    let employee = get_employee(repos, id).await?;
    let day = employee.working_hours.for_weekday(date.weekday());

    if !day.is_working {
        return Ok(DayAvailabilityResponse {
            is_working: false,
            working_hours: None,
            available_slots: Vec::new(),
        });
    }

    let mut slots = Vec::new();
    let mut cursor = day.start.as_naive();
    let end = day.end.as_naive();
    while cursor < end {
        if let Some(slot) = TimeOfDay::new(cursor.hour(), cursor.minute()) {
            slots.push(slot);
        }
        // overflowing_add_signed reports a wrap past midnight; stop there.
        match cursor.overflowing_add_signed(Duration::minutes(30)) {
            (next, 0) => cursor = next,
            _ => break,
        }
    }

    Ok(DayAvailabilityResponse {
        is_working: true,
        working_hours: Some(*day),
        available_slots: slots,
    })
}
