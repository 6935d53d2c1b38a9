//! In-memory implementation of the Bookify repositories
//!
//! Backs development, demos and tests. All state lives behind a single
//! `RwLock`; appointment writes take the write lock for the whole
//! check-and-insert, which makes the slot-uniqueness constraint atomic the
//! same way the SQLite partial unique index does.

use crate::error::DbError;
use crate::repository::{
    AppointmentFilter, AppointmentRepository, ClientRepository, EmployeeRepository, ServiceBucket,
    ServiceRepository, StatusBucket,
};
use async_trait::async_trait;
use bookify_common::models::{Appointment, Client, Employee, Service, TimeOfDay};
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Debug, Default)]
struct MemoryState {
    appointments: HashMap<String, Appointment>,
    // Vec keeps insertion order; the auto-selector depends on stable
    // creation-order enumeration of employees.
    services: Vec<Service>,
    employees: Vec<Employee>,
    clients: HashMap<String, Client>,
}

impl MemoryState {
    fn slot_taken(
        &self,
        employee_id: &str,
        date: NaiveDate,
        time: TimeOfDay,
        exclude_id: Option<&str>,
    ) -> Option<&Appointment> {
        self.appointments.values().find(|appt| {
            appt.status.blocks_slot()
                && appt.employee_id.as_deref() == Some(employee_id)
                && appt.date == date
                && appt.time == time
                && Some(appt.id.as_str()) != exclude_id
        })
    }
}

/// Process-local store satisfying every repository trait.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn in_range(date: NaiveDate, from: Option<NaiveDate>, to: Option<NaiveDate>) -> bool {
    from.is_none_or(|f| date >= f) && to.is_none_or(|t| date <= t)
}

#[async_trait]
impl AppointmentRepository for MemoryStore {
    async fn find_conflicting(
        &self,
        employee_id: &str,
        date: NaiveDate,
        time: TimeOfDay,
        exclude_id: Option<&str>,
    ) -> Result<Option<Appointment>, DbError> {
        let state = self.state.read().await;
        Ok(state
            .slot_taken(employee_id, date, time, exclude_id)
            .cloned())
    }

    async fn insert(&self, appointment: Appointment) -> Result<Appointment, DbError> {
        let mut state = self.state.write().await;
        if appointment.status.blocks_slot() {
            if let Some(employee_id) = appointment.employee_id.as_deref() {
                if state
                    .slot_taken(employee_id, appointment.date, appointment.time, None)
                    .is_some()
                {
                    return Err(DbError::UniqueViolation(format!(
                        "slot {} {} already booked for employee {}",
                        appointment.date, appointment.time, employee_id
                    )));
                }
            }
        }
        debug!(id = %appointment.id, "inserting appointment");
        state
            .appointments
            .insert(appointment.id.clone(), appointment.clone());
        Ok(appointment)
    }

    async fn update(&self, appointment: Appointment) -> Result<Appointment, DbError> {
        let mut state = self.state.write().await;
        if !state.appointments.contains_key(&appointment.id) {
            return Err(DbError::NotFound(format!(
                "appointment {}",
                appointment.id
            )));
        }
        if appointment.status.blocks_slot() {
            if let Some(employee_id) = appointment.employee_id.as_deref() {
                if state
                    .slot_taken(
                        employee_id,
                        appointment.date,
                        appointment.time,
                        Some(&appointment.id),
                    )
                    .is_some()
                {
                    return Err(DbError::UniqueViolation(format!(
                        "slot {} {} already booked for employee {}",
                        appointment.date, appointment.time, employee_id
                    )));
                }
            }
        }
        state
            .appointments
            .insert(appointment.id.clone(), appointment.clone());
        Ok(appointment)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Appointment>, DbError> {
        let state = self.state.read().await;
        Ok(state.appointments.get(id).cloned())
    }

    async fn list(&self, filter: AppointmentFilter) -> Result<Vec<Appointment>, DbError> {
        let state = self.state.read().await;
        let mut matches: Vec<Appointment> = state
            .appointments
            .values()
            .filter(|appt| {
                filter.status.is_none_or(|s| appt.status == s)
                    && filter.date.is_none_or(|d| appt.date == d)
                    && filter
                        .employee_id
                        .as_deref()
                        .is_none_or(|e| appt.employee_id.as_deref() == Some(e))
                    && filter
                        .client_id
                        .as_deref()
                        .is_none_or(|c| appt.client_id == c)
            })
            .cloned()
            .collect();
        matches.sort_by_key(|appt| (appt.date, appt.time));
        Ok(matches)
    }

    async fn status_breakdown(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<StatusBucket>, DbError> {
        let state = self.state.read().await;
        let mut buckets: HashMap<&'static str, StatusBucket> = HashMap::new();
        for appt in state.appointments.values() {
            if !in_range(appt.date, from, to) {
                continue;
            }
            let bucket = buckets
                .entry(appt.status.as_str())
                .or_insert_with(|| StatusBucket {
                    status: appt.status,
                    count: 0,
                    revenue: 0,
                });
            bucket.count += 1;
            bucket.revenue += appt.total_price;
        }
        let mut result: Vec<StatusBucket> = buckets.into_values().collect();
        result.sort_by_key(|b| b.status.as_str());
        Ok(result)
    }

    async fn service_breakdown(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<ServiceBucket>, DbError> {
        let state = self.state.read().await;
        let mut buckets: HashMap<String, ServiceBucket> = HashMap::new();
        for appt in state.appointments.values() {
            if !in_range(appt.date, from, to) {
                continue;
            }
            let bucket = buckets
                .entry(appt.service_id.clone())
                .or_insert_with(|| ServiceBucket {
                    service_id: appt.service_id.clone(),
                    count: 0,
                    revenue: 0,
                });
            bucket.count += 1;
            bucket.revenue += appt.total_price;
        }
        let mut result: Vec<ServiceBucket> = buckets.into_values().collect();
        result.sort_by(|a, b| b.count.cmp(&a.count));
        Ok(result)
    }
}

#[async_trait]
impl ServiceRepository for MemoryStore {
    async fn find_service(&self, id: &str) -> Result<Option<Service>, DbError> {
        let state = self.state.read().await;
        Ok(state.services.iter().find(|s| s.id == id).cloned())
    }

    async fn find_active_service(&self, id: &str) -> Result<Option<Service>, DbError> {
        let state = self.state.read().await;
        Ok(state
            .services
            .iter()
            .find(|s| s.id == id && s.is_active)
            .cloned())
    }

    async fn list_services(&self, only_active: bool) -> Result<Vec<Service>, DbError> {
        let state = self.state.read().await;
        Ok(state
            .services
            .iter()
            .filter(|s| !only_active || s.is_active)
            .cloned()
            .collect())
    }

    async fn insert_service(&self, service: Service) -> Result<Service, DbError> {
        let mut state = self.state.write().await;
        state.services.push(service.clone());
        Ok(service)
    }

    async fn update_service(&self, service: Service) -> Result<Service, DbError> {
        let mut state = self.state.write().await;
        match state.services.iter_mut().find(|s| s.id == service.id) {
            Some(slot) => {
                *slot = service.clone();
                Ok(service)
            }
            None => Err(DbError::NotFound(format!("service {}", service.id))),
        }
    }
}

#[async_trait]
impl EmployeeRepository for MemoryStore {
    async fn find_employee(&self, id: &str) -> Result<Option<Employee>, DbError> {
        let state = self.state.read().await;
        Ok(state.employees.iter().find(|e| e.id == id).cloned())
    }

    async fn find_active_employee(&self, id: &str) -> Result<Option<Employee>, DbError> {
        let state = self.state.read().await;
        Ok(state
            .employees
            .iter()
            .find(|e| e.id == id && e.is_active)
            .cloned())
    }

    async fn list_active_for_service(&self, service_id: &str) -> Result<Vec<Employee>, DbError> {
        let state = self.state.read().await;
        Ok(state
            .employees
            .iter()
            .filter(|e| e.is_active && e.is_qualified_for(service_id))
            .cloned()
            .collect())
    }

    async fn list_employees(&self, only_active: bool) -> Result<Vec<Employee>, DbError> {
        let state = self.state.read().await;
        Ok(state
            .employees
            .iter()
            .filter(|e| !only_active || e.is_active)
            .cloned()
            .collect())
    }

    async fn insert_employee(&self, employee: Employee) -> Result<Employee, DbError> {
        let mut state = self.state.write().await;
        state.employees.push(employee.clone());
        Ok(employee)
    }

    async fn update_employee(&self, employee: Employee) -> Result<Employee, DbError> {
        let mut state = self.state.write().await;
        match state.employees.iter_mut().find(|e| e.id == employee.id) {
            Some(slot) => {
                *slot = employee.clone();
                Ok(employee)
            }
            None => Err(DbError::NotFound(format!("employee {}", employee.id))),
        }
    }
}

#[async_trait]
impl ClientRepository for MemoryStore {
    async fn find_client(&self, id: &str) -> Result<Option<Client>, DbError> {
        let state = self.state.read().await;
        Ok(state.clients.get(id).cloned())
    }

    async fn insert_client(&self, client: Client) -> Result<Client, DbError> {
        let mut state = self.state.write().await;
        state.clients.insert(client.id.clone(), client.clone());
        Ok(client)
    }

    async fn append_appointment(
        &self,
        client_id: &str,
        appointment_id: &str,
    ) -> Result<(), DbError> {
        let mut state = self.state.write().await;
        match state.clients.get_mut(client_id) {
            Some(client) => {
                client.appointment_history.push(appointment_id.to_string());
                Ok(())
            }
            None => Err(DbError::NotFound(format!("client {client_id}"))),
        }
    }
}
