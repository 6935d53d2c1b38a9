// --- File: crates/services/bookify_backend/src/seed.rs ---
//! Demo seed data, enabled via `booking.demo_seed`.
//!
//! Gives a fresh process a small catalog so bookings can be exercised
//! immediately. Skipped when the store already holds services, so restarting
//! against a persistent database does not duplicate anything.

use bookify_common::models::{
    Client, Employee, Service, ServiceCategory, WeeklyHours,
};
use bookify_db::{ClientRepository, DbError, EmployeeRepository, Repositories, ServiceRepository};
use chrono::{NaiveDate, Utc};
use tracing::info;

fn service(id: &str, name: &str, duration_minutes: u32, price: i64, category: ServiceCategory) -> Service {
    let now = Utc::now();
    Service {
        id: id.to_string(),
        name: name.to_string(),
        description: format!("{name} (demo)"),
        duration_minutes,
        price,
        category,
        is_active: true,
        created_at: now,
        updated_at: now,
    }
}

fn employee(id: &str, name: &str, specialization: &str, service_ids: &[&str]) -> Employee {
    let now = Utc::now();
    Employee {
        id: id.to_string(),
        name: name.to_string(),
        email: format!("{id}@bookify.example"),
        phone: "555-0100".to_string(),
        specialization: specialization.to_string(),
        service_ids: service_ids.iter().map(|s| s.to_string()).collect(),
        working_hours: WeeklyHours::default(),
        is_active: true,
        hire_date: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap_or_else(|| now.date_naive()),
        created_at: now,
        updated_at: now,
    }
}

pub async fn seed_demo_data(repos: &Repositories) -> Result<(), DbError> {
    if !repos.services.list_services(false).await?.is_empty() {
        info!("catalog already populated, demo seed skipped");
        return Ok(());
    }

    for s in [
        service("svc-haircut", "Haircut", 30, 2500, ServiceCategory::Haircut),
        service("svc-coloring", "Coloring", 90, 6500, ServiceCategory::Coloring),
        service("svc-manicure", "Manicure", 45, 2000, ServiceCategory::Manicure),
        service("svc-massage", "Relaxing Massage", 60, 5000, ServiceCategory::Massage),
    ] {
        repos.services.insert_service(s).await?;
    }

    for e in [
        employee("emp-juan", "Juan", "stylist", &["svc-haircut", "svc-coloring"]),
        employee("emp-maria", "Maria", "stylist", &["svc-haircut"]),
        employee("emp-lucia", "Lucia", "nails and massage", &["svc-manicure", "svc-massage"]),
    ] {
        repos.employees.insert_employee(e).await?;
    }

    let now = Utc::now();
    repos
        .clients
        .insert_client(Client {
            id: "client-demo".to_string(),
            name: "Demo Client".to_string(),
            email: "demo@bookify.example".to_string(),
            phone: "555-0199".to_string(),
            appointment_history: Vec::new(),
            created_at: now,
        })
        .await?;

    info!("demo catalog seeded");
    Ok(())
}
