//! SQLite implementation of the Bookify repositories
//!
//! Dates are stored as `YYYY-MM-DD` text and times as `HH:MM` text, both
//! produced by the domain types' canonical formatting, so equality in SQL is
//! equality of slots. The slot-uniqueness invariant is a partial unique
//! index over (employee_id, date, time) restricted to pending/confirmed
//! rows; a violated insert surfaces as [`DbError::UniqueViolation`].

use crate::error::DbError;
use crate::repository::{
    AppointmentFilter, AppointmentRepository, ClientRepository, EmployeeRepository, ServiceBucket,
    ServiceRepository, StatusBucket,
};
use async_trait::async_trait;
use bookify_common::models::{
    Appointment, AppointmentStatus, Client, Employee, PaymentStatus, Service, ServiceCategory,
    TimeOfDay, WeeklyHours,
};
use bookify_common::Role;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};
use std::str::FromStr;
use tracing::{debug, info};

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS appointments (
        id TEXT PRIMARY KEY,
        client_id TEXT NOT NULL,
        service_id TEXT NOT NULL,
        employee_id TEXT,
        date TEXT NOT NULL,
        time TEXT NOT NULL,
        status TEXT NOT NULL,
        notes TEXT,
        total_price INTEGER NOT NULL,
        payment_status TEXT NOT NULL,
        created_by TEXT NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    "#,
    // The storage-level half of the double-booking defense. Only rows that
    // actually occupy a slot participate.
    r#"
    CREATE UNIQUE INDEX IF NOT EXISTS idx_appointments_slot
        ON appointments (employee_id, date, time)
        WHERE status IN ('pending', 'confirmed') AND employee_id IS NOT NULL
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS services (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        description TEXT NOT NULL,
        duration_minutes INTEGER NOT NULL,
        price INTEGER NOT NULL,
        category TEXT NOT NULL,
        is_active INTEGER NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS employees (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        email TEXT NOT NULL UNIQUE,
        phone TEXT NOT NULL,
        specialization TEXT NOT NULL,
        service_ids TEXT NOT NULL,
        working_hours TEXT NOT NULL,
        is_active INTEGER NOT NULL,
        hire_date TEXT NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS clients (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        email TEXT NOT NULL,
        phone TEXT NOT NULL,
        appointment_history TEXT NOT NULL,
        created_at TEXT NOT NULL
    )
    "#,
];

/// SQLite-backed store satisfying every repository trait.
#[derive(Debug, Clone)]
pub struct SqlStore {
    pool: SqlitePool,
}

impl SqlStore {
    /// Connect to the database at `url`, creating the file if needed.
    pub async fn connect(url: &str) -> Result<Self, DbError> {
        if url.is_empty() {
            return Err(DbError::Config("database URL is empty".to_string()));
        }
        debug!("connecting to {}", url);
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;
        Ok(Self { pool })
    }

    /// Create tables and the slot-uniqueness index if they do not exist yet.
    pub async fn init_schema(&self) -> Result<(), DbError> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        info!("database schema initialized");
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn write_error(e: sqlx::Error) -> DbError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            DbError::UniqueViolation(db.message().to_string())
        }
        _ => DbError::Sqlx(e),
    }
}

fn parse_date(s: &str) -> Result<NaiveDate, DbError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| DbError::Decode(format!("date '{s}': {e}")))
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, DbError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DbError::Decode(format!("timestamp '{s}': {e}")))
}

fn parse_time(s: &str) -> Result<TimeOfDay, DbError> {
    s.parse()
        .map_err(|e| DbError::Decode(format!("time '{s}': {e}")))
}

fn decode<T: FromStr>(s: &str, what: &str) -> Result<T, DbError>
where
    T::Err: std::fmt::Display,
{
    s.parse()
        .map_err(|e| DbError::Decode(format!("{what} '{s}': {e}")))
}

fn decode_json<T: serde::de::DeserializeOwned>(s: &str, what: &str) -> Result<T, DbError> {
    serde_json::from_str(s).map_err(|e| DbError::Decode(format!("{what}: {e}")))
}

fn encode_json<T: serde::Serialize>(value: &T, what: &str) -> Result<String, DbError> {
    serde_json::to_string(value).map_err(|e| DbError::Decode(format!("{what}: {e}")))
}

fn count_u64(count: i64) -> u64 {
    u64::try_from(count).unwrap_or_default()
}

fn appointment_from_row(row: &SqliteRow) -> Result<Appointment, DbError> {
    let status: String = row.try_get("status")?;
    let payment_status: String = row.try_get("payment_status")?;
    let created_by: String = row.try_get("created_by")?;
    let date: String = row.try_get("date")?;
    let time: String = row.try_get("time")?;
    let created_at: String = row.try_get("created_at")?;
    let updated_at: String = row.try_get("updated_at")?;
    Ok(Appointment {
        id: row.try_get("id")?,
        client_id: row.try_get("client_id")?,
        service_id: row.try_get("service_id")?,
        employee_id: row.try_get("employee_id")?,
        date: parse_date(&date)?,
        time: parse_time(&time)?,
        status: decode::<AppointmentStatus>(&status, "status")?,
        notes: row.try_get("notes")?,
        total_price: row.try_get("total_price")?,
        payment_status: decode::<PaymentStatus>(&payment_status, "payment status")?,
        created_by: decode::<Role>(&created_by, "created_by")?,
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
    })
}

fn service_from_row(row: &SqliteRow) -> Result<Service, DbError> {
    let category: String = row.try_get("category")?;
    let duration: i64 = row.try_get("duration_minutes")?;
    let created_at: String = row.try_get("created_at")?;
    let updated_at: String = row.try_get("updated_at")?;
    Ok(Service {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        duration_minutes: u32::try_from(duration)
            .map_err(|_| DbError::Decode(format!("duration '{duration}' out of range")))?,
        price: row.try_get("price")?,
        category: decode::<ServiceCategory>(&category, "category")?,
        is_active: row.try_get("is_active")?,
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
    })
}

fn employee_from_row(row: &SqliteRow) -> Result<Employee, DbError> {
    let service_ids: String = row.try_get("service_ids")?;
    let working_hours: String = row.try_get("working_hours")?;
    let hire_date: String = row.try_get("hire_date")?;
    let created_at: String = row.try_get("created_at")?;
    let updated_at: String = row.try_get("updated_at")?;
    Ok(Employee {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        phone: row.try_get("phone")?,
        specialization: row.try_get("specialization")?,
        service_ids: decode_json::<Vec<String>>(&service_ids, "service_ids")?,
        working_hours: decode_json::<WeeklyHours>(&working_hours, "working_hours")?,
        is_active: row.try_get("is_active")?,
        hire_date: parse_date(&hire_date)?,
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
    })
}

fn client_from_row(row: &SqliteRow) -> Result<Client, DbError> {
    let history: String = row.try_get("appointment_history")?;
    let created_at: String = row.try_get("created_at")?;
    Ok(Client {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        phone: row.try_get("phone")?,
        appointment_history: decode_json::<Vec<String>>(&history, "appointment_history")?,
        created_at: parse_timestamp(&created_at)?,
    })
}

#[async_trait]
impl AppointmentRepository for SqlStore {
    async fn find_conflicting(
        &self,
        employee_id: &str,
        date: NaiveDate,
        time: TimeOfDay,
        exclude_id: Option<&str>,
    ) -> Result<Option<Appointment>, DbError> {
        let mut qb = QueryBuilder::<Sqlite>::new(
            "SELECT * FROM appointments WHERE employee_id = ",
        );
        qb.push_bind(employee_id);
        qb.push(" AND date = ").push_bind(date.to_string());
        qb.push(" AND time = ").push_bind(time.to_string());
        qb.push(" AND status IN ('pending', 'confirmed')");
        if let Some(exclude) = exclude_id {
            qb.push(" AND id != ").push_bind(exclude);
        }
        let row = qb.build().fetch_optional(&self.pool).await?;
        row.as_ref().map(appointment_from_row).transpose()
    }

    async fn insert(&self, appointment: Appointment) -> Result<Appointment, DbError> {
        sqlx::query(
            r#"
            INSERT INTO appointments
                (id, client_id, service_id, employee_id, date, time, status,
                 notes, total_price, payment_status, created_by, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&appointment.id)
        .bind(&appointment.client_id)
        .bind(&appointment.service_id)
        .bind(&appointment.employee_id)
        .bind(appointment.date.to_string())
        .bind(appointment.time.to_string())
        .bind(appointment.status.as_str())
        .bind(&appointment.notes)
        .bind(appointment.total_price)
        .bind(appointment.payment_status.as_str())
        .bind(appointment.created_by.as_str())
        .bind(appointment.created_at.to_rfc3339())
        .bind(appointment.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(write_error)?;
        Ok(appointment)
    }

    async fn update(&self, appointment: Appointment) -> Result<Appointment, DbError> {
        let result = sqlx::query(
            r#"
            UPDATE appointments SET
                client_id = ?, service_id = ?, employee_id = ?, date = ?, time = ?,
                status = ?, notes = ?, total_price = ?, payment_status = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&appointment.client_id)
        .bind(&appointment.service_id)
        .bind(&appointment.employee_id)
        .bind(appointment.date.to_string())
        .bind(appointment.time.to_string())
        .bind(appointment.status.as_str())
        .bind(&appointment.notes)
        .bind(appointment.total_price)
        .bind(appointment.payment_status.as_str())
        .bind(appointment.updated_at.to_rfc3339())
        .bind(&appointment.id)
        .execute(&self.pool)
        .await
        .map_err(write_error)?;
        if result.rows_affected() == 0 {
            return Err(DbError::NotFound(format!(
                "appointment {}",
                appointment.id
            )));
        }
        Ok(appointment)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Appointment>, DbError> {
        let row = sqlx::query("SELECT * FROM appointments WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(appointment_from_row).transpose()
    }

    async fn list(&self, filter: AppointmentFilter) -> Result<Vec<Appointment>, DbError> {
        let mut qb = QueryBuilder::<Sqlite>::new("SELECT * FROM appointments WHERE 1 = 1");
        if let Some(status) = filter.status {
            qb.push(" AND status = ").push_bind(status.as_str());
        }
        if let Some(date) = filter.date {
            qb.push(" AND date = ").push_bind(date.to_string());
        }
        if let Some(employee_id) = filter.employee_id {
            qb.push(" AND employee_id = ").push_bind(employee_id);
        }
        if let Some(client_id) = filter.client_id {
            qb.push(" AND client_id = ").push_bind(client_id);
        }
        qb.push(" ORDER BY date, time");
        let rows = qb.build().fetch_all(&self.pool).await?;
        rows.iter().map(appointment_from_row).collect()
    }

    async fn status_breakdown(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<StatusBucket>, DbError> {
        let mut qb = QueryBuilder::<Sqlite>::new(
            "SELECT status, COUNT(*) AS count, COALESCE(SUM(total_price), 0) AS revenue \
             FROM appointments WHERE 1 = 1",
        );
        if let Some(from) = from {
            qb.push(" AND date >= ").push_bind(from.to_string());
        }
        if let Some(to) = to {
            qb.push(" AND date <= ").push_bind(to.to_string());
        }
        qb.push(" GROUP BY status ORDER BY status");
        let rows = qb.build().fetch_all(&self.pool).await?;
        rows.iter()
            .map(|row| {
                let status: String = row.try_get("status")?;
                let count: i64 = row.try_get("count")?;
                let revenue: i64 = row.try_get("revenue")?;
                Ok(StatusBucket {
                    status: decode::<AppointmentStatus>(&status, "status")?,
                    count: count_u64(count),
                    revenue,
                })
            })
            .collect()
    }

    async fn service_breakdown(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<ServiceBucket>, DbError> {
        let mut qb = QueryBuilder::<Sqlite>::new(
            "SELECT service_id, COUNT(*) AS count, COALESCE(SUM(total_price), 0) AS revenue \
             FROM appointments WHERE 1 = 1",
        );
        if let Some(from) = from {
            qb.push(" AND date >= ").push_bind(from.to_string());
        }
        if let Some(to) = to {
            qb.push(" AND date <= ").push_bind(to.to_string());
        }
        qb.push(" GROUP BY service_id ORDER BY count DESC");
        let rows = qb.build().fetch_all(&self.pool).await?;
        rows.iter()
            .map(|row| {
                let count: i64 = row.try_get("count")?;
                Ok(ServiceBucket {
                    service_id: row.try_get("service_id")?,
                    count: count_u64(count),
                    revenue: row.try_get("revenue")?,
                })
            })
            .collect()
    }
}

#[async_trait]
impl ServiceRepository for SqlStore {
    async fn find_service(&self, id: &str) -> Result<Option<Service>, DbError> {
        let row = sqlx::query("SELECT * FROM services WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(service_from_row).transpose()
    }

    async fn find_active_service(&self, id: &str) -> Result<Option<Service>, DbError> {
        let row = sqlx::query("SELECT * FROM services WHERE id = ? AND is_active = 1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(service_from_row).transpose()
    }

    async fn list_services(&self, only_active: bool) -> Result<Vec<Service>, DbError> {
        let sql = if only_active {
            "SELECT * FROM services WHERE is_active = 1 ORDER BY created_at"
        } else {
            "SELECT * FROM services ORDER BY created_at"
        };
        let rows = sqlx::query(sql).fetch_all(&self.pool).await?;
        rows.iter().map(service_from_row).collect()
    }

    async fn insert_service(&self, service: Service) -> Result<Service, DbError> {
        sqlx::query(
            r#"
            INSERT INTO services
                (id, name, description, duration_minutes, price, category,
                 is_active, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&service.id)
        .bind(&service.name)
        .bind(&service.description)
        .bind(i64::from(service.duration_minutes))
        .bind(service.price)
        .bind(service.category.as_str())
        .bind(service.is_active)
        .bind(service.created_at.to_rfc3339())
        .bind(service.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(write_error)?;
        Ok(service)
    }

    async fn update_service(&self, service: Service) -> Result<Service, DbError> {
        let result = sqlx::query(
            r#"
            UPDATE services SET
                name = ?, description = ?, duration_minutes = ?, price = ?,
                category = ?, is_active = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&service.name)
        .bind(&service.description)
        .bind(i64::from(service.duration_minutes))
        .bind(service.price)
        .bind(service.category.as_str())
        .bind(service.is_active)
        .bind(service.updated_at.to_rfc3339())
        .bind(&service.id)
        .execute(&self.pool)
        .await
        .map_err(write_error)?;
        if result.rows_affected() == 0 {
            return Err(DbError::NotFound(format!("service {}", service.id)));
        }
        Ok(service)
    }
}

#[async_trait]
impl EmployeeRepository for SqlStore {
    async fn find_employee(&self, id: &str) -> Result<Option<Employee>, DbError> {
        let row = sqlx::query("SELECT * FROM employees WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(employee_from_row).transpose()
    }

    async fn find_active_employee(&self, id: &str) -> Result<Option<Employee>, DbError> {
        let row = sqlx::query("SELECT * FROM employees WHERE id = ? AND is_active = 1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(employee_from_row).transpose()
    }

    async fn list_active_for_service(&self, service_id: &str) -> Result<Vec<Employee>, DbError> {
        // Qualifications are stored as a JSON array; filter after fetch.
        // Creation order keeps the auto-selector's enumeration stable.
        let rows =
            sqlx::query("SELECT * FROM employees WHERE is_active = 1 ORDER BY created_at")
                .fetch_all(&self.pool)
                .await?;
        let employees: Result<Vec<Employee>, DbError> =
            rows.iter().map(employee_from_row).collect();
        Ok(employees?
            .into_iter()
            .filter(|e| e.is_qualified_for(service_id))
            .collect())
    }

    async fn list_employees(&self, only_active: bool) -> Result<Vec<Employee>, DbError> {
        let sql = if only_active {
            "SELECT * FROM employees WHERE is_active = 1 ORDER BY created_at"
        } else {
            "SELECT * FROM employees ORDER BY created_at"
        };
        let rows = sqlx::query(sql).fetch_all(&self.pool).await?;
        rows.iter().map(employee_from_row).collect()
    }

    async fn insert_employee(&self, employee: Employee) -> Result<Employee, DbError> {
        sqlx::query(
            r#"
            INSERT INTO employees
                (id, name, email, phone, specialization, service_ids,
                 working_hours, is_active, hire_date, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&employee.id)
        .bind(&employee.name)
        .bind(&employee.email)
        .bind(&employee.phone)
        .bind(&employee.specialization)
        .bind(encode_json(&employee.service_ids, "service_ids")?)
        .bind(encode_json(&employee.working_hours, "working_hours")?)
        .bind(employee.is_active)
        .bind(employee.hire_date.to_string())
        .bind(employee.created_at.to_rfc3339())
        .bind(employee.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(write_error)?;
        Ok(employee)
    }

    async fn update_employee(&self, employee: Employee) -> Result<Employee, DbError> {
        let result = sqlx::query(
            r#"
            UPDATE employees SET
                name = ?, email = ?, phone = ?, specialization = ?, service_ids = ?,
                working_hours = ?, is_active = ?, hire_date = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&employee.name)
        .bind(&employee.email)
        .bind(&employee.phone)
        .bind(&employee.specialization)
        .bind(encode_json(&employee.service_ids, "service_ids")?)
        .bind(encode_json(&employee.working_hours, "working_hours")?)
        .bind(employee.is_active)
        .bind(employee.hire_date.to_string())
        .bind(employee.updated_at.to_rfc3339())
        .bind(&employee.id)
        .execute(&self.pool)
        .await
        .map_err(write_error)?;
        if result.rows_affected() == 0 {
            return Err(DbError::NotFound(format!("employee {}", employee.id)));
        }
        Ok(employee)
    }
}

#[async_trait]
impl ClientRepository for SqlStore {
    async fn find_client(&self, id: &str) -> Result<Option<Client>, DbError> {
        let row = sqlx::query("SELECT * FROM clients WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(client_from_row).transpose()
    }

    async fn insert_client(&self, client: Client) -> Result<Client, DbError> {
        sqlx::query(
            r#"
            INSERT INTO clients (id, name, email, phone, appointment_history, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&client.id)
        .bind(&client.name)
        .bind(&client.email)
        .bind(&client.phone)
        .bind(encode_json(&client.appointment_history, "appointment_history")?)
        .bind(client.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(write_error)?;
        Ok(client)
    }

    async fn append_appointment(
        &self,
        client_id: &str,
        appointment_id: &str,
    ) -> Result<(), DbError> {
        let row = sqlx::query("SELECT appointment_history FROM clients WHERE id = ?")
            .bind(client_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::NotFound(format!("client {client_id}")))?;
        let history: String = row.try_get("appointment_history")?;
        let mut history: Vec<String> = decode_json(&history, "appointment_history")?;
        history.push(appointment_id.to_string());
        sqlx::query("UPDATE clients SET appointment_history = ? WHERE id = ?")
            .bind(encode_json(&history, "appointment_history")?)
            .bind(client_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
