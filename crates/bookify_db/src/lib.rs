//! Storage for Bookify.
//!
//! This crate defines the repository traits the scheduling engine depends on
//! and ships two interchangeable implementations: an in-memory store for
//! development and tests, and a SQLite store (via sqlx) for persistence. The
//! backend is selected once at process start through [`build_repositories`].
//!
//! Both implementations enforce the core booking invariant themselves: at
//! most one appointment with status pending or confirmed may exist per
//! (employee, date, time) triple. The application-level availability check
//! gives a friendly error message; the store-level constraint is the actual
//! correctness guarantee under concurrent writes.

pub mod error;
pub mod factory;
pub mod memory;
pub mod repository;
pub mod sql;

pub use error::DbError;
pub use factory::{build_repositories, Repositories};
pub use memory::MemoryStore;
pub use repository::{
    AppointmentFilter, AppointmentRepository, ClientRepository, EmployeeRepository,
    ServiceBucket, ServiceRepository, StatusBucket,
};
pub use sql::SqlStore;
