//! Repository selection
//!
//! The backend binary calls [`build_repositories`] once at startup; everything
//! downstream only sees the trait objects, so swapping SQLite for the memory
//! store (or vice versa) is a configuration change, not a code change.

use crate::error::DbError;
use crate::memory::MemoryStore;
use crate::repository::{
    AppointmentRepository, ClientRepository, EmployeeRepository, ServiceRepository,
};
use crate::sql::SqlStore;
use bookify_config::{AppConfig, DatabaseBackend};
use std::sync::Arc;
use tracing::info;

/// The full set of stores the application works against.
#[derive(Clone)]
pub struct Repositories {
    pub appointments: Arc<dyn AppointmentRepository>,
    pub services: Arc<dyn ServiceRepository>,
    pub employees: Arc<dyn EmployeeRepository>,
    pub clients: Arc<dyn ClientRepository>,
}

impl Repositories {
    /// Bundle one store that implements every repository trait.
    pub fn from_store<S>(store: S) -> Self
    where
        S: AppointmentRepository
            + ServiceRepository
            + EmployeeRepository
            + ClientRepository
            + Clone
            + 'static,
    {
        Self {
            appointments: Arc::new(store.clone()),
            services: Arc::new(store.clone()),
            employees: Arc::new(store.clone()),
            clients: Arc::new(store),
        }
    }
}

/// Build the repository set for the configured backend.
pub async fn build_repositories(config: &AppConfig) -> Result<Repositories, DbError> {
    match config.database.backend {
        DatabaseBackend::Memory => {
            info!("using in-memory store");
            Ok(Repositories::from_store(MemoryStore::new()))
        }
        DatabaseBackend::Sqlite => {
            info!(url = %config.database.url, "using sqlite store");
            let store = SqlStore::connect(&config.database.url).await?;
            store.init_schema().await?;
            Ok(Repositories::from_store(store))
        }
    }
}
