// --- File: crates/bookify_catalog/src/lib.rs ---
//! Catalog management: the services on offer and the staff performing them.
//!
//! Reads are open to any authenticated actor; every mutation is admin-only.
//! Records are soft-deactivated rather than deleted so historical
//! appointments keep resolving their service and employee.

pub mod handlers;
pub mod logic;
#[cfg(test)]
mod logic_test;
pub mod routes;
