//! Shared building blocks for the Bookify workspace.
//!
//! This crate holds the pieces every other crate needs: the domain models
//! (appointments, services, employees, clients), the actor/role types used
//! for authorization, the `HttpStatusCode` trait for mapping errors at the
//! HTTP boundary, and tracing initialization.

pub mod auth;
pub mod error;
pub mod logging;
pub mod models;

pub use auth::{Actor, Role};
pub use error::HttpStatusCode;
