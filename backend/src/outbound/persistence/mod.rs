//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! This module provides concrete implementations of domain repository ports
//! backed by PostgreSQL via the Diesel ORM with async support through
//! `diesel-async` and `bb8` connection pooling.
//!
//! # Architecture
//!
//! - **Thin adapters**: Repository implementations only translate between
//!   Diesel models and domain types. Ownership checks, validation and
//!   notification fan-out live in the domain services.
//! - **Internal models**: Diesel row structs (`models.rs`) and schema
//!   definitions (`schema.rs`) are internal implementation details, never
//!   exposed to the domain layer.
//! - **Transactions**: the site reset, VTC creation, profile updates,
//!   account deletion and install-token claims each run in one transaction.
//! - **Strongly typed errors**: All database errors are mapped to domain
//!   persistence error types with stable messages.
//!
//! # Example
//!
//! ```ignore
//! use mytrucktracker::outbound::persistence::{DbPool, DieselJobRepository, PoolConfig};
//!
//! let config = PoolConfig::new("postgres://localhost/tracker");
//! let pool = DbPool::new(config).await?;
//! let jobs = DieselJobRepository::new(pool);
//! ```

pub(crate) mod diesel_helpers;
mod diesel_install_token_repository;
mod diesel_job_event_repository;
mod diesel_job_repository;
mod diesel_reports_query;
mod diesel_site_repository;
mod diesel_user_repository;
mod diesel_vtc_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_install_token_repository::DieselInstallTokenRepository;
pub use diesel_job_event_repository::DieselJobEventRepository;
pub use diesel_job_repository::DieselJobRepository;
pub use diesel_reports_query::DieselReportsQuery;
pub use diesel_site_repository::DieselSiteRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use diesel_vtc_repository::DieselVtcRepository;
pub use migrations::{MigrationError, run_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
