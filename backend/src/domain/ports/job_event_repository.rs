//! Port abstraction for toll, fine and transport records.
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{FineReport, TollReport, TransportReport, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by job event adapters.
    pub enum JobEventPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "job event repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "job event repository query failed: {message}",
    }
}

/// Append-only store for events attached to a job.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait JobEventRepository: Send + Sync {
    /// Insert a toll and return its id.
    async fn insert_toll(
        &self,
        toll: &TollReport,
        user_id: UserId,
        recorded_at: DateTime<Utc>,
    ) -> Result<i64, JobEventPersistenceError>;

    /// Insert a penalty and return its id.
    async fn insert_penalty(
        &self,
        fine: &FineReport,
        user_id: UserId,
        recorded_at: DateTime<Utc>,
    ) -> Result<i64, JobEventPersistenceError>;

    /// Insert a ferry or train crossing and return its id.
    async fn insert_transport(
        &self,
        transport: &TransportReport,
        recorded_at: DateTime<Utc>,
    ) -> Result<i64, JobEventPersistenceError>;
}
