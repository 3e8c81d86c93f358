//! Port abstraction for VTC persistence.
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{Membership, NewVtc, UserId, VtcDetail, VtcId, VtcSummary};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by VTC adapters.
    pub enum VtcPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "vtc repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "vtc repository query failed: {message}",
        /// Another VTC already uses the tag.
        DuplicateTag { tag: String } => "vtc tag already taken: {tag}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VtcRepository: Send + Sync {
    /// Insert the VTC and its owner membership in one transaction.
    async fn create(
        &self,
        vtc: &NewVtc,
        created_at: DateTime<Utc>,
    ) -> Result<VtcId, VtcPersistenceError>;

    /// Active VTCs, newest first.
    async fn list_active(&self) -> Result<Vec<VtcSummary>, VtcPersistenceError>;

    /// An active VTC with its active members.
    async fn find_detail(&self, id: VtcId) -> Result<Option<VtcDetail>, VtcPersistenceError>;

    /// The user's membership row, current or former.
    async fn membership(
        &self,
        vtc_id: VtcId,
        user_id: UserId,
    ) -> Result<Option<Membership>, VtcPersistenceError>;

    /// Insert an active `member` row or reactivate a former one.
    async fn join(
        &self,
        vtc_id: VtcId,
        user_id: UserId,
        joined_at: DateTime<Utc>,
    ) -> Result<(), VtcPersistenceError>;

    /// Mark the membership inactive.
    async fn leave(
        &self,
        vtc_id: VtcId,
        user_id: UserId,
        left_at: DateTime<Utc>,
    ) -> Result<(), VtcPersistenceError>;
}
