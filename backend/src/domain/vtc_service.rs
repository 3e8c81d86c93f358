//! VTC service: founding, listing, joining and leaving companies.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

use crate::domain::ports::{VtcCommand, VtcPage, VtcPersistenceError, VtcRepository};
use crate::domain::{Error, MemberStatus, NewVtc, UserId, VtcId, VtcRole, VtcSummary};

/// Service implementing [`VtcCommand`].
#[derive(Clone)]
pub struct VtcService<R> {
    vtcs: Arc<R>,
    clock: Arc<dyn Clock>,
}

impl<R> VtcService<R> {
    /// Create a new service.
    pub fn new(vtcs: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self { vtcs, clock }
    }
}

fn map_vtc_error(error: VtcPersistenceError) -> Error {
    match error {
        VtcPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("vtc repository unavailable: {message}"))
        }
        VtcPersistenceError::Query { message } => {
            Error::internal(format!("vtc repository error: {message}"))
        }
        VtcPersistenceError::DuplicateTag { .. } => Error::conflict("Tag already in use."),
    }
}

impl<R> VtcService<R>
where
    R: VtcRepository,
{
    async fn require_vtc(&self, id: VtcId) -> Result<(), Error> {
        self.vtcs
            .find_detail(id)
            .await
            .map_err(map_vtc_error)?
            .map(|_| ())
            .ok_or_else(|| Error::not_found("VTC not found."))
    }
}

#[async_trait]
impl<R> VtcCommand for VtcService<R>
where
    R: VtcRepository,
{
    async fn create(&self, vtc: NewVtc) -> Result<VtcId, Error> {
        let id = self
            .vtcs
            .create(&vtc, self.clock.utc())
            .await
            .map_err(map_vtc_error)?;
        info!(vtc_id = %id, owner = %vtc.owner, tag = vtc.tag.as_str(), "vtc created");
        Ok(id)
    }

    async fn list(&self) -> Result<Vec<VtcSummary>, Error> {
        self.vtcs.list_active().await.map_err(map_vtc_error)
    }

    async fn view(&self, id: VtcId, viewer: Option<UserId>) -> Result<VtcPage, Error> {
        let detail = self
            .vtcs
            .find_detail(id)
            .await
            .map_err(map_vtc_error)?
            .ok_or_else(|| Error::not_found("VTC not found."))?;
        let membership = match viewer {
            Some(user) => self
                .vtcs
                .membership(id, user)
                .await
                .map_err(map_vtc_error)?,
            None => None,
        };
        Ok(VtcPage::new(detail, membership))
    }

    async fn join(&self, id: VtcId, user: UserId) -> Result<(), Error> {
        self.require_vtc(id).await?;
        let current = self
            .vtcs
            .membership(id, user)
            .await
            .map_err(map_vtc_error)?;
        if current.is_some_and(|m| m.status == MemberStatus::Active) {
            return Ok(());
        }
        self.vtcs
            .join(id, user, self.clock.utc())
            .await
            .map_err(map_vtc_error)?;
        info!(vtc_id = %id, user_id = %user, "vtc joined");
        Ok(())
    }

    async fn leave(&self, id: VtcId, user: UserId) -> Result<(), Error> {
        let current = self
            .vtcs
            .membership(id, user)
            .await
            .map_err(map_vtc_error)?
            .filter(|m| m.status == MemberStatus::Active)
            .ok_or_else(|| Error::not_found("You are not a member of this VTC."))?;
        if current.role == VtcRole::Owner {
            return Err(Error::conflict("The owner cannot leave the VTC."));
        }
        self.vtcs
            .leave(id, user, self.clock.utc())
            .await
            .map_err(map_vtc_error)?;
        info!(vtc_id = %id, user_id = %user, "vtc left");
        Ok(())
    }
}
