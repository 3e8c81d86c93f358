//! Driving port for VTC pages.

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::{
    Error, MemberStatus, Membership, NewVtc, UserId, VtcDetail, VtcId, VtcRole, VtcSummary,
};

/// VTC page content with the viewer's own membership.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VtcPage {
    /// Company and members.
    #[serde(flatten)]
    pub detail: VtcDetail,
    /// Viewer's current membership, when signed in and active.
    pub viewer_role: Option<VtcRole>,
}

impl VtcPage {
    /// Combine a detail with the viewer's membership row.
    #[must_use]
    pub fn new(detail: VtcDetail, membership: Option<Membership>) -> Self {
        let viewer_role = membership
            .filter(|m| m.status == MemberStatus::Active)
            .map(|m| m.role);
        Self {
            detail,
            viewer_role,
        }
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VtcCommand: Send + Sync {
    /// Found a VTC with its owner as first member.
    async fn create(&self, vtc: NewVtc) -> Result<VtcId, Error>;

    /// Active VTCs, newest first.
    async fn list(&self) -> Result<Vec<VtcSummary>, Error>;

    /// VTC page for an optional viewer.
    async fn view(&self, id: VtcId, viewer: Option<UserId>) -> Result<VtcPage, Error>;

    /// Join or rejoin as a member.
    async fn join(&self, id: VtcId, user: UserId) -> Result<(), Error>;

    /// Leave; owners cannot.
    async fn leave(&self, id: VtcId, user: UserId) -> Result<(), Error>;
}
