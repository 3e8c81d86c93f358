//! Admin settings service.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::domain::ports::{AdminSettings, SiteAdminCommand, SitePersistenceError, SiteRepository};
use crate::domain::{Error, ResetConfirmation, ResetReport};

/// Service implementing [`SiteAdminCommand`].
#[derive(Clone)]
pub struct SiteAdminService<S> {
    site: Arc<S>,
}

impl<S> SiteAdminService<S> {
    /// Create a new service.
    pub fn new(site: Arc<S>) -> Self {
        Self { site }
    }
}

fn map_site_error(error: SitePersistenceError) -> Error {
    match error {
        SitePersistenceError::Connection { message } => {
            Error::service_unavailable(format!("site repository unavailable: {message}"))
        }
        SitePersistenceError::Query { message } => {
            Error::internal(format!("site repository error: {message}"))
        }
    }
}

#[async_trait]
impl<S> SiteAdminCommand for SiteAdminService<S>
where
    S: SiteRepository,
{
    async fn settings(&self) -> Result<AdminSettings, Error> {
        let registration_open = self.registration_open().await?;
        let stats = self.site.overview().await.map_err(map_site_error)?;
        Ok(AdminSettings {
            registration_open,
            stats,
        })
    }

    async fn registration_open(&self) -> Result<bool, Error> {
        self.site
            .registration_open()
            .await
            .map_err(map_site_error)
    }

    async fn toggle_registration(&self) -> Result<bool, Error> {
        let open = !self.registration_open().await?;
        self.site
            .set_registration_open(open)
            .await
            .map_err(map_site_error)?;
        info!(registration_open = open, "registration toggled");
        Ok(open)
    }

    async fn reset_site(&self, confirmation: ResetConfirmation) -> Result<ResetReport, Error> {
        let report = self
            .site
            .reset(confirmation)
            .await
            .map_err(map_site_error)?;
        warn!(
            jobs_deleted = report.jobs_deleted,
            vtcs_deleted = report.vtcs_deleted,
            users_deleted = report.users_deleted,
            "site reset"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::MockSiteRepository;
    use crate::domain::{ErrorCode, SiteOverview};
    use rstest::rstest;

    #[rstest]
    #[case(true, false)]
    #[case(false, true)]
    #[tokio::test]
    async fn toggle_flips_the_stored_flag(#[case] current: bool, #[case] expected: bool) {
        let mut site = MockSiteRepository::new();
        site.expect_registration_open()
            .return_once(move || Ok(current));
        site.expect_set_registration_open()
            .withf(move |open| *open == expected)
            .times(1)
            .return_once(|_| Ok(()));

        let service = SiteAdminService::new(Arc::new(site));
        assert_eq!(service.toggle_registration().await.expect("toggle"), expected);
    }

    #[tokio::test]
    async fn settings_combine_flag_and_counters() {
        let mut site = MockSiteRepository::new();
        site.expect_registration_open().return_once(|| Ok(true));
        site.expect_overview().return_once(|| {
            Ok(SiteOverview {
                total_users: 4,
                admin_users: 1,
                total_jobs: 20,
                total_vtcs: 2,
            })
        });

        let settings = SiteAdminService::new(Arc::new(site))
            .settings()
            .await
            .expect("settings");
        assert!(settings.registration_open);
        assert_eq!(settings.stats.total_jobs, 20);
    }

    #[tokio::test]
    async fn reset_reports_deleted_rows() {
        let mut site = MockSiteRepository::new();
        site.expect_reset().times(1).return_once(|_| {
            Ok(ResetReport {
                jobs_deleted: 10,
                vtcs_deleted: 2,
                users_deleted: 3,
            })
        });

        let confirmation = ResetConfirmation::parse("RESET").expect("confirmed");
        let report = SiteAdminService::new(Arc::new(site))
            .reset_site(confirmation)
            .await
            .expect("reset");
        assert_eq!(report.users_deleted, 3);
    }

    #[tokio::test]
    async fn reset_failure_maps_to_internal_error() {
        let mut site = MockSiteRepository::new();
        site.expect_reset()
            .return_once(|_| Err(SitePersistenceError::query("rolled back")));

        let confirmation = ResetConfirmation::parse("RESET").expect("confirmed");
        let error = SiteAdminService::new(Arc::new(site))
            .reset_site(confirmation)
            .await
            .expect_err("reset fails");
        assert_eq!(error.code(), ErrorCode::InternalError);
    }
}
