//! Driving port for read-only pages.
//!
//! Production backs this port with a Diesel query adapter; tests can use the
//! empty fixture.

use async_trait::async_trait;

use crate::domain::{
    Dashboard, Error, JobDetail, JobId, JobListPage, Leaderboards, PageRequest, UserId,
    UserProfileView, total_pages,
};

/// Domain use-case port for dashboards, job lists, profiles and leaderboards.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReportsQuery: Send + Sync {
    /// Site counters and the most recent jobs.
    async fn dashboard(&self) -> Result<Dashboard, Error>;

    /// One page of every job, newest first.
    async fn jobs_page(&self, page: PageRequest) -> Result<JobListPage, Error>;

    /// One job with its transports.
    async fn job_detail(&self, id: JobId) -> Result<Option<JobDetail>, Error>;

    /// Public profile with counters and a page of jobs.
    async fn user_profile(
        &self,
        id: UserId,
        page: PageRequest,
    ) -> Result<Option<UserProfileView>, Error>;

    /// Delivered-only leaderboards.
    async fn leaderboards(&self) -> Result<Leaderboards, Error>;
}

/// Fixture query reporting an empty site.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureReportsQuery;

#[async_trait]
impl ReportsQuery for FixtureReportsQuery {
    async fn dashboard(&self) -> Result<Dashboard, Error> {
        Ok(Dashboard {
            stats: Default::default(),
            recent_jobs: Vec::new(),
        })
    }

    async fn jobs_page(&self, page: PageRequest) -> Result<JobListPage, Error> {
        Ok(JobListPage {
            jobs: Vec::new(),
            page: page.page(),
            total_pages: total_pages(0),
            total_jobs: 0,
        })
    }

    async fn job_detail(&self, _id: JobId) -> Result<Option<JobDetail>, Error> {
        Ok(None)
    }

    async fn user_profile(
        &self,
        _id: UserId,
        _page: PageRequest,
    ) -> Result<Option<UserProfileView>, Error> {
        Ok(None)
    }

    async fn leaderboards(&self) -> Result<Leaderboards, Error> {
        Ok(Leaderboards::default())
    }
}
