//! In-memory driven ports backing the real domain services.
//!
//! One shared [`Store`] implements every repository port so tests can seed
//! rows and inspect writes after a request.

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mytrucktracker::domain::ports::{
    InstallTokenPersistenceError, InstallTokenRepository, JobEventPersistenceError,
    JobEventRepository, JobPersistenceError, JobRepository, SitePersistenceError, SiteRepository,
    StoredCredentials, UserPersistenceError, UserRepository, VtcPersistenceError, VtcRepository,
};
use mytrucktracker::domain::{
    AccountStatus, ApiToken, ClaimOutcome, CompletionOutcome, DEFAULT_AVATAR_URL, Email,
    FineReport, InstallClaim, JobCompletion, JobCompletionNotice, JobId, JobOwner, Membership,
    NewJob, NewLocalUser, NewSteamUser, NewVtc, ProfileUpdate, ResetConfirmation, ResetReport,
    SiteOverview, SteamId, TollReport, TransportReport, User, UserId, VtcDetail, VtcId,
    VtcSummary,
};

pub(crate) struct StoredUser {
    pub(crate) user: User,
    pub(crate) api_token: String,
}

pub(crate) struct StoredJob {
    pub(crate) id: JobId,
    pub(crate) driver_steam_id: String,
    pub(crate) user_id: Option<UserId>,
    pub(crate) finished: bool,
}

pub(crate) struct StoredInstall {
    pub(crate) token: String,
    pub(crate) user_id: UserId,
    pub(crate) tracker_id: Option<String>,
}

#[derive(Default)]
pub(crate) struct Tables {
    pub(crate) users: Vec<StoredUser>,
    pub(crate) jobs: Vec<StoredJob>,
    pub(crate) tolls: Vec<(JobId, UserId, f64)>,
    pub(crate) penalties: Vec<(JobId, UserId)>,
    pub(crate) transports: Vec<JobId>,
    pub(crate) installs: Vec<StoredInstall>,
    pub(crate) notice_lookups: usize,
    pub(crate) registration_open: bool,
}

#[derive(Clone, Default)]
pub(crate) struct Store {
    tables: Arc<Mutex<Tables>>,
}

fn id(raw: i64) -> UserId {
    UserId::new(raw).expect("positive user id")
}

impl Store {
    pub(crate) fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().expect("store lock")
    }

    /// Seed an active Steam user holding `api_token`.
    pub(crate) fn seed_driver(&self, user: i64, steam_id: &str, api_token: &str) -> UserId {
        let user_id = id(user);
        self.tables().users.push(StoredUser {
            user: User {
                id: user_id,
                username: format!("driver{user}"),
                display_name: None,
                steam_id: Some(SteamId::new(steam_id).expect("valid steam id")),
                email: None,
                avatar_url: DEFAULT_AVATAR_URL.to_owned(),
                bio: None,
                wot_text: None,
                truckersmp_text: None,
                is_admin: false,
                account_status: AccountStatus::Active,
                created_at: DateTime::<Utc>::UNIX_EPOCH,
            },
            api_token: api_token.to_owned(),
        });
        user_id
    }

    /// Seed an open job reported by `steam_id`.
    pub(crate) fn seed_job(&self, job: i64, steam_id: &str, user_id: Option<UserId>) -> JobId {
        let job_id = JobId::new(job).expect("positive job id");
        self.tables().jobs.push(StoredJob {
            id: job_id,
            driver_steam_id: steam_id.to_owned(),
            user_id,
            finished: false,
        });
        job_id
    }

    /// Seed an unclaimed install token for `user_id`.
    pub(crate) fn seed_install(&self, token: &str, user_id: UserId) {
        self.tables().installs.push(StoredInstall {
            token: token.to_owned(),
            user_id,
            tracker_id: None,
        });
    }
}

fn unsupported<E>(make: impl FnOnce(String) -> E, operation: &str) -> E {
    make(format!("{operation} is not exercised by the contract tests"))
}

#[async_trait]
impl UserRepository for Store {
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError> {
        Ok(self
            .tables()
            .users
            .iter()
            .find(|stored| stored.user.id == id)
            .map(|stored| stored.user.clone()))
    }

    async fn find_by_steam_id(
        &self,
        steam_id: &SteamId,
    ) -> Result<Option<User>, UserPersistenceError> {
        Ok(self
            .tables()
            .users
            .iter()
            .find(|stored| stored.user.steam_id.as_ref() == Some(steam_id))
            .map(|stored| stored.user.clone()))
    }

    async fn find_credentials(
        &self,
        _email: &Email,
    ) -> Result<Option<StoredCredentials>, UserPersistenceError> {
        Ok(None)
    }

    async fn find_by_api_token(
        &self,
        steam_id: &SteamId,
        token: &ApiToken,
    ) -> Result<Option<User>, UserPersistenceError> {
        Ok(self
            .tables()
            .users
            .iter()
            .find(|stored| {
                stored.user.steam_id.as_ref() == Some(steam_id) && stored.api_token == token.expose()
            })
            .map(|stored| stored.user.clone()))
    }

    async fn count(&self) -> Result<i64, UserPersistenceError> {
        Ok(i64::try_from(self.tables().users.len()).unwrap_or(i64::MAX))
    }

    async fn create_steam_user(&self, _user: &NewSteamUser) -> Result<User, UserPersistenceError> {
        Err(unsupported(UserPersistenceError::query, "create_steam_user"))
    }

    async fn create_local_user(&self, _user: &NewLocalUser) -> Result<User, UserPersistenceError> {
        Err(unsupported(UserPersistenceError::query, "create_local_user"))
    }

    async fn refresh_avatar(
        &self,
        _id: UserId,
        _avatar_url: &str,
    ) -> Result<(), UserPersistenceError> {
        Err(unsupported(UserPersistenceError::query, "refresh_avatar"))
    }

    async fn update_profile(
        &self,
        _id: UserId,
        _update: &ProfileUpdate,
    ) -> Result<(), UserPersistenceError> {
        Err(unsupported(UserPersistenceError::query, "update_profile"))
    }

    async fn set_account_status(
        &self,
        id: UserId,
        status: AccountStatus,
    ) -> Result<(), UserPersistenceError> {
        if let Some(stored) = self
            .tables()
            .users
            .iter_mut()
            .find(|stored| stored.user.id == id)
        {
            stored.user.account_status = status;
        }
        Ok(())
    }

    async fn delete_with_jobs(&self, _id: UserId) -> Result<(), UserPersistenceError> {
        Err(unsupported(UserPersistenceError::query, "delete_with_jobs"))
    }
}

#[async_trait]
impl JobRepository for Store {
    async fn insert_started(
        &self,
        job: &NewJob,
        _started_at: DateTime<Utc>,
    ) -> Result<JobId, JobPersistenceError> {
        let mut tables = self.tables();
        let next = i64::try_from(tables.jobs.len()).unwrap_or(i64::MAX) + 1;
        let job_id = JobId::new(next).map_err(|err| JobPersistenceError::query(err.to_string()))?;
        tables.jobs.push(StoredJob {
            id: job_id,
            driver_steam_id: job.driver_steam_id.as_str().to_owned(),
            user_id: None,
            finished: false,
        });
        Ok(job_id)
    }

    async fn complete(
        &self,
        completion: &JobCompletion,
        _finished_at: DateTime<Utc>,
    ) -> Result<CompletionOutcome, JobPersistenceError> {
        let mut tables = self.tables();
        let Some(job) = tables.jobs.iter_mut().find(|job| {
            job.id == completion.job_id && job.driver_steam_id == completion.steam_id.as_str()
        }) else {
            return Ok(CompletionOutcome::NotFound);
        };
        if job.finished {
            return Ok(CompletionOutcome::AlreadyFinished);
        }
        job.finished = true;
        Ok(CompletionOutcome::Completed)
    }

    async fn find_owner(&self, id: JobId) -> Result<Option<JobOwner>, JobPersistenceError> {
        Ok(self
            .tables()
            .jobs
            .iter()
            .find(|job| job.id == id)
            .map(|job| JobOwner {
                user_id: job.user_id,
                driver_steam_id: job.driver_steam_id.clone(),
            }))
    }

    async fn exists_for_driver(
        &self,
        id: JobId,
        steam_id: &SteamId,
    ) -> Result<bool, JobPersistenceError> {
        Ok(self
            .tables()
            .jobs
            .iter()
            .any(|job| job.id == id && job.driver_steam_id == steam_id.as_str()))
    }

    async fn completion_notice(
        &self,
        _id: JobId,
    ) -> Result<Option<JobCompletionNotice>, JobPersistenceError> {
        self.tables().notice_lookups += 1;
        Ok(None)
    }

    async fn delete_for_driver(&self, steam_id: &SteamId) -> Result<usize, JobPersistenceError> {
        let mut tables = self.tables();
        let before = tables.jobs.len();
        tables
            .jobs
            .retain(|job| job.driver_steam_id != steam_id.as_str());
        Ok(before - tables.jobs.len())
    }
}

#[async_trait]
impl JobEventRepository for Store {
    async fn insert_toll(
        &self,
        toll: &TollReport,
        user_id: UserId,
        _recorded_at: DateTime<Utc>,
    ) -> Result<i64, JobEventPersistenceError> {
        let mut tables = self.tables();
        tables.tolls.push((toll.job_id, user_id, toll.amount));
        Ok(i64::try_from(tables.tolls.len()).unwrap_or(i64::MAX))
    }

    async fn insert_penalty(
        &self,
        fine: &FineReport,
        user_id: UserId,
        _recorded_at: DateTime<Utc>,
    ) -> Result<i64, JobEventPersistenceError> {
        let mut tables = self.tables();
        tables.penalties.push((fine.job_id, user_id));
        Ok(i64::try_from(tables.penalties.len()).unwrap_or(i64::MAX))
    }

    async fn insert_transport(
        &self,
        transport: &TransportReport,
        _recorded_at: DateTime<Utc>,
    ) -> Result<i64, JobEventPersistenceError> {
        let mut tables = self.tables();
        tables.transports.push(transport.job_id);
        Ok(i64::try_from(tables.transports.len()).unwrap_or(i64::MAX))
    }
}

#[async_trait]
impl InstallTokenRepository for Store {
    async fn claim(
        &self,
        claim: &InstallClaim,
        _claimed_at: DateTime<Utc>,
    ) -> Result<ClaimOutcome, InstallTokenPersistenceError> {
        let mut tables = self.tables();
        let Some(install) = tables
            .installs
            .iter_mut()
            .find(|install| install.token == claim.token.expose())
        else {
            return Ok(ClaimOutcome::UnknownToken);
        };
        match install.tracker_id.as_deref() {
            Some(current) if current == claim.tracker_id.as_str() => {
                Ok(ClaimOutcome::AlreadyRegistered(install.user_id))
            }
            Some(_) if !claim.force => Ok(ClaimOutcome::HeldByOtherTracker),
            _ => {
                install.tracker_id = Some(claim.tracker_id.as_str().to_owned());
                Ok(ClaimOutcome::Bound(install.user_id))
            }
        }
    }
}

#[async_trait]
impl SiteRepository for Store {
    async fn registration_open(&self) -> Result<bool, SitePersistenceError> {
        Ok(self.tables().registration_open)
    }

    async fn set_registration_open(&self, open: bool) -> Result<(), SitePersistenceError> {
        self.tables().registration_open = open;
        Ok(())
    }

    async fn overview(&self) -> Result<SiteOverview, SitePersistenceError> {
        let tables = self.tables();
        Ok(SiteOverview {
            total_users: i64::try_from(tables.users.len()).unwrap_or(i64::MAX),
            admin_users: 0,
            total_jobs: i64::try_from(tables.jobs.len()).unwrap_or(i64::MAX),
            total_vtcs: 0,
        })
    }

    async fn reset(
        &self,
        _confirmation: ResetConfirmation,
    ) -> Result<ResetReport, SitePersistenceError> {
        Err(unsupported(SitePersistenceError::query, "reset"))
    }
}

#[async_trait]
impl VtcRepository for Store {
    async fn create(
        &self,
        _vtc: &NewVtc,
        _created_at: DateTime<Utc>,
    ) -> Result<VtcId, VtcPersistenceError> {
        Err(unsupported(VtcPersistenceError::query, "create"))
    }

    async fn list_active(&self) -> Result<Vec<VtcSummary>, VtcPersistenceError> {
        Ok(Vec::new())
    }

    async fn find_detail(&self, _id: VtcId) -> Result<Option<VtcDetail>, VtcPersistenceError> {
        Ok(None)
    }

    async fn membership(
        &self,
        _vtc_id: VtcId,
        _user_id: UserId,
    ) -> Result<Option<Membership>, VtcPersistenceError> {
        Ok(None)
    }

    async fn join(
        &self,
        _vtc_id: VtcId,
        _user_id: UserId,
        _joined_at: DateTime<Utc>,
    ) -> Result<(), VtcPersistenceError> {
        Err(unsupported(VtcPersistenceError::query, "join"))
    }

    async fn leave(
        &self,
        _vtc_id: VtcId,
        _user_id: UserId,
        _left_at: DateTime<Utc>,
    ) -> Result<(), VtcPersistenceError> {
        Err(unsupported(VtcPersistenceError::query, "leave"))
    }
}
