//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod account_command;
mod install_token_repository;
mod job_completion_notifier;
mod job_event_repository;
mod job_ingestion_command;
mod job_repository;
mod password_hasher;
mod profile_command;
mod reports_query;
mod site_admin_command;
mod site_repository;
mod steam_openid;
mod steam_profile_source;
mod tracker_install_command;
mod user_repository;
mod vtc_command;
mod vtc_repository;

#[cfg(test)]
pub use account_command::MockAccountCommand;
pub use account_command::{AccountCommand, SteamLoginMode};
#[cfg(test)]
pub use install_token_repository::MockInstallTokenRepository;
pub use install_token_repository::{InstallTokenPersistenceError, InstallTokenRepository};
#[cfg(test)]
pub use job_completion_notifier::MockJobCompletionNotifier;
pub use job_completion_notifier::{
    JobCompletionNotifier, NoOpJobCompletionNotifier, NotificationError,
};
#[cfg(test)]
pub use job_event_repository::MockJobEventRepository;
pub use job_event_repository::{JobEventPersistenceError, JobEventRepository};
#[cfg(test)]
pub use job_ingestion_command::MockJobIngestionCommand;
pub use job_ingestion_command::{FixtureJobIngestionCommand, JobIngestionCommand};
#[cfg(test)]
pub use job_repository::MockJobRepository;
pub use job_repository::{JobPersistenceError, JobRepository};
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{PasswordHashError, PasswordHasher};
#[cfg(test)]
pub use profile_command::MockProfileCommand;
pub use profile_command::ProfileCommand;
#[cfg(test)]
pub use reports_query::MockReportsQuery;
pub use reports_query::{FixtureReportsQuery, ReportsQuery};
#[cfg(test)]
pub use site_admin_command::MockSiteAdminCommand;
pub use site_admin_command::{AdminSettings, SiteAdminCommand};
#[cfg(test)]
pub use site_repository::MockSiteRepository;
pub use site_repository::{SitePersistenceError, SiteRepository};
#[cfg(test)]
pub use steam_openid::MockSteamOpenIdVerifier;
pub use steam_openid::{OpenIdAssertion, SteamOpenIdError, SteamOpenIdVerifier};
#[cfg(test)]
pub use steam_profile_source::MockSteamProfileSource;
pub use steam_profile_source::{
    FixtureSteamProfileSource, SteamProfileError, SteamProfileSource,
};
#[cfg(test)]
pub use tracker_install_command::MockTrackerInstallCommand;
pub use tracker_install_command::TrackerInstallCommand;
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{StoredCredentials, UserPersistenceError, UserRepository};
#[cfg(test)]
pub use vtc_command::MockVtcCommand;
pub use vtc_command::{VtcCommand, VtcPage};
#[cfg(test)]
pub use vtc_repository::MockVtcRepository;
pub use vtc_repository::{VtcPersistenceError, VtcRepository};
