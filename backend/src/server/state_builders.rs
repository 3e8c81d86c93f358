//! Builders for HTTP state ports and the outbound adapters behind them.

use std::sync::Arc;

use actix_web::web;
use mockable::{DefaultClock, Env};
use tracing::info;

use mytrucktracker::domain::ports::{
    FixtureSteamProfileSource, JobCompletionNotifier, SteamProfileSource,
};
use mytrucktracker::domain::{
    AccountService, JobIngestionService, ProfileService, SiteAdminService, TrackerInstallService,
    VtcService,
};
use mytrucktracker::inbound::http::state::{HttpState, HttpStatePorts};
use mytrucktracker::outbound::notifier::{
    DiscordWebhookNotifier, FanOutNotifier, NotifierChannel, WebSocketNotifier,
};
use mytrucktracker::outbound::password::Argon2PasswordHasher;
use mytrucktracker::outbound::persistence::{
    DbPool, DieselInstallTokenRepository, DieselJobEventRepository, DieselJobRepository,
    DieselReportsQuery, DieselSiteRepository, DieselUserRepository, DieselVtcRepository,
};
use mytrucktracker::outbound::steam::{SteamOpenIdHttpVerifier, SteamWebApiProfileSource};
use mytrucktracker::settings::TrackerSettings;

use super::{OutboundAdapters, ServerConfig};

fn io_error(context: &str, err: impl std::fmt::Display) -> std::io::Error {
    std::io::Error::other(format!("{context}: {err}"))
}

/// Build the notification fan-out from whichever channels are configured.
///
/// # Errors
///
/// Returns an error when a configured URL is invalid or a client cannot be
/// built.
pub(crate) fn build_notifier(settings: &TrackerSettings) -> std::io::Result<FanOutNotifier> {
    let mut channels = Vec::new();
    if let Some(webhook) = settings
        .discord_webhook()
        .map_err(|err| io_error("discord settings", err))?
    {
        let discord = DiscordWebhookNotifier::new(webhook, settings.discord_avatar_url.clone())
            .map_err(|err| io_error("discord client", err))?;
        channels.push(NotifierChannel::new("discord", Arc::new(discord)));
    }
    if let Some(url) = settings
        .websocket_url()
        .map_err(|err| io_error("websocket settings", err))?
    {
        channels.push(NotifierChannel::new(
            "websocket",
            Arc::new(WebSocketNotifier::new(url.as_str())),
        ));
    }
    info!(channels = channels.len(), "job notifications configured");
    Ok(FanOutNotifier::new(channels))
}

/// Steam Web API source when a key is configured, else the fixture that
/// makes new users fall back to generated names.
pub(crate) fn build_steam_profiles(
    settings: &TrackerSettings,
    env: &impl Env,
) -> std::io::Result<Arc<dyn SteamProfileSource>> {
    match settings.steam_api_key(env) {
        Some(key) => Ok(Arc::new(
            SteamWebApiProfileSource::new(key).map_err(|err| io_error("steam client", err))?,
        )),
        None => {
            info!("no Steam Web API key; profiles use fallback names");
            Ok(Arc::new(FixtureSteamProfileSource))
        }
    }
}

/// Assemble every non-repository adapter from settings.
///
/// # Errors
///
/// Returns an error when a notifier or Steam client cannot be built.
pub(crate) fn build_outbound_adapters(
    settings: &TrackerSettings,
    env: &impl Env,
) -> std::io::Result<OutboundAdapters> {
    let notifier: Arc<dyn JobCompletionNotifier> = Arc::new(build_notifier(settings)?);
    let steam_openid =
        Arc::new(SteamOpenIdHttpVerifier::new().map_err(|err| io_error("steam client", err))?);
    Ok(OutboundAdapters {
        notifier,
        steam_openid,
        steam_profiles: build_steam_profiles(settings, env)?,
        hasher: Arc::new(Argon2PasswordHasher::new()),
    })
}

fn build_ports(pool: &DbPool, adapters: &OutboundAdapters) -> HttpStatePorts {
    let clock = Arc::new(DefaultClock);
    let users = Arc::new(DieselUserRepository::new(pool.clone()));
    let jobs = Arc::new(DieselJobRepository::new(pool.clone()));
    let site = Arc::new(DieselSiteRepository::new(pool.clone()));

    HttpStatePorts {
        jobs: Arc::new(JobIngestionService::new(
            users.clone(),
            jobs.clone(),
            Arc::new(DieselJobEventRepository::new(pool.clone())),
            adapters.notifier.clone(),
            clock.clone(),
        )),
        installs: Arc::new(TrackerInstallService::new(
            Arc::new(DieselInstallTokenRepository::new(pool.clone())),
            clock.clone(),
        )),
        accounts: Arc::new(AccountService::new(
            users.clone(),
            site.clone(),
            adapters.steam_openid.clone(),
            adapters.steam_profiles.clone(),
            adapters.hasher.clone(),
        )),
        profiles: Arc::new(ProfileService::new(users, jobs)),
        admin: Arc::new(SiteAdminService::new(site)),
        vtcs: Arc::new(VtcService::new(
            Arc::new(DieselVtcRepository::new(pool.clone())),
            clock,
        )),
        reports: Arc::new(DieselReportsQuery::new(pool.clone())),
    }
}

/// Build the shared HTTP state from the pool and outbound adapters.
pub(super) fn build_http_state(config: &ServerConfig) -> web::Data<HttpState> {
    web::Data::new(HttpState::new(
        build_ports(&config.db_pool, &config.adapters),
        Arc::new(DefaultClock),
        config.public_base_url.as_str(),
    ))
}
