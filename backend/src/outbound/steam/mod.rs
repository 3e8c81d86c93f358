//! Steam adapters: OpenID login verification and Web API persona lookup.

mod openid;
mod profile;

pub use openid::{STEAM_OPENID_ENDPOINT, STEAM_OPENID_TIMEOUT, SteamOpenIdHttpVerifier};
pub use profile::{STEAM_PLAYER_SUMMARIES_ENDPOINT, STEAM_PROFILE_TIMEOUT, SteamWebApiProfileSource};
