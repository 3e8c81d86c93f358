//! Job completion notifiers.
//!
//! Each channel implements `JobCompletionNotifier`; [`FanOutNotifier`]
//! combines the configured ones and swallows their failures.

mod discord;
mod fan_out;
mod websocket;

pub use discord::{DISCORD_TIMEOUT, DiscordWebhookNotifier};
pub use fan_out::{FanOutNotifier, NotifierChannel};
pub use websocket::{WEBSOCKET_TIMEOUT, WebSocketNotifier};
