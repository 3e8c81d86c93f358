//! Discord webhook notifier.
//!
//! Posts one rich embed per finished job. The adapter owns formatting and
//! transport only; the fan-out decides whether failures matter.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Serialize;

use crate::domain::ports::{JobCompletionNotifier, NotificationError};
use crate::domain::{
    JobCompletionNotice, capitalise_first, format_compact, format_duration, format_grouped,
    translate_game, translate_trailer_body,
};

/// Name the webhook posts under.
const WEBHOOK_USERNAME: &str = "JobTracker";
/// Embed accent colour.
const EMBED_COLOR: u32 = 0x00FF_EF00;
/// Request timeout for the webhook call.
pub const DISCORD_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Serialize)]
struct WebhookPayload {
    username: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    avatar_url: Option<String>,
    embeds: Vec<Embed>,
}

#[derive(Debug, Serialize)]
struct Embed {
    title: String,
    #[serde(rename = "type")]
    kind: &'static str,
    color: u32,
    author: EmbedAuthor,
    description: String,
    fields: Vec<EmbedField>,
}

#[derive(Debug, Serialize)]
struct EmbedAuthor {
    name: String,
}

#[derive(Debug, Serialize)]
struct EmbedField {
    name: &'static str,
    value: String,
    inline: bool,
}

impl EmbedField {
    fn new(name: &'static str, value: String, inline: bool) -> Self {
        Self {
            name,
            value,
            inline,
        }
    }
}

fn build_payload(notice: &JobCompletionNotice, avatar_url: Option<&str>) -> WebhookPayload {
    let description = format!(
        "**From - To** \n {} ({}) - {} ({})",
        notice.source_city,
        notice.source_company,
        notice.destination_city,
        notice.destination_company
    );
    let damage = format!(
        "Truck: {} % \nTrailer: {} % \nCargo: {} %",
        format_grouped(notice.truck_wear_average * 100.0, 2),
        format_grouped(notice.trailer_wear_average * 100.0, 2),
        format_grouped(notice.cargo_damage, 2)
    );
    let vehicles = format!(
        "Truck: {}, {} {}\nTrailer: {}, {} {}",
        notice.truck,
        notice.truck_plate_code,
        notice.truck_license_plate,
        translate_trailer_body(notice.trailer_body_type.as_deref()),
        notice.trailer_plate_code,
        notice.trailer_license_plate
    );

    let fields = vec![
        EmbedField::new("Game", translate_game(&notice.game).to_owned(), true),
        EmbedField::new(
            "Cargo",
            format!(
                "{} ({} t)",
                notice.cargo,
                format_compact(notice.cargo_mass_kg / 1000.0, 3)
            ),
            false,
        ),
        EmbedField::new("Experience", format!("{} XP", notice.xp), true),
        EmbedField::new(
            "Distance",
            format!("{} km", format_compact(notice.driven_km, 2)),
            true,
        ),
        EmbedField::new(
            "IRL Time Duration",
            format_duration(notice.duration_seconds),
            true,
        ),
        EmbedField::new(
            "Income",
            format!("{} €", format_grouped(notice.income as f64, 0)),
            true,
        ),
        EmbedField::new("Damage", damage, true),
        EmbedField::new("Truck & Trailer", vehicles, true),
    ];

    WebhookPayload {
        username: WEBHOOK_USERNAME,
        avatar_url: avatar_url.map(str::to_owned),
        embeds: vec![Embed {
            title: format!("Job {}", capitalise_first(notice.status.as_str())),
            kind: "rich",
            color: EMBED_COLOR,
            author: EmbedAuthor {
                name: notice.driver_name.clone(),
            },
            description,
            fields,
        }],
    }
}

/// Notifier posting job embeds to a Discord webhook.
pub struct DiscordWebhookNotifier {
    client: Client,
    webhook: Url,
    avatar_url: Option<String>,
}

impl DiscordWebhookNotifier {
    /// Build a notifier with the standard 10 second timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(webhook: Url, avatar_url: Option<String>) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(DISCORD_TIMEOUT).build()?;
        Ok(Self {
            client,
            webhook,
            avatar_url,
        })
    }
}

#[async_trait]
impl JobCompletionNotifier for DiscordWebhookNotifier {
    async fn notify(&self, notice: &JobCompletionNotice) -> Result<(), NotificationError> {
        let payload = build_payload(notice, self.avatar_url.as_deref());
        let body = serde_json::to_vec(&payload)
            .map_err(|err| NotificationError::encoding(err.to_string()))?;
        let response = self
            .client
            .post(self.webhook.clone())
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|err| NotificationError::transport(err.to_string()))?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(NotificationError::rejected(status.as_u16()))
        }
    }
}

#[cfg(test)]
mod tests {
    //! Payload shape coverage; the webhook itself is never called.
    use super::*;
    use crate::domain::JobStatus;
    use crate::domain::test_fixtures::completion_notice;
    use insta::assert_json_snapshot;
    use rstest::rstest;

    #[test]
    fn payload_matches_the_webhook_contract() {
        let payload = build_payload(&completion_notice(12), Some("https://example.test/avatar.png"));

        assert_json_snapshot!(payload, @r###"
        {
          "username": "JobTracker",
          "avatar_url": "https://example.test/avatar.png",
          "embeds": [
            {
              "title": "Job Delivered",
              "type": "rich",
              "color": 16772864,
              "author": {
                "name": "driver1"
              },
              "description": "**From - To** \n Berlin (Posped) - Praha (Tradeaux)",
              "fields": [
                {
                  "name": "Game",
                  "value": "Euro Truck Simulator 2",
                  "inline": true
                },
                {
                  "name": "Cargo",
                  "value": "Apples (18 t)",
                  "inline": false
                },
                {
                  "name": "Experience",
                  "value": "640 XP",
                  "inline": true
                },
                {
                  "name": "Distance",
                  "value": "352.4 km",
                  "inline": true
                },
                {
                  "name": "IRL Time Duration",
                  "value": "40:00",
                  "inline": true
                },
                {
                  "name": "Income",
                  "value": "12,345 €",
                  "inline": true
                },
                {
                  "name": "Damage",
                  "value": "Truck: 2.00 % \nTrailer: 1.00 % \nCargo: 0.50 %",
                  "inline": true
                },
                {
                  "name": "Truck & Trailer",
                  "value": "Truck: Scania R, D B AB 123\nTrailer: Curtainsider, CZ 1A2 3456",
                  "inline": true
                }
              ]
            }
          ]
        }
        "###);
    }

    #[rstest]
    fn avatar_is_omitted_when_unset() {
        let payload = build_payload(&completion_notice(12), None);
        let value = serde_json::to_value(&payload).expect("payload serialises");
        assert!(value.get("avatar_url").is_none());
    }

    #[rstest]
    #[case(JobStatus::Cancelled, "Job Cancelled")]
    #[case(JobStatus::Other("abandoned".to_owned()), "Job Abandoned")]
    fn titles_capitalise_the_status(#[case] status: JobStatus, #[case] title: &str) {
        let mut notice = completion_notice(3);
        notice.status = status;
        let payload = build_payload(&notice, None);
        assert_eq!(payload.embeds[0].title, title);
    }

    #[rstest]
    fn long_jobs_use_hour_durations() {
        let mut notice = completion_notice(3);
        notice.duration_seconds = 3_723;
        let payload = build_payload(&notice, None);
        let duration = payload.embeds[0]
            .fields
            .iter()
            .find(|field| field.name == "IRL Time Duration")
            .expect("duration field");
        assert_eq!(duration.value, "01:02:03");
    }
}
