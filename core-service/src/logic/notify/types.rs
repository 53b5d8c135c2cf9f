//! Notification Types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::logic::alert::AlertTier;
use crate::logic::features::ClassCounts;

/// Outbound alert; only ever built for an admitted decision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationEvent {
    pub event_id: Uuid,
    pub shipment_id: String,
    /// Image or video file name
    pub source_name: String,
    pub severity_score: f32,
    pub tier: AlertTier,
    pub damage_counts: ClassCounts,
    pub recommendation: String,
    pub config_version: String,
    pub hostname: String,
    pub created_at: DateTime<Utc>,
}

impl NotificationEvent {
    pub fn new(
        shipment_id: impl Into<String>,
        source_name: impl Into<String>,
        severity_score: f32,
        tier: AlertTier,
        damage_counts: ClassCounts,
        recommendation: impl Into<String>,
        config_version: impl Into<String>,
    ) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            shipment_id: shipment_id.into(),
            source_name: source_name.into(),
            severity_score,
            tier,
            damage_counts,
            recommendation: recommendation.into(),
            config_version: config_version.into(),
            hostname: local_hostname(),
            created_at: Utc::now(),
        }
    }

    pub fn title(&self) -> String {
        format!("{} Container Damage Alert: {}", self.tier.emoji(), self.tier.as_str())
    }

    /// "dent: 2, rust: 1" or "No damages detected."
    pub fn detection_summary(&self) -> String {
        self.damage_counts.summary()
    }
}

fn local_hostname() -> String {
    hostname::get()
        .map(|h| h.to_string_lossy().into_owned())
        .unwrap_or_else(|_| "unknown".to_string())
}

/// Webhook payload flavour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WebhookPlatform {
    #[default]
    Slack,
    Discord,
    Teams,
    Generic,
}

impl WebhookPlatform {
    pub fn as_str(&self) -> &'static str {
        match self {
            WebhookPlatform::Slack => "slack",
            WebhookPlatform::Discord => "discord",
            WebhookPlatform::Teams => "teams",
            WebhookPlatform::Generic => "generic",
        }
    }

    /// Unknown names fall back to the generic JSON body
    pub fn from_name(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "slack" => WebhookPlatform::Slack,
            "discord" => WebhookPlatform::Discord,
            "teams" | "msteams" | "microsoft_teams" => WebhookPlatform::Teams,
            _ => WebhookPlatform::Generic,
        }
    }
}
