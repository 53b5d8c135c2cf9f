//! Outbound Notifiers
//!
//! `WebhookNotifier` posts the event to Slack / Discord / Teams or a generic
//! JSON endpoint. Blocking (ureq); callers run it on the blocking pool.
//! `LogNotifier` only logs and is used when no webhook is configured.

use std::time::Duration;

use crate::error::DispatchError;
use super::types::{NotificationEvent, WebhookPlatform};

/// Per-request timeout for webhook posts
pub const DEFAULT_WEBHOOK_TIMEOUT: Duration = Duration::from_secs(5);

/// Delivers one event; exactly one attempt per call, no retries
pub trait Notifier: Send + Sync {
    fn name(&self) -> &str;

    fn dispatch(&self, event: &NotificationEvent) -> Result<String, DispatchError>;
}

// ============================================================================
// WEBHOOK
// ============================================================================

#[derive(Debug, Clone)]
pub struct WebhookConfig {
    pub url: String,
    pub platform: WebhookPlatform,
    pub timeout: Duration,
    /// Add host / event id / timestamp fields
    pub include_details: bool,
}

impl WebhookConfig {
    pub fn new(url: impl Into<String>, platform: WebhookPlatform) -> Self {
        Self {
            url: url.into(),
            platform,
            timeout: DEFAULT_WEBHOOK_TIMEOUT,
            include_details: false,
        }
    }
}

pub struct WebhookNotifier {
    config: WebhookConfig,
    agent: ureq::Agent,
}

impl WebhookNotifier {
    pub fn new(config: WebhookConfig) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(config.timeout)
            .build();
        Self { config, agent }
    }

    pub fn platform(&self) -> WebhookPlatform {
        self.config.platform
    }

    /// Format payload for the configured platform
    pub fn format_payload(&self, event: &NotificationEvent) -> String {
        let details = self.config.include_details;
        match self.config.platform {
            WebhookPlatform::Slack => format_slack(event, details),
            WebhookPlatform::Discord => format_discord(event, details),
            WebhookPlatform::Teams => format_teams(event, details),
            WebhookPlatform::Generic => format_generic(event),
        }
    }
}

impl Notifier for WebhookNotifier {
    fn name(&self) -> &str {
        self.config.platform.as_str()
    }

    fn dispatch(&self, event: &NotificationEvent) -> Result<String, DispatchError> {
        let formatted = self.format_payload(event);

        let response = self.agent.post(&self.config.url)
            .set("Content-Type", "application/json")
            .send_string(&formatted);

        match response {
            Ok(resp) if (200..300).contains(&resp.status()) => {
                log::info!(
                    "Alert {} sent to {} ({}) for shipment {}",
                    event.event_id, self.config.platform.as_str(), resp.status(), event.shipment_id
                );
                Ok(format!("Sent to {} ({})", self.config.platform.as_str(), resp.status()))
            }
            Ok(resp) => Err(DispatchError::Status { status: resp.status() }),
            Err(ureq::Error::Status(status, _)) => {
                log::error!("Webhook rejected alert {}: HTTP {}", event.event_id, status);
                Err(DispatchError::Status { status })
            }
            Err(e) => {
                log::error!("Failed to send alert {}: {}", event.event_id, e);
                Err(DispatchError::Transport { message: e.to_string() })
            }
        }
    }
}

/// Format for Slack (block kit)
fn format_slack(event: &NotificationEvent, details: bool) -> String {
    let mut blocks = vec![
        serde_json::json!({
            "type": "header",
            "text": {
                "type": "plain_text",
                "text": event.title(),
                "emoji": true
            }
        }),
        serde_json::json!({
            "type": "section",
            "fields": [
                { "type": "mrkdwn", "text": format!("*Shipment ID:*\n`{}`", event.shipment_id) },
                { "type": "mrkdwn", "text": format!("*Severity Score:*\n`{:.4}`", event.severity_score) }
            ]
        }),
        serde_json::json!({
            "type": "section",
            "fields": [
                { "type": "mrkdwn", "text": format!("*Detections Summary:*\n{}", event.detection_summary()) },
                { "type": "mrkdwn", "text": format!("*File Name:*\n{}", event.source_name) }
            ]
        }),
        serde_json::json!({ "type": "divider" }),
        serde_json::json!({
            "type": "section",
            "text": {
                "type": "mrkdwn",
                "text": format!("*📋 SOP Recommendation:*\n{}", event.recommendation)
            }
        }),
    ];

    let mut context = format!("Severity Engine | Config: {}", event.config_version);
    if details {
        context.push_str(&format!(" | Host: {} | Event: {}", event.hostname, event.event_id));
    }
    blocks.push(serde_json::json!({
        "type": "context",
        "elements": [{ "type": "mrkdwn", "text": context }]
    }));

    serde_json::json!({
        "blocks": blocks,
        "attachments": [{
            "color": event.tier.color()
        }]
    }).to_string()
}

/// Format for Discord
fn format_discord(event: &NotificationEvent, details: bool) -> String {
    let mut fields = vec![
        serde_json::json!({ "name": "Shipment ID", "value": event.shipment_id, "inline": true }),
        serde_json::json!({ "name": "Severity Score", "value": format!("{:.4}", event.severity_score), "inline": true }),
        serde_json::json!({ "name": "Detections", "value": event.detection_summary(), "inline": false }),
        serde_json::json!({ "name": "File Name", "value": event.source_name, "inline": true }),
    ];

    if details {
        fields.push(serde_json::json!({ "name": "Host", "value": event.hostname, "inline": true }));
    }

    serde_json::json!({
        "embeds": [{
            "title": event.title(),
            "description": event.recommendation,
            "color": event.tier.color_int(),
            "fields": fields,
            "footer": { "text": format!("Config: {}", event.config_version) },
            "timestamp": event.created_at.to_rfc3339()
        }]
    }).to_string()
}

/// Format for Microsoft Teams
fn format_teams(event: &NotificationEvent, details: bool) -> String {
    let mut facts = vec![
        serde_json::json!({ "name": "Shipment ID", "value": event.shipment_id }),
        serde_json::json!({ "name": "Severity Score", "value": format!("{:.4}", event.severity_score) }),
        serde_json::json!({ "name": "Detections", "value": event.detection_summary() }),
        serde_json::json!({ "name": "File Name", "value": event.source_name }),
    ];

    if details {
        facts.push(serde_json::json!({ "name": "Host", "value": event.hostname }));
    }

    serde_json::json!({
        "@type": "MessageCard",
        "@context": "http://schema.org/extensions",
        "themeColor": event.tier.color().replace('#', ""),
        "summary": event.title(),
        "sections": [{
            "activityTitle": event.title(),
            "text": event.recommendation,
            "facts": facts
        }]
    }).to_string()
}

/// Format for generic webhook
fn format_generic(event: &NotificationEvent) -> String {
    serde_json::to_string(event).unwrap_or_else(|_| "{}".to_string())
}

// ============================================================================
// LOG ONLY
// ============================================================================

/// Writes the event to the log instead of the network
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn name(&self) -> &str {
        "log"
    }

    fn dispatch(&self, event: &NotificationEvent) -> Result<String, DispatchError> {
        log::info!(
            "[ALERT] {} shipment={} source={} score={:.4} damages=[{}] config={}",
            event.tier,
            event.shipment_id,
            event.source_name,
            event.severity_score,
            event.detection_summary(),
            event.config_version
        );
        Ok(format!("Logged {}", event.event_id))
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::TcpListener;
    use std::thread::JoinHandle;

    use crate::logic::alert::AlertTier;
    use crate::logic::detection::DamageClass;
    use crate::logic::features::ClassCounts;

    fn event() -> NotificationEvent {
        let mut counts = ClassCounts::new();
        counts.add(DamageClass::Dent, 2);
        counts.add(DamageClass::Rust, 1);
        NotificationEvent::new(
            "SHP-0042",
            "container_17.jpg",
            4.0,
            AlertTier::Warning,
            counts,
            "Manual inspection is required.",
            "linear-v1.0.0",
        )
    }

    /// Accepts one request, answers with `status`, returns the request body
    fn serve_once(status: u16) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/hook", listener.local_addr().unwrap());

        let handle = std::thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());

            let mut content_length = 0usize;
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).unwrap();
                if line == "\r\n" || line.is_empty() {
                    break;
                }
                if let Some(value) = line.to_ascii_lowercase().strip_prefix("content-length:") {
                    content_length = value.trim().parse().unwrap();
                }
            }
            let mut body = vec![0u8; content_length];
            reader.read_exact(&mut body).unwrap();

            let mut stream = stream;
            write!(stream, "HTTP/1.1 {} X\r\nContent-Length: 2\r\nConnection: close\r\n\r\nok", status).unwrap();
            String::from_utf8(body).unwrap()
        });

        (url, handle)
    }

    #[test]
    fn test_format_slack() {
        let notifier = WebhookNotifier::new(WebhookConfig::new("http://unused", WebhookPlatform::Slack));
        let formatted = notifier.format_payload(&event());

        assert!(formatted.contains("blocks"));
        assert!(formatted.contains("Container Damage Alert: WARNING"));
        assert!(formatted.contains("`SHP-0042`"));
        assert!(formatted.contains("`4.0000`"));
        assert!(formatted.contains("dent: 2, rust: 1"));
        assert!(formatted.contains("Config: linear-v1.0.0"));
    }

    #[test]
    fn test_format_discord() {
        let notifier = WebhookNotifier::new(WebhookConfig::new("http://unused", WebhookPlatform::Discord));
        let formatted = notifier.format_payload(&event());
        assert!(formatted.contains("embeds"));
        assert!(formatted.contains(&0xf59e0bu32.to_string()));
    }

    #[test]
    fn test_format_generic_is_event_json() {
        let notifier = WebhookNotifier::new(WebhookConfig::new("http://unused", WebhookPlatform::Generic));
        let original = event();
        let parsed: NotificationEvent = serde_json::from_str(&notifier.format_payload(&original)).unwrap();
        assert_eq!(parsed.event_id, original.event_id);
        assert_eq!(parsed.tier, AlertTier::Warning);
    }

    #[test]
    fn test_dispatch_success() {
        let (url, server) = serve_once(200);
        let notifier = WebhookNotifier::new(WebhookConfig::new(url, WebhookPlatform::Slack));

        let result = notifier.dispatch(&event());
        let body = server.join().unwrap();

        assert!(result.is_ok());
        assert!(body.contains("SOP Recommendation"));
    }

    #[test]
    fn test_dispatch_non_2xx_is_failure() {
        let (url, server) = serve_once(500);
        let notifier = WebhookNotifier::new(WebhookConfig::new(url, WebhookPlatform::Generic));

        let result = notifier.dispatch(&event());
        server.join().unwrap();

        assert_eq!(result, Err(DispatchError::Status { status: 500 }));
    }

    #[test]
    fn test_dispatch_transport_failure() {
        // bind then drop to get a port nobody listens on
        let port = TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap().port();
        let notifier = WebhookNotifier::new(WebhookConfig::new(
            format!("http://127.0.0.1:{}/hook", port),
            WebhookPlatform::Slack,
        ));

        assert!(matches!(notifier.dispatch(&event()), Err(DispatchError::Transport { .. })));
    }

    #[test]
    fn test_log_notifier() {
        assert!(LogNotifier.dispatch(&event()).unwrap().starts_with("Logged"));
    }
}
