//! Notify Module - Notification Gate & Outbound Delivery
//!
//! ## Structure
//! - `types`: NotificationEvent, WebhookPlatform
//! - `gate`: NotificationGate (tier / policy / range filter)
//! - `webhook`: Notifier trait, WebhookNotifier, LogNotifier
//! - `dispatcher`: NotificationDispatcher (blocking pool, stats, history)

pub mod types;
pub mod gate;
pub mod webhook;
pub mod dispatcher;

pub use types::{NotificationEvent, WebhookPlatform};
pub use gate::{GateDecision, GateInput, NotificationGate, SuppressReason};
pub use webhook::{LogNotifier, Notifier, WebhookConfig, WebhookNotifier, DEFAULT_WEBHOOK_TIMEOUT};
pub use dispatcher::{DispatchHandle, DispatchRecord, DispatchStats, NotificationDispatcher};
