//! Pipeline Types - requests, reports, outcomes

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::logic::alert::AlertTier;
use crate::logic::detection::{FrameGeometry, RawDetection};
use crate::logic::features::{ClassCounts, FeatureVector};
use crate::logic::notify::{NotificationEvent, SuppressReason};
use crate::logic::severity::SeverityScore;
use crate::logic::video::{ReplayFrame, StreamTermination};

// ============================================================================
// REQUESTS
// ============================================================================

/// One image's detector output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageInspection {
    pub shipment_id: String,
    pub image_name: String,
    pub frame: FrameGeometry,
    #[serde(default)]
    pub detections: Vec<RawDetection>,
}

/// A video whose frames were decoded and detected upstream
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoInspection {
    pub shipment_id: String,
    pub video_name: String,
    pub frame: FrameGeometry,
    #[serde(default)]
    pub frames: Vec<ReplayFrame>,
}

// ============================================================================
// REPORT
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VideoStats {
    pub frames_processed: u32,
    pub termination: StreamTermination,
}

/// What happened to the notification for this inspection
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum NotificationPlan {
    Suppressed { cause: SuppressReason },
    Scheduled { event_id: Uuid },
}

impl NotificationPlan {
    pub fn is_scheduled(&self) -> bool {
        matches!(self, NotificationPlan::Scheduled { .. })
    }
}

/// Final result of one inspection
#[derive(Debug, Clone, Serialize)]
pub struct InspectionReport {
    pub inspection_id: Uuid,
    pub shipment_id: String,
    pub source_name: String,
    pub media: MediaKind,
    pub damage_counts: ClassCounts,
    pub severity_score: f32,
    pub risk_level: AlertTier,
    pub sop_recommendation: String,
    pub features: FeatureVector,
    pub scoring: SeverityScore,
    pub config_version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video: Option<VideoStats>,
    pub notification: NotificationPlan,
    pub created_at: DateTime<Utc>,
}

/// Report plus the admitted event still waiting to be scheduled
#[derive(Debug, Clone)]
pub struct InspectionOutcome {
    pub report: InspectionReport,
    pub(crate) pending: Option<NotificationEvent>,
}

impl InspectionOutcome {
    pub fn pending_event(&self) -> Option<&NotificationEvent> {
        self.pending.as_ref()
    }
}
