//! Pipeline Module - Inspection Orchestration
//!
//! detections → features → severity → tier → gate → (deferred) dispatch.
//!
//! The computation runs synchronously and is final before anything is sent;
//! `schedule()` then hands an admitted event to the dispatcher.

pub mod types;


use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::error::InspectionError;
use crate::logic::alert::{classify, Classification};
use crate::logic::config::ScoringConfig;
use crate::logic::detection::normalize_batch;
use crate::logic::features::{FeatureAccumulator, FeatureVector, RangeSample};
use crate::logic::notify::{
    DispatchHandle, GateDecision, GateInput, NotificationDispatcher, NotificationEvent, NotificationGate,
};
use crate::logic::recommend::{recommend_or_fallback, Recommender};
use crate::logic::severity::SeverityScorer;
use crate::logic::video::{
    AnnotationSink, DamageDetector, FrameSource, NullSink, ReplayDetector, ReplaySource, VideoAccumulator, VideoSummary,
};

pub use types::{
    ImageInspection, InspectionOutcome, InspectionReport, MediaKind, NotificationPlan, VideoInspection, VideoStats,
};

pub struct InspectionPipeline {
    config: Arc<ScoringConfig>,
    scorer: Arc<dyn SeverityScorer>,
    recommender: Arc<dyn Recommender>,
    gate: NotificationGate,
    dispatcher: Arc<NotificationDispatcher>,
}

impl InspectionPipeline {
    pub fn new(
        config: Arc<ScoringConfig>,
        scorer: Arc<dyn SeverityScorer>,
        recommender: Arc<dyn Recommender>,
        dispatcher: Arc<NotificationDispatcher>,
    ) -> Self {
        let gate = NotificationGate::from_config(&config);
        Self { config, scorer, recommender, gate, dispatcher }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    pub fn dispatcher(&self) -> &Arc<NotificationDispatcher> {
        &self.dispatcher
    }

    /// Tier for a raw score under the active thresholds
    pub fn classify_score(&self, score: f32) -> Classification {
        Classification::new(score, &self.config.thresholds, &self.config.version)
    }

    pub fn inspect_image(&self, request: &ImageInspection) -> Result<InspectionOutcome, InspectionError> {
        let detections = normalize_batch(&request.detections)?;
        let mut acc = FeatureAccumulator::new();
        acc.push_batch(&detections, request.frame.area())?;

        self.conclude(
            &request.shipment_id,
            &request.image_name,
            MediaKind::Image,
            acc.finish(),
            acc.range_samples(),
            None,
        )
    }

    pub fn inspect_video<S, K>(
        &self,
        shipment_id: &str,
        video_name: &str,
        detector: &dyn DamageDetector,
        source: &mut S,
        sink: &mut K,
    ) -> Result<InspectionOutcome, InspectionError>
    where
        S: FrameSource + ?Sized,
        K: AnnotationSink + ?Sized,
    {
        let VideoSummary { features, range_samples, frames_processed, termination } =
            VideoAccumulator::new().run(detector, source, sink)?;
        let stats = VideoStats { frames_processed, termination };

        self.conclude(shipment_id, video_name, MediaKind::Video, features, &range_samples, Some(stats))
    }

    /// Video whose frames were detected upstream
    pub fn inspect_replay(&self, request: &VideoInspection) -> Result<InspectionOutcome, InspectionError> {
        let detector = ReplayDetector::from_frames(&request.frames);
        let mut source = ReplaySource::new(request.frames.clone(), request.frame);

        self.inspect_video(&request.shipment_id, &request.video_name, &detector, &mut source, &mut NullSink)
    }

    /// Hand the admitted event (if any) to the dispatcher; at most once
    pub fn schedule(&self, outcome: &mut InspectionOutcome) -> Option<DispatchHandle> {
        outcome.pending.take().map(|event| {
            log::debug!("Scheduling notification {} ({})", event.event_id, event.tier);
            self.dispatcher.spawn(event)
        })
    }

    /// Terminal step: score, classify, recommend, gate
    fn conclude(
        &self,
        shipment_id: &str,
        source_name: &str,
        media: MediaKind,
        features: FeatureVector,
        range_samples: &[RangeSample],
        video: Option<VideoStats>,
    ) -> Result<InspectionOutcome, InspectionError> {
        let scoring = self.scorer.score(&features)?;
        let tier = classify(scoring.value, &self.config.thresholds);
        let recommendation = recommend_or_fallback(self.recommender.as_ref(), tier, &features.class_counts);

        let input = GateInput {
            tier,
            score: scoring.value,
            samples: range_samples,
        };
        let decision = self.gate.admit(&input, || {
            NotificationEvent::new(
                shipment_id,
                source_name,
                scoring.value,
                tier,
                features.class_counts.clone(),
                recommendation.clone(),
                self.config.version.clone(),
            )
        });

        let (notification, pending) = match decision {
            GateDecision::Suppressed(cause) => (NotificationPlan::Suppressed { cause }, None),
            GateDecision::Dispatched(event) => {
                (NotificationPlan::Scheduled { event_id: event.event_id }, Some(*event))
            }
        };

        log::info!(
            "Inspection {} [{}]: {} detections, severity {:.4} → {} ({})",
            shipment_id,
            source_name,
            features.detection_count,
            scoring.value,
            tier,
            if notification.is_scheduled() { "notify" } else { "suppressed" }
        );

        let report = InspectionReport {
            inspection_id: Uuid::new_v4(),
            shipment_id: shipment_id.to_string(),
            source_name: source_name.to_string(),
            media,
            damage_counts: features.class_counts.clone(),
            severity_score: scoring.value,
            risk_level: tier,
            sop_recommendation: recommendation,
            features,
            scoring,
            config_version: self.config.version.clone(),
            video,
            notification,
            created_at: Utc::now(),
        };

        Ok(InspectionOutcome { report, pending })
    }
}
