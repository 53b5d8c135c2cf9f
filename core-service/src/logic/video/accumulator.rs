//! Video Frame Accumulator
//!
//! Per frame: detect → normalize → accumulate → annotate.
//! After the last frame (or when the stream breaks) the caller gets one
//! [`VideoSummary`] to score.
//!
//! Stream failure policy:
//! - first frame unreadable → `InputError::UnreadableStream`, nothing to score
//! - later frame unreadable, or detector failure → stop, keep what was
//!   accumulated, report `StreamTermination::Truncated`
//! - malformed detection record → `InputError` (detector contract violation)

use serde::{Deserialize, Serialize};

use crate::error::InputError;
use crate::logic::detection::normalize_batch;
use crate::logic::features::{FeatureAccumulator, FeatureVector, RangeSample};
use super::source::{AnnotationSink, DamageDetector, FrameSource};

/// How the frame stream ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StreamTermination {
    Completed,
    Truncated { at_frame: u32, reason: String },
}

impl StreamTermination {
    pub fn is_truncated(&self) -> bool {
        matches!(self, StreamTermination::Truncated { .. })
    }
}

/// Accumulated result of one video
#[derive(Debug, Clone, PartialEq)]
pub struct VideoSummary {
    pub features: FeatureVector,
    /// Every accumulated detection, for the notification range filter
    pub range_samples: Vec<RangeSample>,
    pub frames_processed: u32,
    pub termination: StreamTermination,
}

/// Running state for one video; owned by a single inspection
#[derive(Debug, Default)]
pub struct VideoAccumulator {
    features: FeatureAccumulator,
    frames_processed: u32,
}

impl VideoAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn run<S, K>(
        mut self,
        detector: &dyn DamageDetector,
        source: &mut S,
        sink: &mut K,
    ) -> Result<VideoSummary, InputError>
    where
        S: FrameSource + ?Sized,
        K: AnnotationSink + ?Sized,
    {
        let termination = loop {
            let frame = match source.next_frame() {
                None => break StreamTermination::Completed,
                Some(Ok(frame)) => frame,
                Some(Err(e)) if self.frames_processed == 0 => {
                    return Err(InputError::UnreadableStream(e.to_string()));
                }
                Some(Err(e)) => {
                    log::warn!(
                        "Stream unreadable after {} frames, scoring partial totals: {}",
                        self.frames_processed, e
                    );
                    break StreamTermination::Truncated { at_frame: e.index, reason: e.to_string() };
                }
            };

            let raw = match detector.detect(&frame) {
                Ok(raw) => raw,
                Err(e) => {
                    log::warn!("Detector failed on frame {}, scoring partial totals: {}", frame.index, e);
                    break StreamTermination::Truncated { at_frame: frame.index, reason: e.to_string() };
                }
            };

            let detections = normalize_batch(&raw).map_err(|e| match e {
                InputError::MalformedDetection { index, reason } => InputError::MalformedDetection {
                    index,
                    reason: format!("frame {}: {}", frame.index, reason),
                },
                other => other,
            })?;

            self.features.push_batch(&detections, frame.geometry.area())?;
            sink.annotate(&frame, &detections);
            self.frames_processed += 1;
        };

        log::debug!(
            "Video accumulation finished: {} frames, {} detections, {:?}",
            self.frames_processed,
            self.features.detection_count(),
            termination
        );

        Ok(VideoSummary {
            features: self.features.finish(),
            range_samples: self.features.range_samples().to_vec(),
            frames_processed: self.frames_processed,
            termination,
        })
    }
}

// ============================================================================
// TESTS
// ============================================================================
