//! Feature Aggregator
//!
//! Reduces detections into a [`FeatureVector`]. Pure: no I/O, no shared state.
//!
//! Image batches and video streams go through the same [`FeatureAccumulator`],
//! so scoring a video once at the end sees exactly the totals of its frames.

use serde::Serialize;

use crate::error::InputError;
use crate::logic::detection::{DamageClass, Detection};
use super::vector::{ClassCounts, FeatureVector};

/// Frame area must be finite and strictly positive
pub fn validate_frame_area(frame_area: f32) -> Result<f32, InputError> {
    if frame_area.is_finite() && frame_area > 0.0 {
        Ok(frame_area)
    } else {
        Err(InputError::InvalidFrameArea(frame_area))
    }
}

/// Aggregate one ordered batch of detections
pub fn aggregate(detections: &[Detection], frame_area: f32) -> Result<FeatureVector, InputError> {
    let mut acc = FeatureAccumulator::new();
    acc.push_batch(detections, frame_area)?;
    Ok(acc.finish())
}

/// Majority vote over raw per-detection labels (ties: lexicographic label)
pub fn dominant_class(detections: &[Detection]) -> Option<DamageClass> {
    let mut votes = ClassCounts::new();
    for det in detections {
        votes.increment(det.class_label);
    }
    votes.dominant()
}

/// One detection as the notification range filter sees it
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RangeSample {
    pub class: DamageClass,
    /// [`Detection::range_severity`]
    pub severity: f32,
}

// ============================================================================
// ACCUMULATOR
// ============================================================================

/// Running totals across one or more batches
#[derive(Debug, Clone, Default)]
pub struct FeatureAccumulator {
    counts: ClassCounts,
    detection_count: u32,
    confidence_sum: f64,
    area_ratio_sum: f64,
    samples: Vec<RangeSample>,
}

impl FeatureAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a batch observed on a frame of `frame_area` square pixels
    pub fn push_batch(&mut self, detections: &[Detection], frame_area: f32) -> Result<(), InputError> {
        let frame_area = validate_frame_area(frame_area)?;

        for det in detections {
            self.counts.increment(det.class_label);
            self.detection_count += 1;
            self.confidence_sum += det.confidence as f64;
            self.area_ratio_sum += det.area_ratio(frame_area) as f64;
            self.samples.push(RangeSample {
                class: det.class_label,
                severity: det.range_severity(frame_area),
            });
        }

        Ok(())
    }

    pub fn class_counts(&self) -> &ClassCounts {
        &self.counts
    }

    pub fn detection_count(&self) -> u32 {
        self.detection_count
    }

    /// Per-detection severities in arrival order
    pub fn range_samples(&self) -> &[RangeSample] {
        &self.samples
    }

    /// Terminal computation over everything pushed so far
    pub fn finish(&self) -> FeatureVector {
        if self.detection_count == 0 {
            return FeatureVector::empty();
        }

        FeatureVector {
            detection_count: self.detection_count,
            average_confidence: (self.confidence_sum / self.detection_count as f64) as f32,
            total_damage_area_ratio: self.area_ratio_sum as f32,
            class_counts: self.counts.clone(),
            dominant_class: self.counts.dominant(),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
