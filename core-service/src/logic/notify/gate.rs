//! Notification Gate
//!
//! EVALUATING → SUPPRESSED | DISPATCHED, decided from the tier, the policy
//! flags and (when configured) per-label severity ranges. Stateless: the
//! same input always yields the same decision.
//!
//! The tier and policy checks use the batch score. The range filter does not:
//! it looks at each detection's own severity (confidence × area ratio) against
//! the range of that detection's label, and admits the event when at least
//! one detection falls inside its range.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::logic::alert::AlertTier;
use crate::logic::config::{AlertPolicy, ScoreRange, ScoringConfig};
use crate::logic::detection::DamageClass;
use crate::logic::features::RangeSample;
use super::types::NotificationEvent;

/// What the gate looks at
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GateInput<'a> {
    pub tier: AlertTier,
    pub score: f32,
    /// One entry per detection, in arrival order
    pub samples: &'a [RangeSample],
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SuppressReason {
    /// Score below the lowest threshold
    BelowThreshold,
    /// Policy flag for this tier is off
    PolicyDisabled { tier: AlertTier },
    /// No detection carries a label with a configured range
    NoRange { class: Option<DamageClass> },
    /// First ranged detection, when none of them fell inside its range
    OutOfRange { class: DamageClass, severity: f32, min: f32, max: f32 },
}

impl std::fmt::Display for SuppressReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SuppressReason::BelowThreshold => write!(f, "below alert threshold"),
            SuppressReason::PolicyDisabled { tier } => write!(f, "{} alerts disabled by policy", tier),
            SuppressReason::NoRange { class: Some(class) } => write!(f, "no severity range for '{}'", class),
            SuppressReason::NoRange { class: None } => write!(f, "no detection to range-check"),
            SuppressReason::OutOfRange { class, severity, min, max } => {
                write!(f, "severity {:.3} outside ({}, {}) for '{}'", severity, min, max, class)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum GateDecision {
    Suppressed(SuppressReason),
    Dispatched(Box<NotificationEvent>),
}

impl GateDecision {
    pub fn is_dispatched(&self) -> bool {
        matches!(self, GateDecision::Dispatched(_))
    }

    pub fn event(&self) -> Option<&NotificationEvent> {
        match self {
            GateDecision::Dispatched(event) => Some(event.as_ref()),
            GateDecision::Suppressed(_) => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NotificationGate {
    policy: AlertPolicy,
    range_filter: Option<BTreeMap<DamageClass, ScoreRange>>,
}

impl NotificationGate {
    pub fn new(policy: AlertPolicy, range_filter: Option<BTreeMap<DamageClass, ScoreRange>>) -> Self {
        Self { policy, range_filter }
    }

    pub fn from_config(config: &ScoringConfig) -> Self {
        Self::new(config.policy, config.range_filter.clone())
    }

    /// Pure decision, no event construction
    pub fn evaluate(&self, input: &GateInput<'_>) -> Result<(), SuppressReason> {
        if input.tier == AlertTier::None {
            return Err(SuppressReason::BelowThreshold);
        }
        if !self.policy.allows(input.tier) {
            return Err(SuppressReason::PolicyDisabled { tier: input.tier });
        }

        match &self.range_filter {
            Some(ranges) => check_ranges(ranges, input.samples),
            None => Ok(()),
        }
    }

    /// Decide; `build` runs only when the decision is DISPATCHED
    pub fn admit<F>(&self, input: &GateInput<'_>, build: F) -> GateDecision
    where
        F: FnOnce() -> NotificationEvent,
    {
        match self.evaluate(input) {
            Ok(()) => GateDecision::Dispatched(Box::new(build())),
            Err(reason) => {
                log::debug!("Notification suppressed: {}", reason);
                GateDecision::Suppressed(reason)
            }
        }
    }
}

fn check_ranges(ranges: &BTreeMap<DamageClass, ScoreRange>, samples: &[RangeSample]) -> Result<(), SuppressReason> {
    let mut first_miss = None;

    for sample in samples {
        let Some(range) = ranges.get(&sample.class) else { continue };
        if range.contains(sample.severity) {
            return Ok(());
        }
        first_miss.get_or_insert(SuppressReason::OutOfRange {
            class: sample.class,
            severity: sample.severity,
            min: range.min,
            max: range.max,
        });
    }

    Err(first_miss.unwrap_or(SuppressReason::NoRange { class: samples.first().map(|s| s.class) }))
}

// ============================================================================
// TESTS
// ============================================================================
