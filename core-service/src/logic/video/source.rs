//! Frame sources, detector boundary and annotation sinks

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::logic::detection::{Detection, FrameGeometry, RawDetection};
use crate::logic::features::ClassCounts;

// ============================================================================
// FRAME
// ============================================================================

/// One decoded frame handed to the detector
#[derive(Debug, Clone)]
pub struct Frame {
    /// 0-based position in the stream
    pub index: u32,
    pub geometry: FrameGeometry,
    /// Encoded or raw pixel data; opaque to this crate
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("frame {index} unreadable: {message}")]
pub struct FrameError {
    pub index: u32,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("detector failed: {0}")]
pub struct DetectorError(pub String);

// ============================================================================
// BOUNDARY TRAITS
// ============================================================================

/// Ordered, finite stream of frames
pub trait FrameSource {
    /// `None` at end of stream, `Some(Err)` when the stream became unreadable
    fn next_frame(&mut self) -> Option<Result<Frame, FrameError>>;
}

/// External object detector (YOLO or similar)
pub trait DamageDetector: Send + Sync {
    fn detect(&self, frame: &Frame) -> Result<Vec<RawDetection>, DetectorError>;
}

/// Receives per-frame results, e.g. to write an annotated output video
pub trait AnnotationSink {
    fn annotate(&mut self, frame: &Frame, detections: &[Detection]);
}

// ============================================================================
// SINKS
// ============================================================================

/// Discards annotations
pub struct NullSink;

impl AnnotationSink for NullSink {
    fn annotate(&mut self, _frame: &Frame, _detections: &[Detection]) {}
}

/// Per-frame summary record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameAnnotation {
    pub frame_index: u32,
    pub detection_count: usize,
    pub class_counts: ClassCounts,
}

/// Keeps a summary of every frame seen
#[derive(Debug, Default)]
pub struct FrameLog {
    pub entries: Vec<FrameAnnotation>,
}

impl FrameLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_entries(self) -> Vec<FrameAnnotation> {
        self.entries
    }
}

impl AnnotationSink for FrameLog {
    fn annotate(&mut self, frame: &Frame, detections: &[Detection]) {
        let mut class_counts = ClassCounts::new();
        for det in detections {
            class_counts.increment(det.class_label);
        }
        self.entries.push(FrameAnnotation {
            frame_index: frame.index,
            detection_count: detections.len(),
            class_counts,
        });
    }
}

// ============================================================================
// REPLAY (pre-computed detections)
// ============================================================================

/// A frame whose detections were computed upstream, or that failed to decode
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReplayFrame {
    #[serde(default)]
    pub detections: Vec<RawDetection>,
    /// Decode error reported by the upstream reader
    #[serde(default)]
    pub error: Option<String>,
}

/// Frame source over frames decoded and detected elsewhere
pub struct ReplaySource {
    frames: std::vec::IntoIter<ReplayFrame>,
    geometry: FrameGeometry,
    next_index: u32,
}

impl ReplaySource {
    pub fn new(frames: Vec<ReplayFrame>, geometry: FrameGeometry) -> Self {
        Self {
            frames: frames.into_iter(),
            geometry,
            next_index: 0,
        }
    }
}

impl FrameSource for ReplaySource {
    fn next_frame(&mut self) -> Option<Result<Frame, FrameError>> {
        let replay = self.frames.next()?;
        let index = self.next_index;
        self.next_index += 1;

        if let Some(message) = replay.error {
            return Some(Err(FrameError { index, message }));
        }

        Some(Ok(Frame {
            index,
            geometry: self.geometry,
            data: Vec::new(),
        }))
    }
}

/// Detector answering from a frame-index -> detections table
#[derive(Debug, Default)]
pub struct ReplayDetector {
    by_frame: HashMap<u32, Vec<RawDetection>>,
}

impl ReplayDetector {
    /// Pair with a `ReplaySource` built from the same frames
    pub fn from_frames(frames: &[ReplayFrame]) -> Self {
        let by_frame = frames.iter()
            .enumerate()
            .map(|(i, f)| (i as u32, f.detections.clone()))
            .collect();
        Self { by_frame }
    }

    #[cfg(test)]
    pub fn uniform(frames: u32, class: crate::logic::detection::DamageClass, per_frame: usize) -> Self {
        let dets = vec![RawDetection::xyxy(class.class_id(), 0.8, [0.0, 0.0, 10.0, 10.0]); per_frame];
        Self {
            by_frame: (0..frames).map(|i| (i, dets.clone())).collect(),
        }
    }
}

impl DamageDetector for ReplayDetector {
    fn detect(&self, frame: &Frame) -> Result<Vec<RawDetection>, DetectorError> {
        Ok(self.by_frame.get(&frame.index).cloned().unwrap_or_default())
    }
}
