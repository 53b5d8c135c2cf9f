//! Video Module - Frame Accumulation
//!
//! Runs the external detector over an ordered, finite frame sequence and
//! accumulates class counts across the whole stream. Nothing is classified
//! or notified per frame: the pipeline scores the accumulated totals once.
//!
//! ## Structure
//! - `source`: Frame, FrameSource, DamageDetector, AnnotationSink + replay impls
//! - `accumulator`: VideoAccumulator, StreamTermination

pub mod source;
pub mod accumulator;

pub use source::{
    AnnotationSink, DamageDetector, DetectorError, Frame, FrameAnnotation, FrameError,
    FrameLog, FrameSource, NullSink, ReplayDetector, ReplayFrame, ReplaySource,
};
pub use accumulator::{StreamTermination, VideoAccumulator, VideoSummary};
