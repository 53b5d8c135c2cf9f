//! Detection Types
//!
//! Core types for detector output.
//! No logic here beyond conversions - only data structures.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ============================================================================
// DAMAGE CLASS
// ============================================================================

/// Damage classes the detector is trained on.
///
/// Declaration order follows the detector's class ids (0..=3). Adding a class
/// means adding a variant here and to [`DamageClass::ALL`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DamageClass {
    Dent,
    Rust,
    BrokenDoor,
    Leak,
}

impl DamageClass {
    /// Every class, in detector id order
    pub const ALL: [DamageClass; 4] = [
        DamageClass::Dent,
        DamageClass::Rust,
        DamageClass::BrokenDoor,
        DamageClass::Leak,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DamageClass::Dent => "dent",
            DamageClass::Rust => "rust",
            DamageClass::BrokenDoor => "broken_door",
            DamageClass::Leak => "leak",
        }
    }

    /// Map a detector class id
    pub fn from_class_id(id: u32) -> Option<Self> {
        Self::ALL.get(id as usize).copied()
    }

    pub fn class_id(&self) -> u32 {
        match self {
            DamageClass::Dent => 0,
            DamageClass::Rust => 1,
            DamageClass::BrokenDoor => 2,
            DamageClass::Leak => 3,
        }
    }
}

impl fmt::Display for DamageClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for DamageClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "dent" => Ok(DamageClass::Dent),
            "rust" => Ok(DamageClass::Rust),
            "broken_door" => Ok(DamageClass::BrokenDoor),
            "leak" => Ok(DamageClass::Leak),
            other => Err(format!("unknown damage class '{}'", other)),
        }
    }
}

// ============================================================================
// BOUNDING BOX
// ============================================================================

/// Bounding box in pixel coordinates.
///
/// Producers disagree on the format, so both corner and size encodings are
/// kept; only the area matters downstream.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "format", rename_all = "lowercase")]
pub enum BoundingBox {
    Xyxy { x1: f32, y1: f32, x2: f32, y2: f32 },
    Xywh { x: f32, y: f32, w: f32, h: f32 },
}

impl BoundingBox {
    pub fn width(&self) -> f32 {
        match *self {
            BoundingBox::Xyxy { x1, x2, .. } => x2 - x1,
            BoundingBox::Xywh { w, .. } => w,
        }
    }

    pub fn height(&self) -> f32 {
        match *self {
            BoundingBox::Xyxy { y1, y2, .. } => y2 - y1,
            BoundingBox::Xywh { h, .. } => h,
        }
    }

    /// Area in square pixels. Degenerate boxes have zero area.
    pub fn area(&self) -> f32 {
        self.width().max(0.0) * self.height().max(0.0)
    }
}

// ============================================================================
// DETECTION
// ============================================================================

/// One observed defect instance, already validated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub class_label: DamageClass,
    /// 0.0 - 1.0
    pub confidence: f32,
    pub bbox: BoundingBox,
}

impl Detection {
    pub fn new(class_label: DamageClass, confidence: f32, bbox: BoundingBox) -> Self {
        Self { class_label, confidence, bbox }
    }

    /// Bounding box area relative to the frame area
    pub fn area_ratio(&self, frame_area: f32) -> f32 {
        self.bbox.area() / frame_area
    }

    /// Confidence × area ratio, rounded to 3 decimals. Only the range
    /// filter reads this; the tier comes from the batch score.
    pub fn range_severity(&self, frame_area: f32) -> f32 {
        (self.confidence * self.area_ratio(frame_area) * 1000.0).round() / 1000.0
    }
}

/// Frame / image dimensions in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameGeometry {
    pub width: u32,
    pub height: u32,
}

impl FrameGeometry {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn area(&self) -> f32 {
        self.width as f32 * self.height as f32
    }
}

// ============================================================================
// TESTS
// ============================================================================
