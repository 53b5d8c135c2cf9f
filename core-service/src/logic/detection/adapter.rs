//! Detection Record Adapter
//!
//! Normalizes raw detector records into [`Detection`]s.
//! Input: RawDetection (class id or name, confidence, 4 bbox floats)
//! Output: Detection or InputError naming the record index

use serde::{Deserialize, Serialize};

use crate::error::InputError;
use super::types::{BoundingBox, DamageClass, Detection};

/// Coordinate encoding of `RawDetection::bbox`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BboxFormat {
    /// x1, y1, x2, y2 (detector default)
    #[default]
    Xyxy,
    /// x, y, width, height
    Xywh,
}

/// Detector record as it arrives over the boundary
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawDetection {
    #[serde(default)]
    pub class_id: Option<u32>,
    #[serde(default, alias = "label", alias = "class_label")]
    pub class_name: Option<String>,
    #[serde(default)]
    pub confidence: Option<f32>,
    #[serde(default)]
    pub bbox: Vec<f32>,
    #[serde(default)]
    pub bbox_format: BboxFormat,
}

impl RawDetection {
    /// Record shaped like the detector's default output (class id + xyxy)
    pub fn xyxy(class_id: u32, confidence: f32, bbox: [f32; 4]) -> Self {
        Self {
            class_id: Some(class_id),
            class_name: None,
            confidence: Some(confidence),
            bbox: bbox.to_vec(),
            bbox_format: BboxFormat::Xyxy,
        }
    }
}

/// Normalize one raw record. `index` is only used for error reporting.
pub fn normalize(index: usize, raw: &RawDetection) -> Result<Detection, InputError> {
    let class_label = resolve_class(index, raw)?;

    let confidence = raw.confidence
        .ok_or_else(|| InputError::malformed(index, "missing confidence"))?;
    if !confidence.is_finite() || !(0.0..=1.0).contains(&confidence) {
        return Err(InputError::malformed(
            index,
            format!("confidence {} outside [0, 1]", confidence),
        ));
    }

    let bbox = resolve_bbox(index, raw)?;

    Ok(Detection { class_label, confidence, bbox })
}

/// Normalize an ordered batch, failing on the first malformed record
pub fn normalize_batch(raw: &[RawDetection]) -> Result<Vec<Detection>, InputError> {
    raw.iter()
        .enumerate()
        .map(|(i, r)| normalize(i, r))
        .collect()
}

fn resolve_class(index: usize, raw: &RawDetection) -> Result<DamageClass, InputError> {
    let by_id = match raw.class_id {
        Some(id) => Some(DamageClass::from_class_id(id)
            .ok_or_else(|| InputError::malformed(index, format!("unknown class id {}", id)))?),
        None => None,
    };

    let by_name = match raw.class_name.as_deref() {
        Some(name) => Some(name.parse::<DamageClass>()
            .map_err(|e| InputError::malformed(index, e))?),
        None => None,
    };

    match (by_id, by_name) {
        (Some(a), Some(b)) if a != b => Err(InputError::malformed(
            index,
            format!("class id {} does not match class name '{}'", a.class_id(), b),
        )),
        (_, Some(class)) | (Some(class), None) => Ok(class),
        (None, None) => Err(InputError::malformed(index, "missing class label")),
    }
}

fn resolve_bbox(index: usize, raw: &RawDetection) -> Result<BoundingBox, InputError> {
    let [a, b, c, d] = match raw.bbox.as_slice() {
        &[a, b, c, d] => [a, b, c, d],
        other => {
            return Err(InputError::malformed(
                index,
                format!("bbox needs 4 values, got {}", other.len()),
            ))
        }
    };

    if [a, b, c, d].iter().any(|v| !v.is_finite()) {
        return Err(InputError::malformed(index, "bbox has non-finite coordinates"));
    }

    let bbox = match raw.bbox_format {
        BboxFormat::Xyxy => BoundingBox::Xyxy { x1: a, y1: b, x2: c, y2: d },
        BboxFormat::Xywh => BoundingBox::Xywh { x: a, y: b, w: c, h: d },
    };

    if bbox.width() < 0.0 || bbox.height() < 0.0 {
        return Err(InputError::malformed(index, "bbox has negative extent"));
    }

    Ok(bbox)
}

// ============================================================================
// TESTS
// ============================================================================
